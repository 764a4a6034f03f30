/*
[INPUT]:  Issuer address and demo signatures
[OUTPUT]: Issued and revoked certificates with their transaction chain
[POS]:    Examples - in-memory ledger demonstration
[UPDATE]: When ledger operations change
*/

use ijazah_adapter::auth::crypto;
use ijazah_adapter::*;

fn main() {
    println!("=== Ijazah Ledger Example ===\n");

    let issuer = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    let mut ledger = CertificateLedger::new();

    let payload = IssueCertificatePayload {
        student_name: "Siti Rahma".to_string(),
        student_id: "13520001".to_string(),
        degree: "Sarjana Teknik Informatika".to_string(),
        document_hash: crypto::hash("ijazah-13520001.pdf"),
        ipfs_cid: String::new(),
    };
    let signature = crypto::sign(&payload.document_hash, issuer).signature;

    let cert = match ledger.issue_certificate(payload, issuer, &signature) {
        Ok(cert) => cert,
        Err(e) => {
            eprintln!("Issue failed: {}", e);
            return;
        }
    };
    println!("✓ Issued {} to {}", cert.id, cert.student_name);
    println!("  verified: {}", ledger.verify_certificate(&cert.id, &signature));

    match ledger.revoke_certificate(&cert.id, "data correction", issuer, &signature) {
        Ok(tx) => println!("✓ Revoked in block {} ({})", tx.block_number, tx.hash),
        Err(e) => eprintln!("Revoke failed: {}", e),
    }
    println!("  verified: {}", ledger.verify_certificate(&cert.id, &signature));
    println!("  chain intact: {}", ledger.verify_chain());
}
