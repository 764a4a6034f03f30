/*
[INPUT]:  Issue/revoke/update requests from the admin pages
[OUTPUT]: In-memory certificates and a hash-chained transaction log
[POS]:    Ledger layer - placeholder for an on-chain certificate registry
[UPDATE]: When certificate lifecycle or chaining rules change
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::auth::crypto;
use crate::types::{Certificate, CertificateStatus, Transaction, TransactionType};
use crate::validators;

pub const INSTITUTION: &str = "Institut Teknologi Bandung";
/// Seed hashed to give the first transaction its predecessor
pub const GENESIS_SEED: &str = "genesis_block";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Certificate not found: {0}")]
    NotFound(String),

    #[error("Certificate already revoked: {0}")]
    AlreadyRevoked(String),

    #[error("Invalid certificate data: {0}")]
    InvalidInput(String),
}

/// Fields supplied by the issuer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificatePayload {
    pub student_name: String,
    pub student_id: String,
    pub degree: String,
    pub document_hash: String,
    #[serde(default)]
    pub ipfs_cid: String,
}

/// Partial update; `None` leaves the field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificatePatch {
    pub student_name: Option<String>,
    pub degree: Option<String>,
    pub document_hash: Option<String>,
    pub ipfs_cid: Option<String>,
    pub status: Option<CertificateStatus>,
}

/// Certificates and transactions in insertion order
#[derive(Debug, Default)]
pub struct CertificateLedger {
    certificates: Vec<Certificate>,
    transactions: Vec<Transaction>,
}

impl CertificateLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn add_certificate(&mut self, certificate: Certificate) {
        self.certificates.push(certificate);
    }

    pub fn get_certificate(&self, id: &str) -> Option<&Certificate> {
        self.certificates.iter().find(|cert| cert.id == id)
    }

    pub fn update_certificate(&mut self, id: &str, patch: CertificatePatch) -> Result<&Certificate, LedgerError> {
        let cert = self
            .certificates
            .iter_mut()
            .find(|cert| cert.id == id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;

        if let Some(student_name) = patch.student_name {
            cert.student_name = student_name;
        }
        if let Some(degree) = patch.degree {
            cert.degree = degree;
        }
        if let Some(document_hash) = patch.document_hash {
            cert.document_hash = document_hash;
        }
        if let Some(ipfs_cid) = patch.ipfs_cid {
            cert.ipfs_cid = ipfs_cid;
        }
        if let Some(status) = patch.status {
            cert.status = status;
        }
        Ok(cert)
    }

    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn active_certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.certificates.iter().filter(|cert| cert.is_active())
    }

    pub fn revoked_certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.certificates
            .iter()
            .filter(|cert| cert.status == CertificateStatus::Revoked)
    }

    pub fn transactions_for<'a>(&'a self, certificate_id: &'a str) -> impl Iterator<Item = &'a Transaction> {
        self.transactions
            .iter()
            .filter(move |tx| tx.certificate_id == certificate_id)
    }

    /// Record a new active certificate and its `issue` transaction
    pub fn issue_certificate(
        &mut self,
        payload: IssueCertificatePayload,
        issuer_address: &str,
        signature: &str,
    ) -> Result<Certificate, LedgerError> {
        validate_payload(&payload)?;

        let now = Utc::now();
        let certificate = Certificate {
            id: format!("CERT_{}", Uuid::new_v4().simple()),
            student_name: payload.student_name,
            student_id: payload.student_id,
            institution: INSTITUTION.to_string(),
            degree: payload.degree,
            issue_date: now,
            signature_hash: signature.to_string(),
            document_hash: payload.document_hash,
            ipfs_cid: payload.ipfs_cid,
            issuer_address: issuer_address.to_string(),
            status: CertificateStatus::Active,
            created_at: now,
        };

        self.append_transaction(
            TransactionType::Issue,
            &certificate.id,
            issuer_address,
            json!({ "studentId": certificate.student_id, "documentHash": certificate.document_hash }),
            signature,
            now,
        );
        self.certificates.push(certificate.clone());

        info!(id = %certificate.id, issuer = %issuer_address, "certificate issued");
        Ok(certificate)
    }

    /// Mark a certificate revoked and record the `revoke` transaction
    pub fn revoke_certificate(
        &mut self,
        certificate_id: &str,
        reason: &str,
        issuer_address: &str,
        signature: &str,
    ) -> Result<Transaction, LedgerError> {
        let cert = self
            .certificates
            .iter_mut()
            .find(|cert| cert.id == certificate_id)
            .ok_or_else(|| LedgerError::NotFound(certificate_id.to_string()))?;
        if cert.status == CertificateStatus::Revoked {
            return Err(LedgerError::AlreadyRevoked(certificate_id.to_string()));
        }
        cert.status = CertificateStatus::Revoked;

        let transaction = self.append_transaction(
            TransactionType::Revoke,
            certificate_id,
            issuer_address,
            json!({ "reason": reason }),
            signature,
            Utc::now(),
        );
        info!(id = %certificate_id, reason = %reason, "certificate revoked");
        Ok(transaction)
    }

    /// An active certificate with this id carries this signature hash
    pub fn verify_certificate(&self, certificate_id: &str, signature_hash: &str) -> bool {
        self.get_certificate(certificate_id)
            .is_some_and(|cert| cert.is_active() && cert.signature_hash == signature_hash)
    }

    /// Every transaction points at its predecessor and its hash matches its content
    pub fn verify_chain(&self) -> bool {
        let mut previous = crypto::hash(GENESIS_SEED);
        for (index, tx) in self.transactions.iter().enumerate() {
            let expected = crypto::hash_chain(&previous, &chain_data(tx.tx_type, &tx.certificate_id, tx.timestamp));
            if tx.previous_hash != previous || tx.hash != expected || tx.block_number != index as u64 + 1 {
                return false;
            }
            previous = tx.hash.clone();
        }
        true
    }

    fn append_transaction(
        &mut self,
        tx_type: TransactionType,
        certificate_id: &str,
        issuer_address: &str,
        data: serde_json::Value,
        signature: &str,
        timestamp: DateTime<Utc>,
    ) -> Transaction {
        let previous_hash = self
            .transactions
            .last()
            .map(|tx| tx.hash.clone())
            .unwrap_or_else(|| crypto::hash(GENESIS_SEED));
        let hash = crypto::hash_chain(&previous_hash, &chain_data(tx_type, certificate_id, timestamp));

        let transaction = Transaction {
            id: format!("TX_{}", Uuid::new_v4().simple()),
            hash,
            previous_hash,
            tx_type,
            certificate_id: certificate_id.to_string(),
            issuer_address: issuer_address.to_string(),
            data,
            signature: signature.to_string(),
            timestamp,
            block_number: self.transactions.len() as u64 + 1,
        };
        self.transactions.push(transaction.clone());
        transaction
    }
}

fn chain_data(tx_type: TransactionType, certificate_id: &str, timestamp: DateTime<Utc>) -> String {
    let kind = match tx_type {
        TransactionType::Issue => "issue",
        TransactionType::Revoke => "revoke",
        TransactionType::Update => "update",
    };
    format!("{kind}_{certificate_id}_{}", timestamp.timestamp_millis())
}

fn validate_payload(payload: &IssueCertificatePayload) -> Result<(), LedgerError> {
    if payload.student_name.trim().is_empty() {
        return Err(LedgerError::InvalidInput("student name is empty".to_string()));
    }
    if !validators::is_valid_student_id(&payload.student_id) {
        return Err(LedgerError::InvalidInput(format!(
            "student id {} is not 8 digits",
            payload.student_id
        )));
    }
    if !payload.document_hash.is_empty() && !validators::is_valid_hash(&payload.document_hash) {
        return Err(LedgerError::InvalidInput("document hash is not 64 hex digits".to_string()));
    }
    if !payload.ipfs_cid.is_empty() && !validators::is_valid_cid(&payload.ipfs_cid) {
        return Err(LedgerError::InvalidInput(format!("{} is not an IPFS CID", payload.ipfs_cid)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn payload(student_id: &str) -> IssueCertificatePayload {
        IssueCertificatePayload {
            student_name: "Siti Rahma".to_string(),
            student_id: student_id.to_string(),
            degree: "Sarjana Teknik Informatika".to_string(),
            document_hash: crypto::hash("ijazah.pdf"),
            ipfs_cid: "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG".to_string(),
        }
    }

    #[test]
    fn test_issue_and_lookup() {
        let mut ledger = CertificateLedger::new();
        let cert = ledger.issue_certificate(payload("13520001"), ISSUER, "SIGNED_abc").unwrap();

        assert!(cert.id.starts_with("CERT_"));
        assert_eq!(cert.institution, INSTITUTION);
        assert!(cert.is_active());
        assert_eq!(ledger.get_certificate(&cert.id), Some(&cert));
        assert_eq!(ledger.active_certificates().count(), 1);

        let tx = &ledger.transactions()[0];
        assert_eq!(tx.tx_type, TransactionType::Issue);
        assert_eq!(tx.previous_hash, crypto::hash(GENESIS_SEED));
        assert_eq!(tx.block_number, 1);
    }

    #[test]
    fn test_revoke_chains_transactions() {
        let mut ledger = CertificateLedger::new();
        let first = ledger.issue_certificate(payload("13520001"), ISSUER, "sig1").unwrap();
        ledger.issue_certificate(payload("13520002"), ISSUER, "sig2").unwrap();

        let tx = ledger.revoke_certificate(&first.id, "plagiarism", ISSUER, "sig3").unwrap();
        assert_eq!(tx.tx_type, TransactionType::Revoke);
        assert_eq!(tx.block_number, 3);
        assert_eq!(tx.previous_hash, ledger.transactions()[1].hash);
        assert_eq!(tx.data["reason"], "plagiarism");
        assert!(ledger.verify_chain());

        assert_eq!(ledger.revoked_certificates().count(), 1);
        assert_eq!(ledger.active_certificates().count(), 1);
        assert_eq!(ledger.transactions_for(&first.id).count(), 2);
    }

    #[test]
    fn test_revoke_errors() {
        let mut ledger = CertificateLedger::new();
        assert_eq!(
            ledger.revoke_certificate("CERT_missing", "x", ISSUER, "sig"),
            Err(LedgerError::NotFound("CERT_missing".to_string()))
        );

        let cert = ledger.issue_certificate(payload("13520001"), ISSUER, "sig").unwrap();
        ledger.revoke_certificate(&cert.id, "x", ISSUER, "sig").unwrap();
        assert_eq!(
            ledger.revoke_certificate(&cert.id, "again", ISSUER, "sig"),
            Err(LedgerError::AlreadyRevoked(cert.id.clone()))
        );
        assert_eq!(ledger.transactions().len(), 2);
    }

    #[test]
    fn test_verify_certificate() {
        let mut ledger = CertificateLedger::new();
        let cert = ledger.issue_certificate(payload("13520001"), ISSUER, "sig").unwrap();

        assert!(ledger.verify_certificate(&cert.id, "sig"));
        assert!(!ledger.verify_certificate(&cert.id, "other"));
        assert!(!ledger.verify_certificate("CERT_missing", "sig"));

        ledger.revoke_certificate(&cert.id, "x", ISSUER, "sig").unwrap();
        assert!(!ledger.verify_certificate(&cert.id, "sig"));
    }

    #[test]
    fn test_update_certificate() {
        let mut ledger = CertificateLedger::new();
        let cert = ledger.issue_certificate(payload("13520001"), ISSUER, "sig").unwrap();

        let updated = ledger
            .update_certificate(
                &cert.id,
                CertificatePatch {
                    degree: Some("Magister".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.degree, "Magister");
        assert_eq!(updated.student_name, cert.student_name);

        assert!(matches!(
            ledger.update_certificate("CERT_missing", CertificatePatch::default()),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn test_issue_validates_payload() {
        let mut ledger = CertificateLedger::new();
        assert!(matches!(
            ledger.issue_certificate(payload("123"), ISSUER, "sig"),
            Err(LedgerError::InvalidInput(_))
        ));

        let mut bad_cid = payload("13520001");
        bad_cid.ipfs_cid = "Qm123".to_string();
        assert!(ledger.issue_certificate(bad_cid, ISSUER, "sig").is_err());
        assert!(ledger.certificates().is_empty());
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn test_tampered_chain_detected() {
        let mut ledger = CertificateLedger::new();
        ledger.issue_certificate(payload("13520001"), ISSUER, "sig").unwrap();
        let mut forged = ledger.transactions()[0].clone();
        forged.block_number = 2;
        forged.previous_hash = "00".repeat(32);
        ledger.add_transaction(forged);
        assert!(!ledger.verify_chain());
    }
}
