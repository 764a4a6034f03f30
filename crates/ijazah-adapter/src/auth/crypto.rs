/*
[INPUT]:  Message bytes and optional key material
[OUTPUT]: SHA-256 hex digests, random nonces, demo signatures
[POS]:    Auth layer - hashing and demo signing shared by login and ledger flows
[UPDATE]: When changing digest algorithm or the demo signature format
*/

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Prefix of signatures produced by the demo signer
pub const DEMO_SIGNATURE_PREFIX: &str = "SIGNED_";

/// Result of the demo signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureResult {
    pub signature: String,
    pub public_key: String,
}

/// SHA-256 of `data` as 64 lowercase hex characters
pub fn hash(data: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(data.as_ref()))
}

/// 256 bits from the OS random source, hex-encoded
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Link a record to its predecessor: `hash(previous_hash ++ data)`
pub fn hash_chain(previous_hash: &str, data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous_hash.as_bytes());
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// Demo signature: `SIGNED_` followed by the message hash.
///
/// Deterministic and keyless. It proves nothing; real verification belongs to
/// the backend.
pub fn sign(message: &str, key_material: &str) -> SignatureResult {
    let public_key = key_material
        .char_indices()
        .rev()
        .nth(39)
        .map_or(key_material, |(idx, _)| &key_material[idx..]);

    SignatureResult {
        signature: format!("{DEMO_SIGNATURE_PREFIX}{}", hash(message)),
        public_key: public_key.to_string(),
    }
}

/// Structural check of a demo signature. Not cryptographically sound.
pub fn verify(_message: &str, signature: &str, _public_key_or_address: &str) -> bool {
    signature
        .strip_prefix(DEMO_SIGNATURE_PREFIX)
        .is_some_and(|digest| digest.len() == 64 && digest.bytes().all(|b| b.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash("abc"), hash("abc"));
        assert_ne!(hash("abc"), hash("abd"));
        assert_eq!(
            hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_format() {
        let digest = hash(b"");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_nonce_is_random_256_bits() {
        let a = generate_nonce();
        let b = generate_nonce();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(hex::decode(&a).unwrap().len(), 32);
    }

    #[test]
    fn test_hash_chain_matches_concatenation() {
        assert_eq!(hash_chain("prev", "data"), hash("prevdata"));
    }

    #[test]
    fn test_demo_sign_and_verify() {
        let key = "0x1234567890abcdef1234567890abcdef12345678ffff";
        let result = sign("hello", key);
        assert_eq!(result.signature, format!("SIGNED_{}", hash("hello")));
        assert_eq!(result.public_key, "567890abcdef1234567890abcdef12345678ffff");
        assert!(verify("hello", &result.signature, &result.public_key));

        assert!(!verify("hello", "0xdeadbeef", key));
        assert!(!verify("hello", "SIGNED_nothex", key));
    }

    #[test]
    fn test_demo_sign_short_key_material() {
        assert_eq!(sign("m", "0xab").public_key, "0xab");
    }
}
