/*
[INPUT]:  Backend schema definitions and serde requirements
[OUTPUT]: Session, challenge, student, registration and ledger records
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{CertificateStatus, IssuerStatus, Role, TransactionType};

/// Authenticated wallet user, persisted as an opaque JSON blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub address: String,
    pub role: Role,
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
}

/// One-time challenge issued to a wallet address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Message the wallet is asked to sign
    pub message: String,
    pub nonce: String,
    pub expires_at: DateTime<Utc>,
}

impl Challenge {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Payload handed to the wallet; falls back to the nonce when the backend
    /// sends no challenge text
    pub fn signing_payload(&self) -> &str {
        if self.message.is_empty() {
            &self.nonce
        } else {
            &self.message
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Wallet address of the student
    pub id: String,
    pub nim: String,
    pub nama: String,
    pub hash_val: String,
    pub unique_nonce: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRegistration {
    pub id_registration: String,
    pub name: String,
    pub wallet_address: String,
    #[serde(default)]
    pub public_key_x: String,
    #[serde(default)]
    pub public_key_y: String,
    pub created_at: i64,
    pub status: IssuerStatus,
}

/// Diploma record held by the in-memory ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub student_name: String,
    pub student_id: String,
    pub institution: String,
    pub degree: String,
    pub issue_date: DateTime<Utc>,
    pub signature_hash: String,
    pub document_hash: String,
    pub ipfs_cid: String,
    pub issuer_address: String,
    pub status: CertificateStatus,
    pub created_at: DateTime<Utc>,
}

impl Certificate {
    pub fn is_active(&self) -> bool {
        self.status == CertificateStatus::Active
    }
}

/// Ledger entry chained to its predecessor by hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub hash: String,
    pub previous_hash: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub certificate_id: String,
    pub issuer_address: String,
    pub data: serde_json::Value,
    pub signature: String,
    pub timestamp: DateTime<Utc>,
    pub block_number: u64,
}
