/*
[INPUT]:  Backend schema definitions and serde requirements
[OUTPUT]: Typed response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Role;
use super::models::IssuerRegistration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeResponse {
    #[serde(default)]
    pub challenge: String,
    pub nonce: String,
    #[serde(
        rename = "expiresAt",
        alias = "expires_at",
        default,
        deserialize_with = "serde_helpers::deserialize_timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub jwt_token: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

impl VerifyResponse {
    /// Credential issued by the backend, preferring the JWT over the session token
    pub fn token(&self) -> Option<&str> {
        non_empty(&self.jwt_token).or_else(|| non_empty(&self.session_token))
    }
}

fn non_empty(token: &Option<String>) -> Option<&str> {
    token.as_deref().filter(|token| !token.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenValidationResponse {
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    pub active: bool,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentVerifyResponse {
    pub valid: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuerRegistrationList {
    pub total: u32,
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<IssuerRegistration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyCertificateResponse {
    pub success: bool,
    pub valid: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub certificate_text: Option<String>,
    #[serde(default)]
    pub ipfs_cid: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainCertificatesResponse {
    pub success: bool,
    #[serde(default)]
    pub certificates: Vec<serde_json::Value>,
    #[serde(default)]
    pub count: u64,
}

mod serde_helpers {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Number(f64),
        Text(String),
    }

    /// Accepts RFC 3339 text, epoch seconds or epoch milliseconds
    pub fn deserialize_timestamp_opt<'de, D>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawTimestamp>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawTimestamp::Number(value)) => {
                // anything this large is already milliseconds
                let millis = if value.abs() >= 1e11 {
                    value as i64
                } else {
                    (value * 1000.0) as i64
                };
                DateTime::from_timestamp_millis(millis)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {value}")))
            }
            Some(RawTimestamp::Text(text)) => DateTime::parse_from_rfc3339(&text)
                .map(|parsed| Some(parsed.with_timezone(&Utc)))
                .map_err(D::Error::custom),
        }
    }
}
