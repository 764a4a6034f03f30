/*
[INPUT]:  Opaque credential tokens issued by the backend
[OUTPUT]: Best-effort JWT claims and local expiry status
[POS]:    Auth layer - credential token inspection (never verification)
[UPDATE]: When the backend changes token format or claim names
*/

use base64::{
    Engine as _,
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims the backend puts in its JWTs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Bearer credential proving an established session.
///
/// Treated as opaque; the backend may hand out a plain session token instead
/// of a JWT, in which case no claims are available.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialToken(String);

impl CredentialToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the payload segment without checking the signature
    pub fn claims(&self) -> Option<TokenClaims> {
        let payload_b64 = self.0.trim().split('.').nth(1)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .or_else(|_| URL_SAFE.decode(payload_b64))
            .ok()?;
        serde_json::from_slice(&payload).ok()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims()?
            .exp
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// True only when the token carries an `exp` claim that has passed
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| now >= expires_at)
    }
}

impl std::fmt::Debug for CredentialToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CredentialToken(<redacted>)")
    }
}
