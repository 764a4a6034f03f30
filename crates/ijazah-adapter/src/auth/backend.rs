/*
[INPUT]:  Wallet addresses, signatures and credential tokens
[OUTPUT]: Backend decisions on challenges, signatures and sessions
[POS]:    Auth layer - seam between the session store and the backend collaborator
[UPDATE]: When the backend auth contract changes
*/

use async_trait::async_trait;

use crate::http::{Credentials, Result};
use crate::types::{ChallengeResponse, VerifyResponse};

/// Backend operations the session store relies on.
///
/// Implemented over HTTP by [`crate::IjazahClient`]; tests substitute fakes.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Issue a fresh challenge for the address
    async fn request_challenge(&self, address: &str) -> Result<ChallengeResponse>;

    /// Check the signature over the live challenge.
    ///
    /// Role ineligibility surfaces as `RoleNotPermitted`, a bad signature as
    /// `SignatureInvalid`.
    async fn verify_signature(&self, address: &str, signature: &str) -> Result<VerifyResponse>;

    async fn validate_token(&self, token: &str) -> Result<bool>;

    async fn session_active(&self, address: &str) -> Result<bool>;

    async fn logout(&self, address: &str) -> Result<()>;

    /// The store established (`Some`) or dropped (`None`) its session.
    ///
    /// Backends that attach the bearer token to outbound requests keep their
    /// copy in step here. Called with the session state locked.
    fn session_changed(&self, _credentials: Option<Credentials>) {}
}
