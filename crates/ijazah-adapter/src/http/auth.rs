/*
[INPUT]:  Wallet addresses, signatures and credential tokens
[OUTPUT]: Challenge, verification, validation and logout results
[POS]:    HTTP layer - authentication endpoints backing the session store
[UPDATE]: When auth endpoints or their status-code semantics change
*/

use async_trait::async_trait;
use reqwest::Method;

use crate::auth::AuthBackend;
use crate::http::{Credentials, IjazahClient, IjazahError, Result};
use crate::types::{
    ChallengeRequest, ChallengeResponse, LogoutRequest, SessionStatusResponse,
    TokenValidationResponse, VerifyRequest, VerifyResponse,
};

impl IjazahClient {
    /// POST /auth/challenge
    pub async fn request_challenge(&self, wallet_address: &str) -> Result<ChallengeResponse> {
        let body = ChallengeRequest {
            wallet_address: wallet_address.to_string(),
        };
        let builder = self.request(Method::POST, &["auth", "challenge"])?.json(&body);
        self.send_json(builder).await
    }

    /// POST /auth/verify
    ///
    /// 403 means the wallet's role may not sign in here; 400/401 mean the
    /// signature or challenge did not check out.
    pub async fn verify_signature(
        &self,
        wallet_address: &str,
        signature: &str,
    ) -> Result<VerifyResponse> {
        let body = VerifyRequest {
            wallet_address: wallet_address.to_string(),
            signature: signature.to_string(),
        };
        let builder = self.request(Method::POST, &["auth", "verify"])?.json(&body);
        self.send_json(builder).await.map_err(|err| match err {
            IjazahError::Api { code: 403, message } => IjazahError::RoleNotPermitted(message),
            IjazahError::Api {
                code: 400 | 401,
                message,
            } => IjazahError::SignatureInvalid(message),
            other => other,
        })
    }

    /// GET /auth/validate-token?token=...
    pub async fn validate_token(&self, token: &str) -> Result<bool> {
        let builder = self
            .request(Method::GET, &["auth", "validate-token"])?
            .query(&[("token", token)]);
        match self.send_json::<TokenValidationResponse>(builder).await {
            Ok(response) => Ok(response.valid),
            Err(IjazahError::Api { code: 401, .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// GET /auth/session/:address
    pub async fn session_status(&self, wallet_address: &str) -> Result<SessionStatusResponse> {
        let builder = self.request(Method::GET, &["auth", "session", wallet_address])?;
        self.send_json(builder).await
    }

    /// POST /auth/logout
    pub async fn logout(&self, wallet_address: &str) -> Result<()> {
        let body = LogoutRequest {
            wallet_address: wallet_address.to_string(),
        };
        let builder = self.request(Method::POST, &["auth", "logout"])?.json(&body);
        self.send_empty(builder).await
    }
}

#[async_trait]
impl AuthBackend for IjazahClient {
    async fn request_challenge(&self, address: &str) -> Result<ChallengeResponse> {
        IjazahClient::request_challenge(self, address).await
    }

    async fn verify_signature(&self, address: &str, signature: &str) -> Result<VerifyResponse> {
        IjazahClient::verify_signature(self, address, signature).await
    }

    async fn validate_token(&self, token: &str) -> Result<bool> {
        IjazahClient::validate_token(self, token).await
    }

    async fn session_active(&self, address: &str) -> Result<bool> {
        Ok(self.session_status(address).await?.active)
    }

    async fn logout(&self, address: &str) -> Result<()> {
        IjazahClient::logout(self, address).await
    }

    fn session_changed(&self, credentials: Option<Credentials>) {
        match credentials {
            Some(credentials) => self.set_credentials(credentials),
            None => self.clear_credentials(),
        }
    }
}
