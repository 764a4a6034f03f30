/*
[INPUT]:  Error sources (HTTP, backend API, wallet provider, session state, storage)
[OUTPUT]: Structured error taxonomy with retry and auth hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or changing wallet/backend error mapping
*/

use reqwest::StatusCode;
use thiserror::Error;

use crate::auth::AuthPhase;

/// Main error type for the ijazah adapter
#[derive(Error, Debug)]
pub enum IjazahError {
    /// No wallet provider is injected
    #[error("No wallet provider available")]
    WalletUnavailable,

    /// The wallet operator declined the prompt (provider code 4001)
    #[error("Request rejected by wallet user")]
    UserRejected,

    /// Any other wallet provider failure
    #[error("Wallet connection failed: {0}")]
    ConnectionFailed(String),

    /// Signing was requested before a successful connect
    #[error("Wallet is not connected")]
    NotConnected,

    /// The backend could not issue a challenge
    #[error("Failed to request challenge: {0}")]
    ChallengeRequestFailed(String),

    /// The live challenge passed its expiry before login
    #[error("Challenge expired, request a new one")]
    ChallengeExpired,

    /// Login attempted without a live challenge for the address
    #[error("No challenge issued for {address}")]
    NoChallenge { address: String },

    /// Backend rejected the signature
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),

    /// Backend refused the role of the wallet on this deployment
    #[error("Role not permitted: {0}")]
    RoleNotPermitted(String),

    /// Backend rejected the stored credential token
    #[error("Credential token is invalid")]
    TokenInvalid,

    /// Operation is not valid from the current session phase
    #[error("Cannot {operation} while session is {phase:?}")]
    InvalidState {
        operation: &'static str,
        phase: AuthPhase,
    },

    /// Contract call reverted
    #[error("Transaction reverted: {0}")]
    TransactionReverted(String),

    /// Sender cannot cover value plus gas
    #[error("Insufficient funds for gas and value")]
    InsufficientFunds,

    /// Transaction nonce already used
    #[error("Nonce too low")]
    NonceTooLow,

    /// Replacement transaction gas price too low
    #[error("Replacement transaction underpriced")]
    ReplacementUnderpriced,

    /// Gas estimation failed (recovered by the gas policy)
    #[error("Gas estimation failed: {0}")]
    GasEstimationFailed(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Path parameter that cannot name a single resource (empty, `.` or `..`)
    #[error("Invalid path parameter: {0:?}")]
    InvalidPathParameter(String),

    /// Persisted session storage failed
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request timeout
    #[error("Request timeout after {duration}s")]
    Timeout { duration: u64 },
}

impl IjazahError {
    /// Check if the error is transient and the operation may be retried
    pub fn is_retryable(&self) -> bool {
        match self {
            IjazahError::Http(_) | IjazahError::Timeout { .. } | IjazahError::NonceTooLow => true,
            IjazahError::Api { code, .. } => *code >= 500,
            _ => false,
        }
    }

    /// Check if error indicates an authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            IjazahError::ChallengeExpired
                | IjazahError::NoChallenge { .. }
                | IjazahError::SignatureInvalid(_)
                | IjazahError::RoleNotPermitted(_)
                | IjazahError::TokenInvalid
        )
    }

    /// Check if the wallet operator declined
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, IjazahError::UserRejected)
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        IjazahError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Result type alias for ijazah operations
pub type Result<T> = std::result::Result<T, IjazahError>;
