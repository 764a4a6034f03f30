/*
[INPUT]:  Defaults and process environment
[OUTPUT]: Session timing and deployment network settings
[POS]:    Configuration layer - library-wide settings
[UPDATE]: When adding session knobs or network variables
*/

use std::time::Duration;

use crate::auth::LocalKeyProvider;
use crate::http::{IjazahError, Result};

/// Idle window after which an authenticated session is logged out
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Lifetime assumed for a challenge when the backend sends no expiry
pub const DEFAULT_CHALLENGE_TTL: Duration = Duration::from_secs(5 * 60);
/// Network call timeout for contract deployment and transactions
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(120);

pub const ENV_RPC_URL: &str = "INFURA_SEPOLIA_URL";
pub const ENV_PRIVATE_KEY: &str = "PRIVATE_KEY";
pub const ENV_ETHERSCAN_API_KEY: &str = "ETHERSCAN_API_KEY";

/// Session timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthConfig {
    pub session_timeout: Duration,
    pub challenge_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            challenge_ttl: DEFAULT_CHALLENGE_TTL,
        }
    }
}

impl AuthConfig {
    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    pub fn with_challenge_ttl(mut self, ttl: Duration) -> Self {
        self.challenge_ttl = ttl;
        self
    }

    pub(crate) fn challenge_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.challenge_ttl).unwrap_or(chrono::Duration::MAX)
    }
}

/// Sepolia deployment settings
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub private_key: String,
    pub etherscan_api_key: Option<String>,
    pub timeout: Duration,
}

impl NetworkConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; blank values count as missing
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let rpc_url = read(ENV_RPC_URL)
            .ok_or_else(|| IjazahError::Config(format!("{ENV_RPC_URL} is not set")))?;
        url::Url::parse(&rpc_url)
            .map_err(|e| IjazahError::Config(format!("{ENV_RPC_URL} is not a valid URL: {e}")))?;
        let private_key = read(ENV_PRIVATE_KEY)
            .ok_or_else(|| IjazahError::Config(format!("{ENV_PRIVATE_KEY} is not set")))?;

        Ok(Self {
            rpc_url,
            private_key,
            etherscan_api_key: read(ENV_ETHERSCAN_API_KEY),
            timeout: NETWORK_TIMEOUT,
        })
    }

    /// Address controlled by the deployer key
    pub fn deployer_address(&self) -> Result<String> {
        Ok(LocalKeyProvider::new(&self.private_key)?.address().to_string())
    }
}

impl std::fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"<redacted>")
            .field(
                "etherscan_api_key",
                &self.etherscan_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}
