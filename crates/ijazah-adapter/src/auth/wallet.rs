/*
[INPUT]:  Injected wallet provider (request/response) and messages to sign
[OUTPUT]: Connected address, message signatures, typed rejection errors
[POS]:    Auth layer - wallet integration abstraction
[UPDATE]: When adding new wallet types or changing provider error mapping
*/

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};

use super::crypto;
use crate::http::{IjazahError, Result};

/// Error reported by a wallet provider, keyed by the provider's numeric code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    /// The human declined the prompt
    pub const USER_REJECTED: i64 = 4001;
    /// The requested account is not controlled by this provider
    pub const UNAUTHORIZED: i64 = 4100;
    /// The provider does not implement the method
    pub const UNSUPPORTED_METHOD: i64 = 4200;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(Self::USER_REJECTED, "User rejected the request.")
    }

    pub fn unsupported(method: &str) -> Self {
        Self::new(
            Self::UNSUPPORTED_METHOD,
            format!("Unsupported method: {method}"),
        )
    }
}

impl From<ProviderError> for IjazahError {
    fn from(err: ProviderError) -> Self {
        if err.code == ProviderError::USER_REJECTED {
            IjazahError::UserRejected
        } else {
            IjazahError::ConnectionFailed(err.message)
        }
    }
}

/// Injected-provider interface: one asynchronous request per call.
///
/// Must support at least `eth_requestAccounts` and `personal_sign`.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> std::result::Result<Value, ProviderError>;
}

/// Holds the connected address and routes signing through the provider
pub struct WalletConnector {
    provider: Option<Arc<dyn WalletProvider>>,
    address: RwLock<Option<String>>,
}

impl WalletConnector {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self::from_provider(Some(provider))
    }

    /// A connector for an environment without an injected wallet
    pub fn unavailable() -> Self {
        Self::from_provider(None)
    }

    pub fn from_provider(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            provider,
            address: RwLock::new(None),
        }
    }

    /// Ask the wallet to expose an account and remember the first one
    pub async fn connect(&self) -> Result<String> {
        let provider = self.provider()?;
        let accounts = provider.request("eth_requestAccounts", json!([])).await?;
        let address = accounts
            .as_array()
            .and_then(|list| list.first())
            .and_then(Value::as_str)
            .ok_or_else(|| IjazahError::ConnectionFailed("wallet returned no accounts".to_string()))?
            .to_string();

        *self.address.write().unwrap_or_else(PoisonError::into_inner) = Some(address.clone());
        info!(address = %address, "wallet connected");
        Ok(address)
    }

    /// Forget the local address; no provider call
    pub fn disconnect(&self) {
        let previous = self
            .address
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(address) = previous {
            debug!(address = %address, "wallet disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.address().is_some()
    }

    pub fn address(&self) -> Option<String> {
        self.address
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `personal_sign` over the UTF-8 message, hex-encoded as wallets expect
    pub async fn sign_message(&self, message: &str) -> Result<String> {
        let address = self.address().ok_or(IjazahError::NotConnected)?;
        let provider = self.provider()?;
        let payload = format!("0x{}", hex::encode(message.as_bytes()));
        let result = provider
            .request("personal_sign", json!([payload, address]))
            .await?;

        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| IjazahError::ConnectionFailed("wallet returned a non-string signature".to_string()))
    }

    fn provider(&self) -> Result<&Arc<dyn WalletProvider>> {
        self.provider.as_ref().ok_or(IjazahError::WalletUnavailable)
    }
}

impl std::fmt::Debug for WalletConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConnector")
            .field("has_provider", &self.provider.is_some())
            .field("address", &self.address())
            .finish()
    }
}

/// Decode a `personal_sign` payload: `0x`-hex when it parses, raw text otherwise
pub(crate) fn decode_sign_payload(payload: &str) -> Vec<u8> {
    payload
        .strip_prefix("0x")
        .and_then(|hex_body| hex::decode(hex_body).ok())
        .unwrap_or_else(|| payload.as_bytes().to_vec())
}

/// Extract the `personal_sign` message and account parameters
pub(crate) fn personal_sign_params(params: &Value) -> std::result::Result<(Vec<u8>, String), ProviderError> {
    let list = params.as_array();
    let message = list
        .and_then(|list| list.first())
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::new(-32602, "personal_sign expects [message, address]"))?;
    let account = list
        .and_then(|list| list.get(1))
        .and_then(Value::as_str)
        .unwrap_or_default();
    Ok((decode_sign_payload(message), account.to_string()))
}

/// Simulated browser wallet: random address, `SIGNED_` signatures
#[derive(Debug, Clone)]
pub struct DemoWalletProvider {
    address: String,
}

impl DemoWalletProvider {
    pub fn new() -> Self {
        let nonce = crypto::generate_nonce();
        Self {
            address: format!("0x{}", &nonce[..40]),
        }
    }

    pub fn with_address(address: &str) -> Self {
        Self {
            address: address.to_string(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Default for DemoWalletProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for DemoWalletProvider {
    async fn request(&self, method: &str, params: Value) -> std::result::Result<Value, ProviderError> {
        match method {
            "eth_requestAccounts" | "eth_accounts" => Ok(json!([self.address])),
            "personal_sign" => {
                let (message, _) = personal_sign_params(&params)?;
                let message = String::from_utf8_lossy(&message);
                Ok(json!(crypto::sign(&message, &self.address).signature))
            }
            other => Err(ProviderError::unsupported(other)),
        }
    }
}

/// Scripted provider for tests: queued responses per call, then a fallback
#[derive(Debug)]
pub struct MockWalletProvider {
    address: String,
    signature: String,
    script: Mutex<VecDeque<std::result::Result<Value, ProviderError>>>,
    calls: Mutex<Vec<String>>,
}

impl MockWalletProvider {
    /// Create a new mock provider with a predetermined address and signature
    pub fn new(address: &str, signature: &str) -> Self {
        Self {
            address: address.to_string(),
            signature: signature.to_string(),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a one-off outcome consumed by the next request
    pub fn push_response(&self, outcome: std::result::Result<Value, ProviderError>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Methods requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn request(&self, method: &str, _params: Value) -> std::result::Result<Value, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(method.to_string());

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(outcome) = scripted {
            return outcome;
        }

        match method {
            "eth_requestAccounts" | "eth_accounts" => Ok(json!([self.address])),
            "personal_sign" => Ok(json!(self.signature)),
            other => Err(ProviderError::unsupported(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector_with(provider: MockWalletProvider) -> (WalletConnector, Arc<MockWalletProvider>) {
        let provider = Arc::new(provider);
        (WalletConnector::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn test_connect_and_sign() {
        let (connector, provider) =
            connector_with(MockWalletProvider::new("0x1234567890abcdef", "0xmock_signature"));

        assert!(!connector.is_connected());
        let address = connector.connect().await.unwrap();
        assert_eq!(address, "0x1234567890abcdef");
        assert!(connector.is_connected());

        let signature = connector.sign_message("test message").await.unwrap();
        assert_eq!(signature, "0xmock_signature");
        assert_eq!(provider.calls(), vec!["eth_requestAccounts", "personal_sign"]);
    }

    #[tokio::test]
    async fn test_no_provider_is_wallet_unavailable() {
        let connector = WalletConnector::unavailable();
        let err = connector.connect().await.unwrap_err();
        assert!(matches!(err, IjazahError::WalletUnavailable));
    }

    #[tokio::test]
    async fn test_sign_before_connect_is_not_connected() {
        let (connector, provider) = connector_with(MockWalletProvider::new("0xabc", "0xsig"));
        let err = connector.sign_message("hello").await.unwrap_err();
        assert!(matches!(err, IjazahError::NotConnected));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_and_failure_mapping() {
        let (connector, provider) = connector_with(MockWalletProvider::new("0xabc", "0xsig"));

        provider.push_response(Err(ProviderError::user_rejected()));
        assert!(matches!(
            connector.connect().await.unwrap_err(),
            IjazahError::UserRejected
        ));
        assert!(!connector.is_connected());

        provider.push_response(Err(ProviderError::new(-32603, "Internal JSON-RPC error")));
        match connector.connect().await.unwrap_err() {
            IjazahError::ConnectionFailed(message) => assert_eq!(message, "Internal JSON-RPC error"),
            other => panic!("unexpected error: {other:?}"),
        }

        connector.connect().await.unwrap();
        provider.push_response(Err(ProviderError::user_rejected()));
        assert!(matches!(
            connector.sign_message("hello").await.unwrap_err(),
            IjazahError::UserRejected
        ));
    }

    #[tokio::test]
    async fn test_empty_account_list_fails() {
        let (connector, provider) = connector_with(MockWalletProvider::new("0xabc", "0xsig"));
        provider.push_response(Ok(json!([])));
        assert!(matches!(
            connector.connect().await.unwrap_err(),
            IjazahError::ConnectionFailed(_)
        ));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (connector, _provider) = connector_with(MockWalletProvider::new("0xabc", "0xsig"));
        connector.connect().await.unwrap();
        connector.disconnect();
        connector.disconnect();
        assert!(!connector.is_connected());
    }

    #[tokio::test]
    async fn test_demo_provider_signs_message_hash() {
        let provider = Arc::new(DemoWalletProvider::new());
        assert!(provider.address().starts_with("0x"));
        assert_eq!(provider.address().len(), 42);

        let connector = WalletConnector::new(provider.clone());
        connector.connect().await.unwrap();
        let signature = connector.sign_message("nonce-1").await.unwrap();

        assert_eq!(signature, format!("SIGNED_{}", crypto::hash("nonce-1")));
        assert!(crypto::verify("nonce-1", &signature, provider.address()));
    }

    #[test]
    fn test_decode_sign_payload() {
        assert_eq!(decode_sign_payload("0x68656c6c6f"), b"hello".to_vec());
        assert_eq!(decode_sign_payload("plain text"), b"plain text".to_vec());
        assert_eq!(decode_sign_payload("0xnot-hex"), b"0xnot-hex".to_vec());
    }
}
