/*
[INPUT]:  EVM private key (hex string)
[OUTPUT]: Wallet provider answering account and personal_sign requests
[POS]:    Auth layer - local-key EVM wallet implementation
[UPDATE]: When signing logic or EVM address formatting changes
*/

use std::str::FromStr;

use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use serde_json::{Value, json};

use super::wallet::{ProviderError, WalletProvider, personal_sign_params};
use crate::http::{IjazahError, Result};

/// Wallet provider backed by a local EVM private key (CLI and scripted logins)
pub struct LocalKeyProvider {
    signer: PrivateKeySigner,
    address: String,
}

impl LocalKeyProvider {
    /// Create a new provider from a hex-encoded private key
    ///
    /// Supports both "0x"-prefixed and non-prefixed hex strings.
    pub fn new(private_key_hex: &str) -> Result<Self> {
        let private_key_hex = private_key_hex.trim();
        let private_key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let signer = PrivateKeySigner::from_str(private_key_hex)
            .map_err(|e| IjazahError::Config(format!("Invalid EVM private key: {e}")))?;

        let address = signer.address().to_checksum(None);

        Ok(Self { signer, address })
    }

    /// Checksummed address of the key
    pub fn address(&self) -> &str {
        &self.address
    }

    /// EIP-191 signature, `0x` + r,s,v hex
    pub async fn sign_bytes(&self, message: &[u8]) -> Result<String> {
        let signature = self
            .signer
            .sign_message(message)
            .await
            .map_err(|e| IjazahError::ConnectionFailed(format!("Failed to sign EVM message: {e}")))?;

        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}

impl std::fmt::Debug for LocalKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyProvider")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WalletProvider for LocalKeyProvider {
    async fn request(&self, method: &str, params: Value) -> std::result::Result<Value, ProviderError> {
        match method {
            "eth_requestAccounts" | "eth_accounts" => Ok(json!([self.address])),
            "personal_sign" => {
                let (message, account) = personal_sign_params(&params)?;
                if !account.is_empty() && !account.eq_ignore_ascii_case(&self.address) {
                    return Err(ProviderError::new(
                        ProviderError::UNAUTHORIZED,
                        format!("Account {account} is not controlled by this wallet"),
                    ));
                }
                self.sign_bytes(&message)
                    .await
                    .map(Value::String)
                    .map_err(|e| ProviderError::new(-32603, e.to_string()))
            }
            other => Err(ProviderError::unsupported(other)),
        }
    }
}
