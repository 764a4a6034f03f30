/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and fake backends
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for ijazah-adapter tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use ijazah_adapter::auth::ManualClock;
use ijazah_adapter::auth::storage::TOKEN_SLOT;
use ijazah_adapter::{
    AuthBackend, AuthConfig, AuthStore, ChallengeResponse, Credentials, IjazahError,
    MemorySessionStorage, Result, Role, SessionStorage, VerifyResponse,
};
use uuid::Uuid;
use wiremock::MockServer;

pub const ADDRESS: &str = "0xabc0000000000000000000000000000000000123";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Unique scratch directory under the system temp dir
pub fn temp_dir() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("ijazah-adapter-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&path).unwrap();
    path
}

/// Unsigned JWT carrying the given claims
pub fn make_test_jwt(payload: serde_json::Value) -> String {
    let header = serde_json::json!({"alg": "HS256", "typ": "JWT"});
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap());
    let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
    format!("{header_b64}.{payload_b64}.signature")
}

/// How the fake answers `/auth/verify`
#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    Confirm { role: Role, token: String },
    Mismatch,
    Forbidden,
}

/// In-process backend with call counters and switchable failures
#[derive(Debug)]
pub struct FakeBackend {
    pub nonce: Mutex<String>,
    pub challenge_expires_at: Mutex<Option<DateTime<Utc>>>,
    pub verify_outcome: Mutex<VerifyOutcome>,
    pub token_valid: AtomicBool,
    pub session_active: AtomicBool,
    pub fail_challenge: AtomicBool,
    pub fail_validate: AtomicBool,
    pub fail_logout: AtomicBool,
    pub challenge_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub validate_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub validated_tokens: Mutex<Vec<String>>,
    pub logged_out: Mutex<Vec<String>>,
    /// Last credential pushed by the store
    pub session_credentials: Mutex<Option<Credentials>>,
}

impl FakeBackend {
    /// Confirms every signature as `issuer` with token `T1`, nonce `N1`
    pub fn new() -> Self {
        Self::confirming(Role::Issuer, "T1")
    }

    pub fn confirming(role: Role, token: &str) -> Self {
        Self {
            nonce: Mutex::new("N1".to_string()),
            challenge_expires_at: Mutex::new(None),
            verify_outcome: Mutex::new(VerifyOutcome::Confirm {
                role,
                token: token.to_string(),
            }),
            token_valid: AtomicBool::new(true),
            session_active: AtomicBool::new(true),
            fail_challenge: AtomicBool::new(false),
            fail_validate: AtomicBool::new(false),
            fail_logout: AtomicBool::new(false),
            challenge_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
            validate_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            validated_tokens: Mutex::new(Vec::new()),
            logged_out: Mutex::new(Vec::new()),
            session_credentials: Mutex::new(None),
        }
    }

    pub fn set_nonce(&self, nonce: &str) {
        *self.nonce.lock().unwrap() = nonce.to_string();
    }

    pub fn set_verify_outcome(&self, outcome: VerifyOutcome) {
        *self.verify_outcome.lock().unwrap() = outcome;
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.session_credentials
            .lock()
            .unwrap()
            .as_ref()
            .map(|credentials| credentials.token.clone())
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn request_challenge(&self, wallet_address: &str) -> Result<ChallengeResponse> {
        self.challenge_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_challenge.load(Ordering::SeqCst) {
            return Err(IjazahError::Timeout { duration: 120 });
        }
        let nonce = self.nonce.lock().unwrap().clone();
        Ok(ChallengeResponse {
            challenge: format!("Sign in to Ijazah as {wallet_address}: {nonce}"),
            nonce,
            expires_at: *self.challenge_expires_at.lock().unwrap(),
        })
    }

    async fn verify_signature(&self, wallet_address: &str, _signature: &str) -> Result<VerifyResponse> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        match self.verify_outcome.lock().unwrap().clone() {
            VerifyOutcome::Confirm { role, token } => Ok(VerifyResponse {
                success: true,
                message: Some("Authentication successful".to_string()),
                session_token: None,
                jwt_token: Some(token),
                role: Some(role),
                wallet_address: Some(wallet_address.to_string()),
            }),
            VerifyOutcome::Mismatch => Err(IjazahError::SignatureInvalid(
                "Invalid signature".to_string(),
            )),
            VerifyOutcome::Forbidden => Err(IjazahError::RoleNotPermitted(
                "Role not allowed".to_string(),
            )),
        }
    }

    async fn validate_token(&self, token: &str) -> Result<bool> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        self.validated_tokens.lock().unwrap().push(token.to_string());
        if self.fail_validate.load(Ordering::SeqCst) {
            return Err(IjazahError::Api {
                code: 502,
                message: "Bad Gateway".to_string(),
            });
        }
        Ok(self.token_valid.load(Ordering::SeqCst))
    }

    async fn session_active(&self, _wallet_address: &str) -> Result<bool> {
        if self.fail_validate.load(Ordering::SeqCst) {
            return Err(IjazahError::Timeout { duration: 120 });
        }
        Ok(self.session_active.load(Ordering::SeqCst))
    }

    async fn logout(&self, wallet_address: &str) -> Result<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.logged_out.lock().unwrap().push(wallet_address.to_string());
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(IjazahError::Timeout { duration: 120 });
        }
        Ok(())
    }

    fn session_changed(&self, credentials: Option<Credentials>) {
        *self.session_credentials.lock().unwrap() = credentials;
    }
}

/// Storage whose writes always fail
#[derive(Debug, Default)]
pub struct ReadOnlyStorage;

impl SessionStorage for ReadOnlyStorage {
    fn load(&self, _slot: &str) -> std::io::Result<Option<String>> {
        Ok(None)
    }

    fn save(&self, _slot: &str, _value: &str) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only storage",
        ))
    }

    fn remove(&self, _slot: &str) -> std::io::Result<()> {
        Ok(())
    }
}

/// Memory storage whose token-slot writes fail after the user slot is written
#[derive(Debug, Default)]
pub struct TokenSlotFailingStorage {
    pub inner: MemorySessionStorage,
}

impl SessionStorage for TokenSlotFailingStorage {
    fn load(&self, slot: &str) -> std::io::Result<Option<String>> {
        self.inner.load(slot)
    }

    fn save(&self, slot: &str, value: &str) -> std::io::Result<()> {
        if slot == TOKEN_SLOT {
            return Err(std::io::Error::other("disk full"));
        }
        self.inner.save(slot, value)
    }

    fn remove(&self, slot: &str) -> std::io::Result<()> {
        self.inner.remove(slot)
    }
}

pub fn store_with(
    backend: Arc<FakeBackend>,
    storage: Arc<dyn SessionStorage>,
    clock: Arc<ManualClock>,
) -> AuthStore {
    AuthStore::with_clock(backend, storage, AuthConfig::default(), clock)
}

/// Let spawned tasks (the session timer) run to completion
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
