/*
[INPUT]:  Auth backend, session storage, clock and wallet connector
[OUTPUT]: Authenticated session (user + credential token) and its lifecycle
[POS]:    Auth layer - orchestrates challenge/response login, restore, expiry and logout
[UPDATE]: When session phases, persistence or timer semantics change
*/

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::storage::{self, SessionStorage};
use super::{AuthBackend, Clock, CredentialToken, SystemClock, WalletConnector};
use crate::config::AuthConfig;
use crate::http::{Credentials, IjazahError, Result};
use crate::types::{Challenge, Role, User, VerifyResponse};

/// Phase of the login state machine
///
/// `Anonymous -> ChallengeIssued -> Verifying -> Authenticated -> Anonymous`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthPhase {
    #[default]
    Anonymous,
    ChallengeIssued,
    Verifying,
    Authenticated,
}

/// Point-in-time view of the session, cheap to clone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub phase: AuthPhase,
    pub user: Option<User>,
}

impl AuthSnapshot {
    pub fn anonymous() -> Self {
        Self {
            phase: AuthPhase::Anonymous,
            user: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == AuthPhase::Authenticated
            && self.user.as_ref().is_some_and(|user| user.is_authenticated)
    }

    pub fn role(&self) -> Option<Role> {
        if self.is_authenticated() {
            self.user.as_ref().map(|user| user.role)
        } else {
            None
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.role().is_some_and(|role| roles.contains(&role))
    }
}

#[derive(Debug)]
struct PendingChallenge {
    /// Normalized address the challenge was issued to
    address: String,
    challenge: Challenge,
}

#[derive(Debug, Default)]
struct SessionState {
    phase: AuthPhase,
    user: Option<User>,
    token: Option<CredentialToken>,
    // single slot: at most one live challenge
    challenge: Option<PendingChallenge>,
}

#[derive(Debug, Default)]
struct SessionTimer {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

struct Shared {
    backend: Arc<dyn AuthBackend>,
    storage: Arc<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
    state: RwLock<SessionState>,
    timer: Mutex<SessionTimer>,
    initialized: OnceCell<()>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let timer = self.timer.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.handle.take() {
            handle.abort();
        }
    }
}

/// Session context for one process: owns the user, token, live challenge and
/// session timer.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct AuthStore {
    shared: Arc<Shared>,
}

impl AuthStore {
    pub fn new(backend: Arc<dyn AuthBackend>, storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_config(backend, storage, AuthConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn AuthBackend>,
        storage: Arc<dyn SessionStorage>,
        config: AuthConfig,
    ) -> Self {
        Self::with_clock(backend, storage, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        backend: Arc<dyn AuthBackend>,
        storage: Arc<dyn SessionStorage>,
        config: AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                backend,
                storage,
                clock,
                config,
                state: RwLock::new(SessionState::default()),
                timer: Mutex::new(SessionTimer::default()),
                initialized: OnceCell::new(),
            }),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.shared.config
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        let state = self.read_state();
        AuthSnapshot {
            phase: state.phase,
            user: state.user.clone(),
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.read_state().phase
    }

    pub fn user(&self) -> Option<User> {
        self.read_state().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    /// False whenever the session is not authenticated
    pub fn has_role(&self, role: Role) -> bool {
        self.snapshot().has_role(role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.snapshot().has_any_role(roles)
    }

    /// Credential to attach to outbound requests, if authenticated
    pub fn credentials(&self) -> Option<Credentials> {
        session_credentials(&self.read_state())
    }

    /// The live challenge, if any
    pub fn pending_challenge(&self) -> Option<Challenge> {
        self.read_state()
            .challenge
            .as_ref()
            .map(|pending| pending.challenge.clone())
    }

    /// Whether [`AuthStore::init`] has completed
    pub fn is_initialized(&self) -> bool {
        self.shared.initialized.initialized()
    }

    /// Ask the backend for a fresh challenge, replacing any live one.
    ///
    /// Allowed while anonymous or with a challenge already issued (the newer
    /// challenge wins). An authenticated session must log out first.
    pub async fn request_challenge(&self, address: &str) -> Result<Challenge> {
        self.ensure_phase_allows_challenge()?;

        let response = self
            .shared
            .backend
            .request_challenge(address)
            .await
            .map_err(|err| {
                warn!(address = %address, error = %err, "challenge request failed");
                IjazahError::ChallengeRequestFailed(err.to_string())
            })?;

        let expires_at = response.expires_at.unwrap_or_else(|| {
            self.shared.clock.now() + self.shared.config.challenge_ttl_chrono()
        });
        let challenge = Challenge {
            message: response.challenge,
            nonce: response.nonce,
            expires_at,
        };

        let mut state = self.write_state();
        if !accepts_challenge(state.phase) {
            return Err(IjazahError::InvalidState {
                operation: "request challenge",
                phase: state.phase,
            });
        }
        if state.challenge.take().is_some() {
            debug!(address = %address, "replacing unconsumed challenge");
        }
        state.challenge = Some(PendingChallenge {
            address: normalize_address(address),
            challenge: challenge.clone(),
        });
        state.phase = AuthPhase::ChallengeIssued;

        info!(address = %address, expires_at = %challenge.expires_at, "challenge issued");
        Ok(challenge)
    }

    /// Submit the signature over the live challenge for confirmation.
    ///
    /// The challenge is consumed whatever the outcome. Expiry is checked locally
    /// before any network call.
    pub async fn login(&self, address: &str, signature: &str) -> Result<User> {
        let normalized = normalize_address(address);

        {
            let mut state = self.write_state();
            match state.phase {
                AuthPhase::ChallengeIssued => {}
                AuthPhase::Anonymous => {
                    return Err(IjazahError::NoChallenge {
                        address: address.to_string(),
                    });
                }
                phase => {
                    return Err(IjazahError::InvalidState {
                        operation: "login",
                        phase,
                    });
                }
            }

            // a challenge issued to another address stays live
            let Some(pending) = state
                .challenge
                .take_if(|pending| pending.address == normalized)
            else {
                return Err(IjazahError::NoChallenge {
                    address: address.to_string(),
                });
            };

            if pending.challenge.is_expired_at(self.shared.clock.now()) {
                state.phase = AuthPhase::Anonymous;
                warn!(address = %address, "challenge expired before login");
                return Err(IjazahError::ChallengeExpired);
            }

            state.phase = AuthPhase::Verifying;
        }

        let outcome = self
            .shared
            .backend
            .verify_signature(address, signature)
            .await
            .and_then(|response| accept_verification(address, response));

        let (user, token) = match outcome {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(address = %address, error = %err, "login rejected");
                self.abort_verification();
                return Err(err);
            }
        };

        {
            let mut state = self.write_state();
            if state.phase != AuthPhase::Verifying {
                // logged out while the backend was answering
                return Err(IjazahError::InvalidState {
                    operation: "complete login",
                    phase: state.phase,
                });
            }

            if let Err(err) = storage::save_session(self.shared.storage.as_ref(), &user, &token) {
                warn!(address = %address, error = %err, "failed to persist session");
                // the user slot may already be written
                if let Err(clear_err) = storage::clear_session(self.shared.storage.as_ref()) {
                    warn!(address = %address, error = %clear_err, "failed to clear partial session");
                }
                state.phase = AuthPhase::Anonymous;
                return Err(err.into());
            }

            state.user = Some(user.clone());
            state.token = Some(token);
            state.phase = AuthPhase::Authenticated;
            self.shared.backend.session_changed(session_credentials(&state));
        }

        self.arm_session_timer();
        info!(address = %address, role = %user.role, "login succeeded");
        Ok(user)
    }

    /// Same as [`AuthStore::login`]
    pub async fn verify_signature(&self, address: &str, signature: &str) -> Result<User> {
        self.login(address, signature).await
    }

    /// Complete flow against a wallet:
    ///
    /// 1. Connect (if not yet connected)
    /// 2. Request challenge
    /// 3. Sign challenge with wallet
    /// 4. Login
    pub async fn authenticate(&self, wallet: &WalletConnector) -> Result<User> {
        let address = match wallet.address() {
            Some(address) => address,
            None => wallet.connect().await?,
        };

        let challenge = self.request_challenge(&address).await?;

        let signature = match wallet.sign_message(challenge.signing_payload()).await {
            Ok(signature) => signature,
            Err(err) => {
                self.abandon_challenge(&address);
                return Err(err);
            }
        };

        self.login(&address, &signature).await
    }

    /// Restore a persisted session once per store, then revalidate its token.
    ///
    /// Later calls return immediately. A token the backend rejects, or that
    /// cannot be revalidated, forces a logout.
    pub async fn init(&self) {
        self.shared
            .initialized
            .get_or_init(|| self.restore_session())
            .await;
    }

    /// Clear the session locally, then tell the backend.
    ///
    /// Never fails: a backend error is logged and the local session stays cleared.
    pub async fn logout(&self) {
        self.cancel_session_timer();

        let address = {
            let mut state = self.write_state();
            let address = state.user.take().map(|user| user.address);
            *state = SessionState::default();
            self.shared.backend.session_changed(None);
            address
        };

        if let Err(err) = storage::clear_session(self.shared.storage.as_ref()) {
            warn!(error = %err, "failed to clear persisted session");
        }

        if let Some(address) = address {
            info!(address = %address, "logged out");
            if let Err(err) = self.shared.backend.logout(&address).await {
                warn!(address = %address, error = %err, "backend logout notification failed");
            }
        }
    }

    /// Whether the backend holds an active session for the address; false on error
    pub async fn check_session(&self, address: &str) -> bool {
        match self.shared.backend.session_active(address).await {
            Ok(active) => active,
            Err(err) => {
                debug!(address = %address, error = %err, "session check failed");
                false
            }
        }
    }

    /// Restart the session window after user activity.
    ///
    /// Returns false (and arms nothing) when not authenticated.
    pub fn rearm_session_timer(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        self.arm_session_timer();
        true
    }

    pub fn session_timer_armed(&self) -> bool {
        self.lock_timer().handle.is_some()
    }

    async fn restore_session(&self) {
        let persisted = match storage::load_session(self.shared.storage.as_ref()) {
            Ok(persisted) => persisted,
            Err(err) => {
                warn!(error = %err, "failed to read persisted session");
                None
            }
        };
        let Some(session) = persisted else {
            debug!("no persisted session");
            return;
        };

        if session.token.is_expired_at(self.shared.clock.now()) {
            info!(address = %session.user.address, "persisted token expired");
            self.logout().await;
            return;
        }

        let address = session.user.address.clone();
        let token = session.token.clone();
        {
            let mut state = self.write_state();
            if state.phase != AuthPhase::Anonymous {
                debug!(phase = ?state.phase, "session already in progress, skipping restore");
                return;
            }
            state.user = Some(session.user);
            state.token = Some(session.token);
            state.phase = AuthPhase::Authenticated;
            self.shared.backend.session_changed(session_credentials(&state));
        }
        self.arm_session_timer();
        info!(address = %address, "restored persisted session");

        let revalidated = match self.shared.backend.validate_token(token.as_str()).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(IjazahError::TokenInvalid),
            Err(err) => Err(err),
        };

        match revalidated {
            Ok(()) => debug!(address = %address, "persisted token revalidated"),
            Err(err) => {
                warn!(address = %address, error = %err, "persisted session dropped");
                if self.holds_token(&token) {
                    self.logout().await;
                }
            }
        }
    }

    fn ensure_phase_allows_challenge(&self) -> Result<()> {
        let phase = self.phase();
        if !accepts_challenge(phase) {
            return Err(IjazahError::InvalidState {
                operation: "request challenge",
                phase,
            });
        }
        Ok(())
    }

    fn abort_verification(&self) {
        let mut state = self.write_state();
        if state.phase == AuthPhase::Verifying {
            state.phase = AuthPhase::Anonymous;
        }
    }

    fn abandon_challenge(&self, address: &str) {
        let normalized = normalize_address(address);
        let mut state = self.write_state();
        if state
            .challenge
            .take_if(|pending| pending.address == normalized)
            .is_some()
            && state.phase == AuthPhase::ChallengeIssued
        {
            state.phase = AuthPhase::Anonymous;
        }
    }

    fn holds_token(&self, token: &CredentialToken) -> bool {
        self.read_state().token.as_ref() == Some(token)
    }

    fn arm_session_timer(&self) {
        let timeout = self.shared.config.session_timeout;
        // the window runs from arming, not from the task's first poll
        let deadline = tokio::time::Instant::now() + timeout;
        let weak = Arc::downgrade(&self.shared);

        let mut timer = self.lock_timer();
        timer.generation += 1;
        let generation = timer.generation;
        if let Some(previous) = timer.handle.take() {
            previous.abort();
        }

        timer.handle = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let store = AuthStore { shared };
            if store.claim_session_timer(generation) {
                info!("session window elapsed");
                store.logout().await;
            }
        }));
        debug!(generation, timeout_secs = timeout.as_secs(), "session timer armed");
    }

    /// Detach the firing timer from its slot so logout does not abort it
    fn claim_session_timer(&self, generation: u64) -> bool {
        let mut timer = self.lock_timer();
        if timer.generation == generation && timer.handle.is_some() {
            timer.handle = None;
            true
        } else {
            false
        }
    }

    fn cancel_session_timer(&self) {
        let mut timer = self.lock_timer();
        timer.generation += 1;
        if let Some(handle) = timer.handle.take() {
            handle.abort();
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.shared
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_timer(&self) -> MutexGuard<'_, SessionTimer> {
        self.shared
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("snapshot", &self.snapshot())
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

fn session_credentials(state: &SessionState) -> Option<Credentials> {
    if state.phase != AuthPhase::Authenticated {
        return None;
    }
    match (&state.user, &state.token) {
        (Some(user), Some(token)) => Some(Credentials {
            token: token.as_str().to_string(),
            wallet_address: user.address.clone(),
        }),
        _ => None,
    }
}

fn accepts_challenge(phase: AuthPhase) -> bool {
    matches!(phase, AuthPhase::Anonymous | AuthPhase::ChallengeIssued)
}

/// Turn a backend confirmation into a session. The role comes from the
/// backend only; a response without one is rejected.
fn accept_verification(address: &str, response: VerifyResponse) -> Result<(User, CredentialToken)> {
    if !response.success {
        return Err(IjazahError::SignatureInvalid(
            response
                .message
                .unwrap_or_else(|| "backend rejected the signature".to_string()),
        ));
    }

    if let Some(confirmed) = response.wallet_address.as_deref() {
        if normalize_address(confirmed) != normalize_address(address) {
            return Err(IjazahError::InvalidResponse(format!(
                "backend confirmed {confirmed}, expected {address}"
            )));
        }
    }

    let role = response.role.ok_or_else(|| {
        IjazahError::InvalidResponse("verify response carries no role".to_string())
    })?;
    let token = response.token().ok_or_else(|| {
        IjazahError::InvalidResponse("verify response carries no credential token".to_string())
    })?;

    Ok((
        User {
            address: address.to_string(),
            role,
            is_authenticated: true,
        },
        CredentialToken::new(token),
    ))
}

fn normalize_address(address: &str) -> String {
    let address = address.trim();
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address)
        .to_ascii_lowercase()
}
