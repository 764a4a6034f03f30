/*
[INPUT]:  Wallet providers, backend auth endpoints, persisted session slots
[OUTPUT]: Authenticated sessions, signatures, hashes and auth errors
[POS]:    Auth layer - wallet linking and session lifecycle
[UPDATE]: When auth flow, wallet providers or session persistence change
*/

pub mod backend;
pub mod clock;
pub mod crypto;
pub mod evm_wallet;
pub mod jwt;
pub mod storage;
pub mod store;
pub mod wallet;

pub use backend::AuthBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto::SignatureResult;
pub use evm_wallet::LocalKeyProvider;
pub use jwt::{CredentialToken, TokenClaims};
pub use storage::{FileSessionStorage, MemorySessionStorage, PersistedSession, SessionStorage};
pub use store::{AuthPhase, AuthSnapshot, AuthStore};
pub use wallet::{
    DemoWalletProvider, MockWalletProvider, ProviderError, WalletConnector, WalletProvider,
};
