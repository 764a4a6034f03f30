/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public ijazah adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod config;
pub mod contract;
pub mod http;
pub mod ledger;
pub mod router;
pub mod types;
pub mod validators;

// Re-export commonly used types from auth
pub use auth::{
    AuthBackend,
    AuthPhase,
    AuthSnapshot,
    AuthStore,
    CredentialToken,
    DemoWalletProvider,
    FileSessionStorage,
    LocalKeyProvider,
    MemorySessionStorage,
    ProviderError,
    SessionStorage,
    WalletConnector,
    WalletProvider,
};

pub use config::{AuthConfig, NetworkConfig};

pub use contract::{GasPolicy, classify_provider_error};

// Re-export commonly used types from http
pub use http::{
    ClientConfig,
    Credentials,
    IjazahClient,
    IjazahError,
    Result,
};

pub use ledger::{CertificateLedger, CertificatePatch, IssueCertificatePayload, LedgerError};

pub use router::{Navigation, Route, RouteGuard, RouteTable};

// Re-export all types
pub use types::*;
