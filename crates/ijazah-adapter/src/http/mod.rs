/*
[INPUT]:  HTTP client configuration and backend endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod auth;
pub mod client;
pub mod error;
pub mod records;

pub use error::{IjazahError, Result};

pub use client::{ClientConfig, Credentials, DEFAULT_BASE_URL, IjazahClient};
