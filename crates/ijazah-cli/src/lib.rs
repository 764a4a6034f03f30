/*
[INPUT]:  Public API exports for ijazah-cli crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod session;

pub use config::CliConfig;
pub use session::{build_store, describe};
