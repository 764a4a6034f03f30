/*
[INPUT]:  Provider failures and gas estimates for certificate contract calls
[OUTPUT]: Typed transaction errors and gas limits
[POS]:    Contract layer - transaction submission helpers
[UPDATE]: When contract methods or provider error formats change
*/

pub mod errors;
pub mod gas;

pub use errors::{classify_provider_error, classify_provider_failure};
pub use gas::{DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE_GWEI, GasPolicy, gwei_to_wei};
