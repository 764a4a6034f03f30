/*
[INPUT]:  Contract method name and a gas estimate (or its failure)
[OUTPUT]: Gas limit to submit with the transaction
[POS]:    Contract layer - gas limit policy with per-method fallback
[UPDATE]: When contract methods or their typical gas usage change
*/

use std::collections::HashMap;
use std::future::Future;

use tracing::warn;

use crate::http::{IjazahError, Result};

/// Limit used when neither the estimate nor the method table helps
pub const DEFAULT_GAS_LIMIT: u64 = 2_000_000;
/// Headroom added on top of a successful estimate
pub const DEFAULT_BUFFER_PERCENT: u64 = 20;
pub const DEFAULT_GAS_PRICE_GWEI: u64 = 50;

const GWEI: u64 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPolicy {
    buffer_percent: u64,
    method_defaults: HashMap<String, u64>,
    fallback: u64,
}

impl Default for GasPolicy {
    fn default() -> Self {
        let method_defaults = [
            ("issueCertificate", 500_000),
            ("revokeCertificate", 200_000),
            ("registerIssuer", 300_000),
            ("signCertificate", 250_000),
        ]
        .into_iter()
        .map(|(method, limit)| (method.to_string(), limit))
        .collect();

        Self {
            buffer_percent: DEFAULT_BUFFER_PERCENT,
            method_defaults,
            fallback: DEFAULT_GAS_LIMIT,
        }
    }
}

impl GasPolicy {
    pub fn with_buffer_percent(mut self, percent: u64) -> Self {
        self.buffer_percent = percent;
        self
    }

    pub fn with_method_default(mut self, method: &str, limit: u64) -> Self {
        self.method_defaults.insert(method.to_string(), limit);
        self
    }

    pub fn buffered(&self, estimate: u64) -> u64 {
        estimate.saturating_add(estimate.saturating_mul(self.buffer_percent) / 100)
    }

    pub fn default_for(&self, method: &str) -> u64 {
        self.method_defaults
            .get(method)
            .copied()
            .unwrap_or(self.fallback)
    }

    /// Buffered estimate, or the method default when estimation failed.
    ///
    /// Estimation failures are recovered here and never surface to the caller.
    pub fn gas_limit(&self, method: &str, estimate: Result<u64>) -> u64 {
        match estimate {
            Ok(0) => self.default_for(method),
            Ok(estimate) => self.buffered(estimate),
            Err(err) => {
                let err = match err {
                    err @ IjazahError::GasEstimationFailed(_) => err,
                    other => IjazahError::GasEstimationFailed(other.to_string()),
                };
                let limit = self.default_for(method);
                warn!(method = %method, error = %err, limit, "using fallback gas limit");
                limit
            }
        }
    }

    /// Run an estimator and apply [`GasPolicy::gas_limit`] to its outcome
    pub async fn resolve<F, Fut>(&self, method: &str, estimate: F) -> u64
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<u64>>,
    {
        self.gas_limit(method, estimate().await)
    }
}

pub fn gwei_to_wei(gwei: u64) -> u128 {
    u128::from(gwei) * u128::from(GWEI)
}
