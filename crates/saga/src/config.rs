//! Orchestrator settings.

use std::time::Duration;

use crate::order_creation::{DEFAULT_CURRENCY, DEFAULT_PAYMENT_METHOD};

/// Settings for [`OrderOrchestrator`](crate::OrderOrchestrator).
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Deadline for a whole order creation when the request does not carry one.
    /// Every reserve and charge call is bounded by it.
    pub call_timeout: Duration,
    /// Bound for each release issued during compensation. Compensation does
    /// not inherit the request deadline, which may already have passed.
    pub compensation_timeout: Duration,
    pub currency: String,
    pub payment_method: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            compensation_timeout: Duration::from_secs(5),
            currency: DEFAULT_CURRENCY.to_string(),
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.call_timeout, Duration::from_secs(10));
        assert_eq!(config.compensation_timeout, Duration::from_secs(5));
        assert_eq!(config.currency, "USD");
        assert_eq!(config.payment_method, "credit_card");
    }
}
