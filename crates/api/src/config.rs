//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use saga::{OrchestratorConfig, PaymentSimulation};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `ORDER_TIMEOUT_MS`: deadline for one order creation (default: `10000`)
/// - `COMPENSATION_TIMEOUT_MS`: bound for each compensating release (default: `5000`)
/// - `PAYMENT_SUCCESS_RATE`: approval probability of the simulated gateway (default: `0.9`)
/// - `PAYMENT_MIN_DELAY_MS` / `PAYMENT_MAX_DELAY_MS`: simulated processing delay (default: `100` / `600`)
/// - `PAYMENT_CURRENCY` / `PAYMENT_METHOD`: sent with every charge (default: `USD` / `credit_card`)
///
/// Unparseable values fall back to the default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_json: bool,
    pub order_timeout: Duration,
    pub compensation_timeout: Duration,
    pub payment_success_rate: f64,
    pub payment_min_delay: Duration,
    pub payment_max_delay: Duration,
    pub payment_currency: String,
    pub payment_method: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let millis = |key: &str, default: Duration| {
            parsed(key).map(Duration::from_millis).unwrap_or(default)
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(lookup("PORT"), defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_json: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
            order_timeout: millis("ORDER_TIMEOUT_MS", defaults.order_timeout),
            compensation_timeout: millis("COMPENSATION_TIMEOUT_MS", defaults.compensation_timeout),
            payment_success_rate: parse_or(
                lookup("PAYMENT_SUCCESS_RATE"),
                defaults.payment_success_rate,
            ),
            payment_min_delay: millis("PAYMENT_MIN_DELAY_MS", defaults.payment_min_delay),
            payment_max_delay: millis("PAYMENT_MAX_DELAY_MS", defaults.payment_max_delay),
            payment_currency: lookup("PAYMENT_CURRENCY").unwrap_or(defaults.payment_currency),
            payment_method: lookup("PAYMENT_METHOD").unwrap_or(defaults.payment_method),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            call_timeout: self.order_timeout,
            compensation_timeout: self.compensation_timeout,
            currency: self.payment_currency.clone(),
            payment_method: self.payment_method.clone(),
        }
    }

    pub fn payment_simulation(&self) -> PaymentSimulation {
        PaymentSimulation::new(
            self.payment_success_rate,
            self.payment_min_delay,
            self.payment_max_delay,
        )
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        let orchestrator = OrchestratorConfig::default();
        let simulation = PaymentSimulation::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_json: false,
            order_timeout: orchestrator.call_timeout,
            compensation_timeout: orchestrator.compensation_timeout,
            payment_success_rate: simulation.success_rate(),
            payment_min_delay: simulation.min_delay(),
            payment_max_delay: simulation.max_delay(),
            payment_currency: orchestrator.currency,
            payment_method: orchestrator.payment_method,
        }
    }
}
