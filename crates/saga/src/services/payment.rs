//! Payment service trait, simulated gateway, and scripted test double.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use common::{CustomerId, Money, OrderId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::ServiceError;
use crate::order_creation::{DEFAULT_CURRENCY, DEFAULT_PAYMENT_METHOD};

const SERVICE: &str = "payment";

/// A charge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub amount: Money,
    pub currency: String,
    pub payment_method: String,
}

impl PaymentRequest {
    /// Creates a request in the default currency and payment method.
    pub fn new(order_id: OrderId, customer_id: CustomerId, amount: Money) -> Self {
        Self {
            order_id,
            customer_id,
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Success,
    Failed,
}

/// Result of a charge. A `Failed` status is a normal decline, not a fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub payment_id: String,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub message: String,
}

impl PaymentOutcome {
    pub fn is_success(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}

/// Trait for payment processing operations.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Attempts to charge the requested amount.
    async fn process_payment(&self, request: PaymentRequest)
    -> Result<PaymentOutcome, ServiceError>;
}

fn validate_amount(amount: Money) -> Result<(), ServiceError> {
    if amount.is_negative() {
        return Err(ServiceError::InvalidArgument(format!(
            "payment amount must not be negative, got {amount}"
        )));
    }
    Ok(())
}

/// Parameters for [`SimulatedPaymentService`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentSimulation {
    success_rate: f64,
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for PaymentSimulation {
    fn default() -> Self {
        Self {
            success_rate: 0.9,
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(600),
        }
    }
}

impl PaymentSimulation {
    pub fn new(success_rate: f64, min_delay: Duration, max_delay: Duration) -> Self {
        Self::default()
            .with_success_rate(success_rate)
            .with_delay(min_delay, max_delay)
    }

    /// Sets the approval probability, clamped to `[0, 1]`.
    pub fn with_success_rate(mut self, success_rate: f64) -> Self {
        self.success_rate = if success_rate.is_nan() {
            0.0
        } else {
            success_rate.clamp(0.0, 1.0)
        };
        self
    }

    /// Sets the processing delay range. A `max` at or below `min` means a fixed delay of `min`.
    pub fn with_delay(mut self, min: Duration, max: Duration) -> Self {
        self.min_delay = min;
        self.max_delay = max;
        self
    }

    /// Approves every charge with no delay.
    pub fn always_approve() -> Self {
        Self::new(1.0, Duration::ZERO, Duration::ZERO)
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

/// Payment gateway that approves charges with a configured probability
/// after a random processing delay.
#[derive(Debug, Clone)]
pub struct SimulatedPaymentService {
    simulation: PaymentSimulation,
    rng: Arc<Mutex<StdRng>>,
}

impl SimulatedPaymentService {
    pub fn new(simulation: PaymentSimulation) -> Self {
        Self {
            simulation,
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Creates a gateway whose draws are reproducible.
    pub fn with_seed(simulation: PaymentSimulation, seed: u64) -> Self {
        Self {
            simulation,
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    pub fn simulation(&self) -> &PaymentSimulation {
        &self.simulation
    }

    async fn draw(&self) -> (Duration, bool) {
        let min = self.simulation.min_delay;
        let max = self.simulation.max_delay;
        let mut rng = self.rng.lock().await;
        let delay = if max > min {
            rng.gen_range(min..max)
        } else {
            min
        };
        let approved = rng.gen_bool(self.simulation.success_rate);
        (delay, approved)
    }
}

impl Default for SimulatedPaymentService {
    fn default() -> Self {
        Self::new(PaymentSimulation::default())
    }
}

#[async_trait]
impl PaymentService for SimulatedPaymentService {
    #[tracing::instrument(skip(self, request), fields(order_id = %request.order_id, amount = %request.amount))]
    async fn process_payment(
        &self,
        request: PaymentRequest,
    ) -> Result<PaymentOutcome, ServiceError> {
        validate_amount(request.amount)?;
        let started = Instant::now();

        let (delay, approved) = self.draw().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let payment_id = uuid::Uuid::new_v4().to_string();
        let transaction_id = format!("txn_{}", chrono::Utc::now().timestamp_millis());

        let outcome = if approved {
            tracing::info!(
                %payment_id,
                %transaction_id,
                customer_id = %request.customer_id,
                currency = %request.currency,
                "payment processed"
            );
            PaymentOutcome {
                payment_id,
                transaction_id,
                status: PaymentStatus::Success,
                message: "Payment processed successfully".to_string(),
            }
        } else {
            tracing::warn!(%payment_id, "payment declined");
            PaymentOutcome {
                payment_id,
                transaction_id,
                status: PaymentStatus::Failed,
                message: "Payment declined by bank".to_string(),
            }
        };

        let status = if outcome.is_success() { "success" } else { "failed" };
        metrics::counter!("payments_processed_total", "status" => status).increment(1);
        metrics::histogram!("payment_processing_seconds").record(started.elapsed().as_secs_f64());

        Ok(outcome)
    }
}

/// How [`InMemoryPaymentService`] answers charges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentBehavior {
    #[default]
    Approve,
    Decline,
    Unavailable,
}

#[derive(Debug, Default)]
struct ScriptState {
    behavior: PaymentBehavior,
    delay: Duration,
    requests: Vec<PaymentRequest>,
}

/// Deterministic payment service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<std::sync::Mutex<ScriptState>>,
    next_id: Arc<AtomicU32>,
}

impl InMemoryPaymentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_behavior(&self, behavior: PaymentBehavior) {
        self.lock().behavior = behavior;
    }

    /// Delays every charge by `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = delay;
    }

    /// Returns every request received, in order.
    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.lock().requests.clone()
    }

    /// Returns the number of charges attempted.
    pub fn charge_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn process_payment(
        &self,
        request: PaymentRequest,
    ) -> Result<PaymentOutcome, ServiceError> {
        validate_amount(request.amount)?;

        let (behavior, delay) = {
            let mut state = self.lock();
            state.requests.push(request);
            (state.behavior, state.delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let payment_id = format!("PAY-{n:04}");
        let transaction_id = format!("TXN-{n:04}");

        match behavior {
            PaymentBehavior::Approve => Ok(PaymentOutcome {
                payment_id,
                transaction_id,
                status: PaymentStatus::Success,
                message: "Payment processed successfully".to_string(),
            }),
            PaymentBehavior::Decline => Ok(PaymentOutcome {
                payment_id,
                transaction_id,
                status: PaymentStatus::Failed,
                message: "Payment declined by bank".to_string(),
            }),
            PaymentBehavior::Unavailable => Err(ServiceError::unavailable(
                SERVICE,
                "gateway did not respond",
            )),
        }
    }
}
