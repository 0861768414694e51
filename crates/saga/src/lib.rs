//! Order creation workflow with compensating actions on failure.
//!
//! Creating an order runs these steps:
//! 1. Reserve stock for each line item, one at a time
//! 2. Charge the order total
//! 3. Store the order as `PROCESSING`
//!
//! If a step fails, the stock reserved so far is released and nothing is
//! stored. Reservations held by an abandoned request are released in the
//! background.

pub mod compensation;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod order_creation;
pub mod services;

pub use compensation::{CompensationReport, Reservation, ReservationGuard};
pub use config::OrchestratorConfig;
pub use coordinator::{CreateOrder, OrderOrchestrator};
pub use error::{SagaError, ServiceError};
pub use services::{
    InMemoryInventoryService, InMemoryPaymentService, InventoryService, PaymentBehavior,
    PaymentOutcome, PaymentRequest, PaymentService, PaymentSimulation, PaymentStatus, Product,
    ReleaseOutcome, ReservationOutcome, SimulatedPaymentService, sample_catalog,
};
