//! HTTP route handlers.

pub mod health;
pub mod metrics;
pub mod orders;
pub mod payments;
pub mod products;

use common::OrderId;
use domain::InMemoryOrderStore;
use saga::{InMemoryInventoryService, OrderOrchestrator, PaymentService};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<P: PaymentService> {
    pub orchestrator: OrderOrchestrator<InMemoryOrderStore, InMemoryInventoryService, P>,
}

impl<P: PaymentService> AppState<P> {
    pub fn inventory(&self) -> &InMemoryInventoryService {
        self.orchestrator.inventory()
    }

    pub fn payment(&self) -> &P {
        self.orchestrator.payment()
    }
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse::<OrderId>()
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
