//! Saga error types.

use common::{OrderId, ProductId};
use domain::{DomainError, OrderError};
use thiserror::Error;

/// Errors returned by the inventory and payment collaborators.
///
/// Declined reservations and declined payments are not errors; they are
/// reported through the outcome types.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// The collaborator could not be reached or failed to answer.
    #[error("{service} service unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },

    /// The request violated a precondition.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Stock lookup for an unknown product.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),
}

impl ServiceError {
    pub(crate) fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        ServiceError::Unavailable {
            service,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while creating or managing orders.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The order request failed validation.
    #[error("Invalid order: {0}")]
    InvalidOrder(#[from] OrderError),

    /// The inventory declined a reservation (unknown product or not enough stock).
    #[error("Stock reservation declined for product {product_id}: {reason}")]
    ReservationDeclined { product_id: ProductId, reason: String },

    /// The inventory call for a line item failed.
    #[error("Failed to reserve stock for product {product_id}: {source}")]
    InventoryUnavailable {
        product_id: ProductId,
        #[source]
        source: ServiceError,
    },

    /// The payment gateway declined the charge.
    #[error("Payment failed: {reason}")]
    PaymentDeclined { reason: String },

    /// The payment call failed.
    #[error("Payment processing failed: {0}")]
    PaymentUnavailable(#[source] ServiceError),

    /// The request deadline passed while a step was in flight.
    #[error("Deadline exceeded during step '{step}'")]
    DeadlineExceeded { step: &'static str },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Order table error.
    #[error("Domain error: {0}")]
    Domain(DomainError),
}

impl From<DomainError> for SagaError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::OrderNotFound(order_id) => SagaError::OrderNotFound(order_id),
            DomainError::Order(order_err) => SagaError::InvalidOrder(order_err),
            other => SagaError::Domain(other),
        }
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
