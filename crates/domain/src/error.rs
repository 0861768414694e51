//! Domain error types.

use common::OrderId;
use thiserror::Error;

use crate::order::OrderError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The order failed validation.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// No order with this ID exists in the order table.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// An order with this ID is already stored.
    #[error("Order already exists: {0}")]
    DuplicateOrder(OrderId),
}
