//! Order record and related types.

mod model;
mod state;
mod store;
mod value_objects;

pub use model::Order;
pub use state::{OrderStatus, ParseOrderStatusError};
pub use store::{InMemoryOrderStore, OrderStore, StatusChange};
pub use value_objects::LineItem;

use common::{Money, ProductId};
use thiserror::Error;

/// Validation errors for a new order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Customer ID is required.
    #[error("Customer ID is required")]
    CustomerIdRequired,

    /// Order has no items.
    #[error("Order has no items")]
    NoItems,

    /// A line item has an empty product ID.
    #[error("Line item {index} has no product ID")]
    ProductIdRequired { index: usize },

    /// Invalid quantity.
    #[error("Invalid quantity for {product_id}: {quantity} (must be greater than 0)")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    /// Invalid price.
    #[error("Invalid price for {product_id}: {price} (must not be negative)")]
    InvalidPrice { product_id: ProductId, price: Money },

    /// The order total does not fit in the money representation.
    #[error("Order total overflows")]
    TotalOverflow,
}
