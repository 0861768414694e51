//! Shared types for the order processing services.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{CustomerId, OrderId, ParseOrderIdError, ProductId};
