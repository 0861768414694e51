//! Domain layer for the order processing services.
//!
//! This crate provides:
//! - the `Order` record with its line items and derived total
//! - the `OrderStatus` lifecycle enum
//! - input validation for new orders
//! - the `OrderStore` trait and its in-memory order table

pub mod error;
pub mod order;

pub use error::DomainError;
pub use order::{
    InMemoryOrderStore, LineItem, Order, OrderError, OrderStatus, OrderStore,
    ParseOrderStatusError, StatusChange,
};
