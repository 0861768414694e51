//! Order table: trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use tokio::sync::RwLock;

use super::{Order, OrderStatus};
use crate::error::DomainError;

/// Storage for created orders.
///
/// Orders are only ever inserted whole and never removed.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Stores a new order. Fails if the ID is already taken.
    async fn insert(&self, order: Order) -> Result<(), DomainError>;

    /// Returns a snapshot of the order, if it exists.
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>, DomainError>;

    /// Overwrites the status of an existing order.
    ///
    /// The previous status and the updated snapshot are read under the same
    /// write, so concurrent updates each see the status they replaced.
    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<StatusChange, DomainError>;
}

/// Result of a status overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub previous: OrderStatus,
    pub order: Order,
}

/// In-memory order table.
///
/// The outer lock only guards the key set; each order sits behind its own
/// lock so writes to one order never block reads of another.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Arc<RwLock<Order>>>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    async fn entry(&self, order_id: OrderId) -> Option<Arc<RwLock<Order>>> {
        self.orders.read().await.get(&order_id).cloned()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<(), DomainError> {
        let order_id = order.id();
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order_id) {
            return Err(DomainError::DuplicateOrder(order_id));
        }
        orders.insert(order_id, Arc::new(RwLock::new(order)));
        tracing::debug!(%order_id, "order stored");
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>, DomainError> {
        match self.entry(order_id).await {
            Some(entry) => Ok(Some(entry.read().await.clone())),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<StatusChange, DomainError> {
        let entry = self
            .entry(order_id)
            .await
            .ok_or(DomainError::OrderNotFound(order_id))?;

        let mut order = entry.write().await;
        let previous = order.status();
        order.set_status(status);
        Ok(StatusChange {
            previous,
            order: order.clone(),
        })
    }
}
