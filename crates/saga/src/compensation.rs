//! Tracking and release of stock reserved by an in-flight order.

use std::time::Duration;

use common::{OrderId, ProductId};

use crate::services::inventory::InventoryService;

/// Stock taken from the ledger for one line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// What a compensation pass managed to undo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompensationReport {
    pub released: usize,
    /// Products whose release failed or timed out. Their stock stays reduced.
    pub failed: Vec<ProductId>,
}

impl CompensationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Holds the reservations an order has committed so far.
///
/// If the guard is dropped while it still holds reservations (the caller's
/// future was cancelled, or a step panicked), the releases are spawned onto
/// the current runtime. Each reservation is removed before its release is
/// issued, so a reservation is released at most once.
pub struct ReservationGuard<I>
where
    I: InventoryService + Clone + 'static,
{
    inventory: I,
    order_id: OrderId,
    reserved: Vec<Reservation>,
    release_timeout: Duration,
}

impl<I> ReservationGuard<I>
where
    I: InventoryService + Clone + 'static,
{
    pub fn new(inventory: I, order_id: OrderId, release_timeout: Duration) -> Self {
        Self {
            inventory,
            order_id,
            reserved: Vec::new(),
            release_timeout,
        }
    }

    /// Records a reservation that the ledger confirmed.
    pub fn record(&mut self, product_id: ProductId, quantity: u32) {
        self.reserved.push(Reservation {
            product_id,
            quantity,
        });
    }

    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }

    /// Releases every held reservation, most recent first.
    ///
    /// Release failures are logged and counted, never returned.
    pub async fn compensate(&mut self) -> CompensationReport {
        let mut report = CompensationReport::default();
        while let Some(reservation) = self.reserved.pop() {
            if release_one(
                &self.inventory,
                self.order_id,
                &reservation,
                self.release_timeout,
            )
            .await
            {
                report.released += 1;
            } else {
                report.failed.push(reservation.product_id);
            }
        }
        report
    }

    /// Keeps the reservations. The stock now belongs to the stored order.
    pub fn commit(mut self) {
        self.reserved.clear();
    }
}

impl<I> Drop for ReservationGuard<I>
where
    I: InventoryService + Clone + 'static,
{
    fn drop(&mut self) {
        if self.reserved.is_empty() {
            return;
        }

        let reserved = std::mem::take(&mut self.reserved);
        let order_id = self.order_id;

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::error!(
                %order_id,
                reservations = reserved.len(),
                "no runtime available to release abandoned reservations"
            );
            metrics::counter!("compensation_failures_total").increment(reserved.len() as u64);
            return;
        };

        tracing::warn!(
            %order_id,
            reservations = reserved.len(),
            "order abandoned, releasing reservations in background"
        );
        let inventory = self.inventory.clone();
        let timeout = self.release_timeout;
        handle.spawn(async move {
            for reservation in reserved.iter().rev() {
                release_one(&inventory, order_id, reservation, timeout).await;
            }
        });
    }
}

async fn release_one<I>(
    inventory: &I,
    order_id: OrderId,
    reservation: &Reservation,
    timeout: Duration,
) -> bool
where
    I: InventoryService,
{
    let product_id = &reservation.product_id;
    let result = tokio::time::timeout(
        timeout,
        inventory.release_stock(product_id, reservation.quantity, order_id),
    )
    .await;

    let failure = match result {
        Ok(Ok(outcome)) if outcome.success => {
            tracing::info!(
                %order_id,
                %product_id,
                quantity = reservation.quantity,
                "reservation released"
            );
            return true;
        }
        Ok(Ok(outcome)) => outcome.message,
        Ok(Err(err)) => err.to_string(),
        Err(_) => format!("release timed out after {}ms", timeout.as_millis()),
    };

    metrics::counter!("compensation_failures_total").increment(1);
    tracing::error!(
        %order_id,
        %product_id,
        quantity = reservation.quantity,
        error = %failure,
        "failed to release reservation, stock remains reduced"
    );
    false
}
