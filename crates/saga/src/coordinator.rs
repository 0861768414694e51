//! Order orchestrator: reserve stock, charge, persist, compensate on failure.

use std::time::Duration;

use common::{CustomerId, OrderId};
use domain::{LineItem, Order, OrderStatus, OrderStore};
use tokio::time::Instant;

use crate::compensation::ReservationGuard;
use crate::config::OrchestratorConfig;
use crate::error::SagaError;
use crate::order_creation::{STEP_PROCESS_PAYMENT, STEP_RESERVE_STOCK, STEP_STORE_ORDER};
use crate::services::inventory::InventoryService;
use crate::services::payment::{PaymentRequest, PaymentService};

/// Request to create an order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub customer_id: CustomerId,
    pub items: Vec<LineItem>,
    /// Deadline for the whole workflow. Falls back to
    /// [`OrchestratorConfig::call_timeout`] when absent.
    pub timeout: Option<Duration>,
}

impl CreateOrder {
    pub fn new(customer_id: impl Into<CustomerId>, items: Vec<LineItem>) -> Self {
        Self {
            customer_id: customer_id.into(),
            items,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Drives order creation across the inventory and payment collaborators.
///
/// An order is only stored once every line item is reserved and the total
/// is charged. Any failure before that point releases the reservations
/// already made and returns the failure to the caller.
pub struct OrderOrchestrator<St, I, P>
where
    St: OrderStore,
    I: InventoryService + Clone + 'static,
    P: PaymentService,
{
    store: St,
    inventory: I,
    payment: P,
    config: OrchestratorConfig,
}

impl<St, I, P> OrderOrchestrator<St, I, P>
where
    St: OrderStore,
    I: InventoryService + Clone + 'static,
    P: PaymentService,
{
    /// Creates an orchestrator with default settings.
    pub fn new(store: St, inventory: I, payment: P) -> Self {
        Self::with_config(store, inventory, payment, OrchestratorConfig::default())
    }

    pub fn with_config(store: St, inventory: I, payment: P, config: OrchestratorConfig) -> Self {
        Self {
            store,
            inventory,
            payment,
            config,
        }
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    pub fn payment(&self) -> &P {
        &self.payment
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Creates an order.
    ///
    /// Validates the request, reserves each line item in order, charges the
    /// total once and stores the order as `PROCESSING`. Nothing is stored
    /// on failure.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id, items = cmd.items.len()))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<Order, SagaError> {
        let started = std::time::Instant::now();
        let deadline = Instant::now() + cmd.timeout.unwrap_or(self.config.call_timeout);

        let result = match Order::new(cmd.customer_id, cmd.items) {
            Ok(order) => self.run(order, deadline).await,
            Err(err) => {
                tracing::warn!(error = %err, "order rejected");
                Err(err.into())
            }
        };

        let status = if result.is_ok() { "success" } else { "failed" };
        metrics::counter!("orders_created_total", "status" => status).increment(1);
        metrics::histogram!("order_creation_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        result
    }

    async fn run(&self, mut order: Order, deadline: Instant) -> Result<Order, SagaError> {
        let order_id = order.id();
        let mut guard = ReservationGuard::new(
            self.inventory.clone(),
            order_id,
            self.config.compensation_timeout,
        );

        tracing::info!(%order_id, total = %order.total_amount(), "order creation started");

        for item in order.items() {
            let product_id = &item.product_id;
            let reserved = tokio::time::timeout_at(
                deadline,
                self.inventory
                    .reserve_stock(product_id, item.quantity, order_id),
            )
            .await;

            let error = match reserved {
                Ok(Ok(outcome)) if outcome.success => {
                    guard.record(product_id.clone(), item.quantity);
                    continue;
                }
                Ok(Ok(outcome)) => SagaError::ReservationDeclined {
                    product_id: product_id.clone(),
                    reason: outcome.message,
                },
                Ok(Err(source)) => SagaError::InventoryUnavailable {
                    product_id: product_id.clone(),
                    source,
                },
                Err(_) => SagaError::DeadlineExceeded {
                    step: STEP_RESERVE_STOCK,
                },
            };
            tracing::warn!(%order_id, %product_id, error = %error, "stock reservation failed");
            self.compensate(&mut guard, order_id, STEP_RESERVE_STOCK).await;
            return Err(error);
        }

        let request = PaymentRequest {
            order_id,
            customer_id: order.customer_id().clone(),
            amount: order.total_amount(),
            currency: self.config.currency.clone(),
            payment_method: self.config.payment_method.clone(),
        };
        let charged = tokio::time::timeout_at(deadline, self.payment.process_payment(request)).await;

        let error = match charged {
            Ok(Ok(outcome)) if outcome.is_success() => {
                tracing::info!(
                    %order_id,
                    payment_id = %outcome.payment_id,
                    transaction_id = %outcome.transaction_id,
                    "payment accepted"
                );
                None
            }
            Ok(Ok(outcome)) => Some(SagaError::PaymentDeclined {
                reason: outcome.message,
            }),
            Ok(Err(source)) => Some(SagaError::PaymentUnavailable(source)),
            Err(_) => Some(SagaError::DeadlineExceeded {
                step: STEP_PROCESS_PAYMENT,
            }),
        };
        if let Some(error) = error {
            tracing::warn!(%order_id, error = %error, "payment failed");
            self.compensate(&mut guard, order_id, STEP_PROCESS_PAYMENT).await;
            return Err(error);
        }

        order.set_status(OrderStatus::Processing);
        if let Err(err) = self.store.insert(order.clone()).await {
            tracing::error!(
                %order_id,
                error = %err,
                "failed to store order after payment was accepted"
            );
            self.compensate(&mut guard, order_id, STEP_STORE_ORDER).await;
            return Err(err.into());
        }
        guard.commit();

        tracing::info!(%order_id, status = %order.status(), "order created");
        Ok(order)
    }

    async fn compensate(
        &self,
        guard: &mut ReservationGuard<I>,
        order_id: OrderId,
        step: &'static str,
    ) {
        if guard.is_empty() {
            return;
        }
        metrics::counter!("order_compensations_total", "step" => step).increment(1);

        tracing::info!(%order_id, step, reservations = guard.len(), "compensating");
        let report = guard.compensate().await;
        if !report.is_complete() {
            tracing::error!(
                %order_id,
                step,
                failed = ?report.failed,
                "compensation incomplete"
            );
        }
    }

    /// Returns a stored order.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, SagaError> {
        self.store
            .get(order_id)
            .await?
            .ok_or(SagaError::OrderNotFound(order_id))
    }

    /// Overwrites the status of a stored order. Any transition is accepted.
    #[tracing::instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, SagaError> {
        let change = self.store.update_status(order_id, status).await?;
        tracing::info!(
            %order_id,
            previous = %change.previous,
            current = %change.order.status(),
            "order status updated"
        );
        Ok(change.order)
    }
}
