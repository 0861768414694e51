//! Direct payment endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use common::{CustomerId, Money};
use saga::{PaymentOutcome, PaymentRequest, PaymentService};
use serde::Deserialize;

use super::{AppState, parse_order_id};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ProcessPaymentRequest {
    pub order_id: String,
    pub customer_id: String,
    pub amount_cents: i64,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
}

/// POST /payments: charge an amount. A decline is a `200` with status `FAILED`.
#[tracing::instrument(skip(state, req))]
pub async fn process<P: PaymentService + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<ProcessPaymentRequest>,
) -> Result<Json<PaymentOutcome>, ApiError> {
    let order_id = parse_order_id(&req.order_id)?;
    let config = state.orchestrator.config();

    let request = PaymentRequest {
        order_id,
        customer_id: CustomerId::new(req.customer_id),
        amount: Money::from_cents(req.amount_cents),
        currency: req.currency.unwrap_or_else(|| config.currency.clone()),
        payment_method: req
            .payment_method
            .unwrap_or_else(|| config.payment_method.clone()),
    };

    let outcome = state.payment().process_payment(request).await?;
    Ok(Json(outcome))
}
