//! Order creation, lookup, and status endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::Money;
use domain::{LineItem, Order, OrderStatus};
use saga::{CreateOrder, PaymentService};
use serde::{Deserialize, Serialize};

use super::{AppState, parse_order_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer_id: String,
    pub items: Vec<OrderItemRequest>,
    /// Overrides the configured order deadline.
    pub timeout_ms: Option<u64>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    #[serde(default)]
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItemResponse>,
    pub total_cents: i64,
    pub total_amount: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            customer_id: order.customer_id().to_string(),
            status: order.status(),
            items: order
                .items()
                .iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id.to_string(),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price.cents(),
                })
                .collect(),
            total_cents: order.total_amount().cents(),
            total_amount: order.total_amount().to_decimal_string(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

// -- Handlers --

/// POST /orders: reserve stock, charge, and store a new order.
#[tracing::instrument(skip(state, req))]
pub async fn create<P: PaymentService + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let items = req
        .items
        .into_iter()
        .map(|item| {
            LineItem::new(
                item.product_id,
                item.quantity,
                Money::from_cents(item.unit_price_cents),
            )
        })
        .collect();

    let mut cmd = CreateOrder::new(req.customer_id, items);
    if let Some(ms) = req.timeout_ms {
        cmd = cmd.with_timeout(Duration::from_millis(ms));
    }

    let order = state.orchestrator.create_order(cmd).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// GET /orders/{id}: load a stored order.
#[tracing::instrument(skip(state))]
pub async fn get<P: PaymentService + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orchestrator.get_order(order_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /orders/{id}/status: overwrite an order's status.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<P: PaymentService + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let status = req
        .status
        .parse::<OrderStatus>()
        .map_err(|e| ApiError::BadRequest(format!("{e}")))?;

    let order = state
        .orchestrator
        .update_order_status(order_id, status)
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}
