//! Stock lookup, reserve, and release endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::ProductId;
use saga::{InventoryService, PaymentService, ReleaseOutcome, ReservationOutcome};
use serde::{Deserialize, Serialize};

use super::{AppState, parse_order_id};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct StockRequest {
    pub quantity: u32,
    pub order_id: String,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub product_id: String,
    pub name: String,
    pub stock_quantity: u32,
    pub price_cents: i64,
}

/// GET /products/{id}: current stock for a product.
#[tracing::instrument(skip(state))]
pub async fn get<P: PaymentService + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .inventory()
        .get_product_stock(&ProductId::new(id))
        .await?;

    Ok(Json(ProductResponse {
        product_id: product.id.to_string(),
        name: product.name,
        stock_quantity: product.stock_quantity,
        price_cents: product.price.cents(),
    }))
}

/// POST /products/{id}/reserve: take stock. A decline is a `200` with `success: false`.
#[tracing::instrument(skip(state, req))]
pub async fn reserve<P: PaymentService + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
    Json(req): Json<StockRequest>,
) -> Result<Json<ReservationOutcome>, ApiError> {
    let order_id = parse_order_id(&req.order_id)?;
    let outcome = state
        .inventory()
        .reserve_stock(&ProductId::new(id), req.quantity, order_id)
        .await?;
    Ok(Json(outcome))
}

/// POST /products/{id}/release: return stock.
#[tracing::instrument(skip(state, req))]
pub async fn release<P: PaymentService + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
    Json(req): Json<StockRequest>,
) -> Result<Json<ReleaseOutcome>, ApiError> {
    let order_id = parse_order_id(&req.order_id)?;
    let outcome = state
        .inventory()
        .release_stock(&ProductId::new(id), req.quantity, order_id)
        .await?;
    Ok(Json(outcome))
}
