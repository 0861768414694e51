//! HTTP API server with observability for the order processing services.
//!
//! Exposes order creation and lookup, stock management, and payment
//! endpoints, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use domain::InMemoryOrderStore;
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{
    InMemoryInventoryService, OrchestratorConfig, OrderOrchestrator, PaymentService,
    SimulatedPaymentService,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
pub use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<P: PaymentService + 'static>(
    state: Arc<AppState<P>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<P>))
        .route("/orders/{id}", get(routes::orders::get::<P>))
        .route("/orders/{id}/status", put(routes::orders::update_status::<P>))
        .route("/products/{id}", get(routes::products::get::<P>))
        .route("/products/{id}/reserve", post(routes::products::reserve::<P>))
        .route("/products/{id}/release", post(routes::products::release::<P>))
        .route("/payments", post(routes::payments::process::<P>))
        .with_state(state)
        .merge(metrics_router)
        .route_layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state around the given ledger and payment service.
pub fn create_state<P: PaymentService>(
    inventory: InMemoryInventoryService,
    payment: P,
    config: OrchestratorConfig,
) -> Arc<AppState<P>> {
    let orchestrator =
        OrderOrchestrator::with_config(InMemoryOrderStore::new(), inventory, payment, config);
    Arc::new(AppState { orchestrator })
}

/// Creates the default application state: the sample catalog and the
/// simulated payment gateway.
pub fn create_default_state(config: &Config) -> Arc<AppState<SimulatedPaymentService>> {
    create_state(
        InMemoryInventoryService::with_sample_catalog(),
        SimulatedPaymentService::new(config.payment_simulation()),
        config.orchestrator_config(),
    )
}
