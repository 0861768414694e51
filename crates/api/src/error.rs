//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use saga::{SagaError, ServiceError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Order workflow error.
    Saga(SagaError),
    /// Inventory or payment error.
    Service(ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Saga(err) => (saga_status(&err), err.to_string()),
            ApiError::Service(err) => (service_status(&err), err.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn saga_status(err: &SagaError) -> StatusCode {
    match err {
        SagaError::InvalidOrder(_) => StatusCode::BAD_REQUEST,
        SagaError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        SagaError::ReservationDeclined { .. } => StatusCode::CONFLICT,
        SagaError::PaymentDeclined { .. } => StatusCode::PAYMENT_REQUIRED,
        SagaError::InventoryUnavailable { .. } | SagaError::PaymentUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        SagaError::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
        SagaError::Domain(DomainError::DuplicateOrder(_)) => StatusCode::CONFLICT,
        SagaError::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        ServiceError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}
