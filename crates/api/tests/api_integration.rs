//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{
    InMemoryInventoryService, InMemoryPaymentService, OrchestratorConfig, PaymentBehavior,
};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup_with_state() -> (
    axum::Router,
    Arc<api::AppState<InMemoryPaymentService>>,
) {
    let state = api::create_state(
        InMemoryInventoryService::with_sample_catalog(),
        InMemoryPaymentService::new(),
        OrchestratorConfig::default(),
    );
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

fn setup() -> axum::Router {
    setup_with_state().0
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn laptop_order() -> serde_json::Value {
    serde_json::json!({
        "customer_id": "customer-1",
        "items": [{
            "product_id": "product-1",
            "quantity": 2,
            "unit_price_cents": 99999
        }]
    })
}

async fn stock_of(app: &axum::Router, product: &str) -> u64 {
    let response = app
        .clone()
        .oneshot(get_request(&format!("/products/{product}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["stock_quantity"].as_u64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_create_and_get_order() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/orders", laptop_order()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["status"], "PROCESSING");
    assert_eq!(created["total_amount"], "1999.98");
    assert_eq!(created["total_cents"], 199998);
    assert_eq!(created["customer_id"], "customer-1");

    let id = created["id"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(get_request(&format!("/orders/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched, created);

    assert_eq!(stock_of(&app, "product-1").await, 48);
}

#[tokio::test]
async fn test_declined_payment_returns_402_and_restores_stock() {
    let (app, state) = setup_with_state();
    state.payment().set_behavior(PaymentBehavior::Decline);

    let body = serde_json::json!({
        "customer_id": "customer-1",
        "items": [
            {"product_id": "product-1", "quantity": 2, "unit_price_cents": 99999},
            {"product_id": "product-2", "quantity": 1, "unit_price_cents": 2999}
        ]
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/orders", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("declined"));
    assert_eq!(stock_of(&app, "product-1").await, 50);
    assert_eq!(stock_of(&app, "product-2").await, 100);
    assert_eq!(state.orchestrator.store().order_count().await, 0);
}

#[tokio::test]
async fn test_payment_unavailable_returns_503() {
    let (app, state) = setup_with_state();
    state.payment().set_behavior(PaymentBehavior::Unavailable);

    let response = app
        .oneshot(json_request("POST", "/orders", laptop_order()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_insufficient_stock_returns_409() {
    let app = setup();
    let body = serde_json::json!({
        "customer_id": "customer-1",
        "items": [{"product_id": "product-1", "quantity": 51, "unit_price_cents": 99999}]
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/orders", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("Available: 50"));
    assert!(message.contains("Requested: 51"));
    assert_eq!(stock_of(&app, "product-1").await, 50);
}

#[tokio::test]
async fn test_invalid_order_returns_400() {
    let app = setup();

    let empty_items = serde_json::json!({"customer_id": "customer-1", "items": []});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/orders", empty_items))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let no_customer = serde_json::json!({
        "items": [{"product_id": "product-1", "quantity": 1, "unit_price_cents": 99999}]
    });
    let response = app
        .oneshot(json_request("POST", "/orders", no_customer))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_deadline_returns_504() {
    let (app, state) = setup_with_state();
    state
        .payment()
        .set_delay(std::time::Duration::from_millis(500));

    let mut body = laptop_order();
    body["timeout_ms"] = serde_json::json!(50);
    let response = app
        .clone()
        .oneshot(json_request("POST", "/orders", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(stock_of(&app, "product-1").await, 50);
}

#[tokio::test]
async fn test_get_order_not_found() {
    let app = setup();
    let fake_id = "00000000-0000-0000-0000-000000000001";

    let response = app
        .oneshot(get_request(&format!("/orders/{fake_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_order_invalid_id() {
    let app = setup();

    let response = app.oneshot(get_request("/orders/not-a-uuid")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_status_any_transition() {
    let app = setup();
    let response = app
        .clone()
        .oneshot(json_request("POST", "/orders", laptop_order()))
        .await
        .unwrap();
    let id = body_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    for status in ["COMPLETED", "pending", "Cancelled"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/orders/{id}/status"),
                serde_json::json!({"status": status}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], status.to_ascii_uppercase());
    }
}

#[tokio::test]
async fn test_update_status_errors() {
    let app = setup();
    let fake_id = "00000000-0000-0000-0000-000000000001";

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/orders/{fake_id}/status"),
            serde_json::json!({"status": "COMPLETED"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/orders/{fake_id}/status"),
            serde_json::json!({"status": "SHIPPED"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_stock_endpoints() {
    let app = setup();
    let order_id = "00000000-0000-0000-0000-0000000000aa";

    let response = app
        .clone()
        .oneshot(get_request("/products/product-2"))
        .await
        .unwrap();
    let product = body_json(response).await;
    assert_eq!(product["name"], "Mouse");
    assert_eq!(product["price_cents"], 2999);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products/product-2/reserve",
            serde_json::json!({"quantity": 10, "order_id": order_id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let reserved = body_json(response).await;
    assert_eq!(reserved["success"], true);
    assert_eq!(reserved["reserved_quantity"], 10);
    assert_eq!(stock_of(&app, "product-2").await, 90);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products/product-2/reserve",
            serde_json::json!({"quantity": 1000, "order_id": order_id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], false);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products/product-2/release",
            serde_json::json!({"quantity": 10, "order_id": order_id}),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["success"], true);
    assert_eq!(stock_of(&app, "product-2").await, 100);
}

#[tokio::test]
async fn test_unknown_product_returns_404() {
    let app = setup();

    let response = app.oneshot(get_request("/products/nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Product not found: nope");
}

#[tokio::test]
async fn test_zero_quantity_reserve_returns_400() {
    let app = setup();

    let response = app
        .oneshot(json_request(
            "POST",
            "/products/product-1/reserve",
            serde_json::json!({"quantity": 0, "order_id": "00000000-0000-0000-0000-0000000000aa"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_process_payment_endpoint() {
    let (app, state) = setup_with_state();
    let body = serde_json::json!({
        "order_id": "00000000-0000-0000-0000-0000000000bb",
        "customer_id": "customer-9",
        "amount_cents": 4500
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/payments", body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "SUCCESS");
    assert_eq!(json["message"], "Payment processed successfully");

    let request = &state.payment().requests()[0];
    assert_eq!(request.currency, "USD");
    assert_eq!(request.payment_method, "credit_card");

    state.payment().set_behavior(PaymentBehavior::Decline);
    let response = app
        .oneshot(json_request("POST", "/payments", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "FAILED");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    app.clone()
        .oneshot(json_request("POST", "/orders", laptop_order()))
        .await
        .unwrap();

    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("orders_created_total"));
    assert!(text.contains(r#"http_requests_total{method="POST",path="/orders",status="201"}"#));
    assert!(text.contains("http_request_duration_seconds"));
    assert!(text.contains(r#"path="/orders""#));
    assert!(text.contains("http_requests_in_flight"));
}
