//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
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

fn setup() -> Router {
    let (state, _publisher) = api::create_default_state();
    api::create_app(state, get_metrics_handle())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

async fn add_product(app: &Router, sku: &str, stock: u32, threshold: u32) -> Value {
    let (status, product) = send_json(
        app,
        "POST",
        "/products",
        json!({
            "sku": sku,
            "name": format!("Product {sku}"),
            "price": 450,
            "stock": stock,
            "low_stock_threshold": threshold
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    product
}

fn order_body(product_id: &Value, quantity: u32) -> Value {
    json!({
        "customer": { "name": "Ada", "email": "ada@example.com" },
        "shipping_address": {
            "street": "1 Main St",
            "city": "Lagos",
            "state": "LA",
            "zip": "100001",
            "country": "NG"
        },
        "items": [{ "product_id": product_id, "quantity": quantity }],
        "shipping": 200
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_product_and_list() {
    let app = setup();
    add_product(&app, "RICE-5KG", 80, 15).await;

    let (status, products) = get(&app, "/products").await;
    assert_eq!(status, StatusCode::OK);
    let products = products.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["sku"], "RICE-5KG");
    assert_eq!(products[0]["stock"], 80);
}

#[tokio::test]
async fn test_duplicate_sku_conflicts() {
    let app = setup();
    add_product(&app, "RICE-5KG", 80, 15).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/products",
        json!({
            "sku": "RICE-5KG",
            "name": "Another rice",
            "price": 500,
            "stock": 10,
            "low_stock_threshold": 2
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("RICE-5KG"));
}

#[tokio::test]
async fn test_negative_stock_is_rejected_at_the_boundary() {
    let app = setup();

    let (status, _) = send_json(
        &app,
        "POST",
        "/products",
        json!({
            "sku": "RICE-5KG",
            "name": "Rice",
            "price": 450,
            "stock": -5,
            "low_stock_threshold": 2
        }),
    )
    .await;
    // u32 deserialization fails before any handler logic runs.
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_order_decrements_stock() {
    let app = setup();
    let product = add_product(&app, "RICE-5KG", 80, 15).await;

    let (status, order) = send_json(&app, "POST", "/orders", order_body(&product["id"], 70)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["subtotal"], 70 * 450);
    assert_eq!(order["total"], 70 * 450 + 200);
    assert!(order["number"].as_str().unwrap().starts_with("ORD-"));

    let (_, products) = get(&app, "/products").await;
    assert_eq!(products[0]["stock"], 10);

    // 80 -> 10 crossed the threshold of 15.
    let (status, alerts) = get(&app, "/products/alerts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alerts.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_insufficient_stock_conflicts() {
    let app = setup();
    let product = add_product(&app, "RICE-5KG", 5, 2).await;

    let (status, body) = send_json(&app, "POST", "/orders", order_body(&product["id"], 10)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Insufficient"));

    // Nothing was reserved.
    let (_, products) = get(&app, "/products").await;
    assert_eq!(products[0]["stock"], 5);
}

#[tokio::test]
async fn test_order_for_unknown_product_is_not_found() {
    let app = setup();
    let fake_id = json!(uuid::Uuid::new_v4());

    let (status, _) = send_json(&app, "POST", "/orders", order_body(&fake_id, 1)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_order_is_bad_request() {
    let app = setup();

    let (status, body) = send_json(
        &app,
        "POST",
        "/orders",
        json!({
            "customer": { "name": "Ada", "email": "ada@example.com" },
            "shipping_address": {
                "street": "1 Main St", "city": "Lagos", "state": "LA",
                "zip": "100001", "country": "NG"
            },
            "items": []
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("at least one item"));
}

#[tokio::test]
async fn test_get_order_roundtrip_and_missing_cases() {
    let app = setup();
    let product = add_product(&app, "RICE-5KG", 80, 15).await;
    let (_, order) = send_json(&app, "POST", "/orders", order_body(&product["id"], 2)).await;
    let id = order["id"].as_str().unwrap();

    let (status, fetched) = get(&app, &format!("/orders/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], order["id"]);
    assert_eq!(fetched["items"][0]["sku"], "RICE-5KG");

    let (status, _) = get(&app, &format!("/orders/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/orders/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_update_flow() {
    let app = setup();
    let product = add_product(&app, "RICE-5KG", 80, 15).await;
    let (_, order) = send_json(&app, "POST", "/orders", order_body(&product["id"], 2)).await;
    let id = order["id"].as_str().unwrap();

    let (status, shipped) = send_json(
        &app,
        "POST",
        &format!("/orders/{id}/status"),
        json!({ "status": "shipped" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shipped["status"], "shipped");
    assert!(shipped["tracking_number"].as_str().unwrap().starts_with("TRK"));

    // Moving backwards is a conflict.
    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/orders/{id}/status"),
        json!({ "status": "pending" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Invalid status transition"));

    // Unknown status values never reach the handler.
    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/orders/{id}/status"),
        json!({ "status": "teleported" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_fulfillment_update() {
    let app = setup();
    let product = add_product(&app, "RICE-5KG", 80, 15).await;
    let (_, order) = send_json(&app, "POST", "/orders", order_body(&product["id"], 2)).await;
    let id = order["id"].as_str().unwrap();

    let (status, updated) = send_json(
        &app,
        "POST",
        &format!("/orders/{id}/fulfillment"),
        json!({ "status": "picking", "assigned_to": "kofi" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["fulfillment_status"], "picking");
    assert_eq!(updated["assigned_to"], "kofi");
    assert!(updated["picking_started"].as_str().is_some());
}

#[tokio::test]
async fn test_list_orders_filtered_by_status() {
    let app = setup();
    let product = add_product(&app, "RICE-5KG", 100, 5).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let (_, order) = send_json(&app, "POST", "/orders", order_body(&product["id"], 1)).await;
        ids.push(order["id"].as_str().unwrap().to_string());
    }
    send_json(
        &app,
        "POST",
        &format!("/orders/{}/status", ids[0]),
        json!({ "status": "shipped" }),
    )
    .await;

    let (_, all) = get(&app, "/orders").await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, pending) = get(&app, "/orders?status=pending").await;
    assert_eq!(pending.as_array().unwrap().len(), 2);

    let (_, shipped) = get(&app, "/orders?status=shipped").await;
    assert_eq!(shipped.as_array().unwrap().len(), 1);
    assert_eq!(shipped[0]["id"].as_str().unwrap(), ids[0]);

    let (status, recent) = get(&app, "/orders/recent").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recent.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_product_filters() {
    let app = setup();
    add_product(&app, "RICE-5KG", 80, 15).await;
    add_product(&app, "SALT-1KG", 3, 10).await;

    let (_, low) = get(&app, "/products?filter=low_stock").await;
    let low = low.as_array().unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0]["sku"], "SALT-1KG");

    let (_, active) = get(&app, "/products?filter=active").await;
    assert_eq!(active.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_bulk_stock_update_skips_unknown_products() {
    let app = setup();
    let product = add_product(&app, "RICE-5KG", 80, 15).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/products/stock",
        json!({
            "updates": [
                { "product_id": product["id"], "stock": 7 },
                { "product_id": uuid::Uuid::new_v4(), "stock": 99 }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);
    assert_eq!(body["products"][0]["stock"], 7);
}
