//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use memo_cache::{api::create_router, AppState, Config};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(AppState::from_config(&Config::default()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
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
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/caches/default/entries",
        Some(json!({"key": "test_key", "value": "test_value"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "test_key");
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_set_endpoint_rejects_empty_key() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/caches/default/entries",
        Some(json!({"key": "", "value": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_set_endpoint_rejects_long_key() {
    let app = create_test_app();
    let long_key = "k".repeat(257);

    let (status, _) = send(
        &app,
        "PUT",
        "/caches/default/entries",
        Some(json!({"key": long_key, "value": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lookup_endpoints_reject_long_key() {
    let app = create_test_app();
    let long_key = "k".repeat(300);

    let uri = format!("/caches/default/entries/{}", long_key);
    let (status, json) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("maximum length"));

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", &format!("{}/exists", uri), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_returns_structured_value() {
    let app = create_test_app();
    let product = json!({"sku": "BRK-001", "segments": ["brakes"], "image": null});

    let (status, _) = send(
        &app,
        "PUT",
        "/caches/products/entries",
        Some(json!({"key": "BRK-001", "value": product})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "GET", "/caches/products/entries/BRK-001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "BRK-001");
    assert_eq!(json["value"], product);

    let remaining = json["ttl_remaining_ms"].as_u64().unwrap();
    assert!(remaining <= 300_000 && remaining > 290_000);
}

#[tokio::test]
async fn test_get_endpoint_falsy_value_is_found() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/caches/default/entries",
        Some(json!({"key": "zero", "value": 0})),
    )
    .await;

    let (status, json) = send(&app, "GET", "/caches/default/entries/zero", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], 0);
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/caches/default/entries/nonexistent_key", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nonexistent_key"));
}

#[tokio::test]
async fn test_zero_ttl_never_reports_remaining() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/caches/default/entries",
        Some(json!({"key": "pinned", "value": 42, "ttl_ms": 0})),
    )
    .await;

    let (status, json) = send(&app, "GET", "/caches/default/entries/pinned", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["ttl_remaining_ms"].is_null());
}

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/caches/default/entries",
        Some(json!({"key": "short", "value": "v", "ttl_ms": 50})),
    )
    .await;

    let (_, json) = send(&app, "GET", "/caches/default/entries/short/exists", None).await;
    assert_eq!(json["exists"], true);

    tokio::time::sleep(Duration::from_millis(120)).await;

    let (status, _) = send(&app, "GET", "/caches/default/entries/short", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, json) = send(&app, "GET", "/caches/default/entries/short/exists", None).await;
    assert_eq!(json["exists"], false);
}

#[tokio::test]
async fn test_overwrite_replaces_value() {
    let app = create_test_app();

    for value in ["v1", "v2"] {
        send(
            &app,
            "PUT",
            "/caches/default/entries",
            Some(json!({"key": "c", "value": value})),
        )
        .await;
    }

    let (_, json) = send(&app, "GET", "/caches/default/entries/c", None).await;
    assert_eq!(json["value"], "v2");

    let (_, stats) = send(&app, "GET", "/caches/default/stats", None).await;
    assert_eq!(stats["item_count"], 1);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_is_idempotent() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/caches/orders/entries",
        Some(json!({"key": "o-1", "value": {"total": 99.5}})),
    )
    .await;

    let (status, json) = send(&app, "DELETE", "/caches/orders/entries/o-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted"], true);

    let (status, json) = send(&app, "DELETE", "/caches/orders/entries/o-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted"], false);

    let (status, _) = send(&app, "GET", "/caches/orders/entries/o-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_endpoint() {
    let app = create_test_app();

    for key in ["a", "b", "c"] {
        send(
            &app,
            "PUT",
            "/caches/users/entries",
            Some(json!({"key": key, "value": key})),
        )
        .await;
    }

    let (status, json) = send(&app, "DELETE", "/caches/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cleared"], 3);

    let (_, stats) = send(&app, "GET", "/caches/users/stats", None).await;
    assert_eq!(stats["item_count"], 0);
    assert_eq!(stats["keys"], json!([]));
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/caches/default/entries",
        Some(json!({"key": "stats_key", "value": "stats_value"})),
    )
    .await;
    send(&app, "GET", "/caches/default/entries/stats_key", None).await; // hit
    send(&app, "GET", "/caches/default/entries/missing", None).await; // miss

    let (status, json) = send(&app, "GET", "/caches/default/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cache"], "default");
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["item_count"], 1);
    assert_eq!(json["keys"], json!(["stats_key"]));
    assert!(json["approx_bytes"].as_u64().unwrap() > 0);
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_caches_are_isolated() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/caches/products/entries",
        Some(json!({"key": "shared", "value": 1})),
    )
    .await;

    let (status, _) = send(&app, "GET", "/caches/orders/entries/shared", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_cache() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/caches/carts/stats", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("carts"));
}

// == Listing and Health ==

#[tokio::test]
async fn test_list_caches() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/caches", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["caches"], json!(["default", "orders", "products", "users"]));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}
