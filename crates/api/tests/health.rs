//! Integration tests for the health check, root route and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /api/health returns 200 with status, timestamp and uptime
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = common::build_default_app();
    let response = get(app, "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "OK");
    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert!(json["uptime"].as_f64().unwrap() >= 0.0);
}

// ---------------------------------------------------------------------------
// Test: GET / returns the running message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_returns_running_message() {
    let app = common::build_default_app();
    let response = get(app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Certificate Generator API is running!");
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404 with JSON body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_default_app();
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Route not found");
}

#[tokio::test]
async fn unknown_api_route_returns_404() {
    let app = common::build_default_app();
    let response = get(app, "/api/certificates").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Route not found");
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_default_app();
    let response = get(app, "/api/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36, "x-request-id should be a UUID string");
}

#[tokio::test]
async fn incoming_request_id_is_propagated() {
    let app = common::build_default_app();
    let request = Request::builder()
        .uri("/api/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let app = common::build_default_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/generate-certificates")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:5173");
    let allow_methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(
        allow_methods.contains("POST"),
        "Allow-Methods should contain POST, got: {allow_methods}"
    );
}
