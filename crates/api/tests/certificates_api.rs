//! Integration tests for `POST /api/generate-certificates`.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use certgen_api::config::{worst_case_batch, ServerConfig};
use certgen_core::design::CATEGORY_REQUIRED_MSG;
use certgen_core::fallback::fallback_script;
use certgen_core::style::Style;
use certgen_gemini::GeminiConfig;
use common::{body_json, post_json, post_raw, FakeGenerator, Reply, GOOD_CODE};
use serde_json::json;
use tokio::time::Instant;
use tower::ServiceExt;

const ENDPOINT: &str = "/api/generate-certificates";

// ---------------------------------------------------------------------------
// Test: a valid category yields five cleaned designs in style order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generates_five_designs_in_order() {
    let text = FakeGenerator::new(Reply::Fenced);
    let app = common::build_test_app(text.clone());

    let response = post_json(app, ENDPOINT, json!({ "category": "Machine Learning" })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Successfully generated 5 certificate designs");

    let designs = json["data"].as_array().unwrap();
    assert_eq!(designs.len(), 5);
    for (design, style) in designs.iter().zip(Style::ALL) {
        assert_eq!(design["id"], style.id());
        assert_eq!(design["name"], format!("{} Design", style.label()));
        assert_eq!(design["style"], style.label());
        assert_eq!(design["code"], GOOD_CODE);
    }
    assert_eq!(text.calls(), 5);
}

#[tokio::test]
async fn prompts_use_trimmed_category() {
    let text = FakeGenerator::new(Reply::Fenced);
    let app = common::build_test_app(text.clone());

    let response = post_json(app, ENDPOINT, json!({ "category": "  Chess  " })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let prompts = text.prompts();
    assert_eq!(prompts.len(), 5);
    assert!(prompts.iter().all(|p| p.contains("\"Chess\"")));
}

// ---------------------------------------------------------------------------
// Test: upstream failures degrade to fallback templates, never to errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upstream_outage_returns_fallback_designs() {
    let app = common::build_test_app(FakeGenerator::new(Reply::Fail));

    let response = post_json(app, ENDPOINT, json!({ "category": "Machine Learning" })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let designs = json["data"].as_array().unwrap();
    assert_eq!(designs.len(), 5);
    for (design, style) in designs.iter().zip(Style::ALL) {
        let code = design["code"].as_str().unwrap();
        assert_eq!(code, fallback_script(style, "Machine Learning"));
        assert!(code.contains("Machine Learning"));
        assert!(!code.contains("```"));
    }
}

#[tokio::test]
async fn panicking_generator_returns_fallback_designs() {
    let text = FakeGenerator::new(Reply::Panic);
    let app = common::build_test_app(text.clone());

    let response = post_json(app, ENDPOINT, json!({ "category": "Art" })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][2]["code"], fallback_script(Style::Elegant, "Art"));
    assert_eq!(text.calls(), 5);
}

// ---------------------------------------------------------------------------
// Test: a hung upstream still answers in time, and a timeout is JSON
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn hung_upstream_finishes_within_default_request_timeout() {
    let config = ServerConfig::new(GeminiConfig::new("test-key", "gemini-1.5-flash"));
    let worst_case = worst_case_batch(config.gemini.timeout, config.generation_throttle);
    let text = FakeGenerator::new(Reply::Hang(config.gemini.timeout));
    let app = common::build_app_with(config, text.clone());

    let started = Instant::now();
    let response = post_json(app, ENDPOINT, json!({ "category": "Astronomy" })).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(started.elapsed() >= worst_case);
    let json = body_json(response).await;
    let designs = json["data"].as_array().unwrap();
    assert_eq!(designs.len(), 5);
    for (design, style) in designs.iter().zip(Style::ALL) {
        assert_eq!(design["code"], fallback_script(style, "Astronomy"));
    }
    assert_eq!(text.calls(), 5);
}

#[tokio::test(start_paused = true)]
async fn request_timeout_returns_json_500() {
    let mut config = common::test_config();
    config.request_timeout_secs = 1;
    let app = common::build_app_with(config, FakeGenerator::new(Reply::Hang(Duration::from_secs(30))));

    let response = post_json(app, ENDPOINT, json!({ "category": "Astronomy" })).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "Internal server error while generating certificates");
}

// ---------------------------------------------------------------------------
// Test: invalid categories are rejected before any upstream call
// ---------------------------------------------------------------------------

async fn assert_rejected(body: serde_json::Value) {
    let text = FakeGenerator::new(Reply::Fenced);
    let app = common::build_test_app(text.clone());

    let response = post_json(app, ENDPOINT, body.clone()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], CATEGORY_REQUIRED_MSG);
    assert_eq!(text.calls(), 0);
}

#[tokio::test]
async fn missing_category_returns_400() {
    assert_rejected(json!({})).await;
}

#[tokio::test]
async fn empty_category_returns_400() {
    assert_rejected(json!({ "category": "" })).await;
}

#[tokio::test]
async fn whitespace_category_returns_400() {
    assert_rejected(json!({ "category": "   \t" })).await;
}

#[tokio::test]
async fn non_string_category_returns_400() {
    assert_rejected(json!({ "category": 42 })).await;
    assert_rejected(json!({ "category": null })).await;
    assert_rejected(json!({ "category": ["Art"] })).await;
}

#[tokio::test]
async fn non_object_body_returns_400() {
    assert_rejected(json!("Machine Learning")).await;
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let text = FakeGenerator::new(Reply::Fenced);
    let app = common::build_test_app(text.clone());

    let response = post_raw(app, ENDPOINT, "{\"category\": ").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], CATEGORY_REQUIRED_MSG);
    assert_eq!(text.calls(), 0);
}

#[tokio::test]
async fn missing_content_type_returns_400() {
    let app = common::build_default_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri(ENDPOINT)
        .body(Body::from(r#"{"category":"Art"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], CATEGORY_REQUIRED_MSG);
}
