// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    create_test_app, create_test_app_with, gemini_text_reply, GENERATE_PATH, PNG_1X1, TEST_API_KEY,
};
use attendrs::domain::models::patient_record::RecordMode;
use attendrs::domain::services::prompt::PromptTemplate;
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

const ANA_FENCED: &str = "```json\n[{\"FECHA\":\"2025/01/01\",\"HORA\":\"09:00\",\"NOMBRE\":\"ANA LOPEZ\",\"IDENTIDAD\":\"12345\",\"EDAD\":\"40\"}]\n```";
const ANA_JSON: &str = r#"[{"FECHA":"2025/01/01","HORA":"09:00","NOMBRE":"ANA LOPEZ","IDENTIDAD":"12345","EDAD":"40"}]"#;

/// 端到端：带 markdown 代码块的模型输出被清理后原样返回
#[tokio::test]
async fn test_process_image_end_to_end() {
    let app = create_test_app(Some(TEST_API_KEY)).await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply(ANA_FENCED)))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/process-image")
        .json(&json!({ "imageData": PNG_1X1, "mediaType": "image/png" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), ANA_JSON);

    // The upstream saw the prompt and the inline image
    let requests = app.upstream.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let parts = &body["contents"][0]["parts"];
    assert_eq!(parts[0]["text"], PromptTemplate::Detailed.text());
    assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
    assert_eq!(parts[1]["inline_data"]["data"], PNG_1X1);
    assert!(requests[0].url.query().is_none());
}

#[tokio::test]
async fn test_missing_image_data_returns_400_without_upstream_call() {
    let app = create_test_app(Some(TEST_API_KEY)).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply("[]")))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/process-image")
        .json(&json!({ "mediaType": "image/png" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("imageData"));
}

#[tokio::test]
async fn test_non_json_body_returns_400() {
    let app = create_test_app(Some(TEST_API_KEY)).await;

    let response = app.server.post("/api/process-image").text("imageData=abc").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_missing_credential_returns_500_without_leaking() {
    let app = create_test_app(None).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply("[]")))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/process-image")
        .json(&json!({ "imageData": PNG_1X1, "mediaType": "image/png" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].is_string());
    assert!(body["note"].is_string());
}

#[tokio::test]
async fn test_upstream_error_body_never_contains_credential() {
    let app = create_test_app(Some(TEST_API_KEY)).await;

    // An upstream that echoes the key back in its error message
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": format!("API key not valid: {}", TEST_API_KEY),
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/process-image")
        .json(&json!({ "imageData": PNG_1X1, "mediaType": "image/png" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = response.text();
    assert!(!text.contains("IntegrationSecret987"));
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["upstreamStatus"], 400);
    assert!(body["error"].as_str().unwrap().contains("API key not valid"));
}

#[tokio::test]
async fn test_not_json_reply_returns_400_with_raw() {
    let app = create_test_app(Some(TEST_API_KEY)).await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply("not json")))
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/process-image")
        .json(&json!({ "imageData": PNG_1X1 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["raw"], "not json");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_safety_block_returns_500_naming_reason() {
    let app = create_test_app(Some(TEST_API_KEY)).await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/process-image")
        .json(&json!({ "imageData": PNG_1X1, "mediaType": "image/png" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("SAFETY"));
}

#[tokio::test]
async fn test_slow_upstream_returns_504() {
    let app = create_test_app_with(Some(TEST_API_KEY), "", |config| {
        attendrs::domain::services::extraction_gateway::GatewayConfig {
            timeout: Duration::from_millis(200),
            ..config
        }
    })
    .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_text_reply("[]"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/process-image")
        .json(&json!({ "imageData": PNG_1X1, "mediaType": "image/png" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_transient_503_is_retried_once() {
    let app = create_test_app_with(Some(TEST_API_KEY), "", |config| {
        attendrs::domain::services::extraction_gateway::GatewayConfig {
            max_retries: 1,
            ..config
        }
    })
    .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": { "code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE" }
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.upstream)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply(ANA_JSON)))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/process-image")
        .json(&json!({ "imageData": PNG_1X1, "mediaType": "image/png" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), ANA_JSON);
}

#[tokio::test]
async fn test_coerce_mode_defaults_missing_fields() {
    let app = create_test_app_with(Some(TEST_API_KEY), "", |config| {
        attendrs::domain::services::extraction_gateway::GatewayConfig {
            record_mode: RecordMode::Coerce,
            ..config
        }
    })
    .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_text_reply(r#"[{"NOMBRE":"ANA LOPEZ","IDENTIDAD":12345}]"#)),
        )
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/process-image")
        .json(&json!({ "imageData": PNG_1X1, "mediaType": "image/png" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.text(),
        r#"[{"FECHA":"","HORA":"","NOMBRE":"ANA LOPEZ","IDENTIDAD":"12345","EDAD":""}]"#
    );
}

#[tokio::test]
async fn test_data_url_submission() {
    let app = create_test_app(Some(TEST_API_KEY)).await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply("[]")))
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/process-image")
        .json(&json!({ "imageData": format!("data:image/webp;base64,{}", PNG_1X1) }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "[]");

    let requests = app.upstream.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["mime_type"], "image/webp");
    assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["data"], PNG_1X1);
}

#[tokio::test]
async fn test_oversized_body_returns_413() {
    let app = create_test_app_with(Some(TEST_API_KEY), "[limits]\nbody_limit_bytes = 2048\n", |config| config).await;

    let response = app
        .server
        .post("/api/process-image")
        .json(&json!({ "imageData": "A".repeat(8192), "mediaType": "image/png" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
}
