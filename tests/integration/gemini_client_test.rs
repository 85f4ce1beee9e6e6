// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{gemini_text_reply, GENERATE_PATH, PNG_1X1, TEST_API_KEY, TEST_MODEL};
use attendrs::domain::models::credential::ApiKey;
use attendrs::domain::models::generation::GenerateContentRequest;
use attendrs::domain::services::inference_client::InferenceClient;
use attendrs::infrastructure::inference::gemini_client::GeminiClient;
use attendrs::utils::errors::ExtractionError;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> GenerateContentRequest {
    GenerateContentRequest::with_image("Lista los pacientes", "image/png", PNG_1X1, Some(0.0))
}

fn key() -> ApiKey {
    ApiKey::new(TEST_API_KEY).unwrap()
}

#[tokio::test]
async fn test_generate_content_parses_envelope() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", TEST_API_KEY))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply("[]")))
        .expect(1)
        .mount(&upstream)
        .await;

    let client = GeminiClient::new(&upstream.uri(), TEST_MODEL, Duration::from_secs(5)).unwrap();
    let response = client.generate_content(&key(), &request()).await.unwrap();

    assert_eq!(response.first_text(), Some("[]"));
    assert_eq!(response.usage_metadata.unwrap().total_token_count, 1354);

    let received = upstream.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Lista los pacientes");
    assert_eq!(body["generation_config"]["temperature"], 0.0);
}

#[tokio::test]
async fn test_non_success_status_maps_to_upstream_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&upstream)
        .await;

    let client = GeminiClient::new(&upstream.uri(), TEST_MODEL, Duration::from_secs(5)).unwrap();
    let err = client.generate_content(&key(), &request()).await.unwrap_err();

    match err {
        ExtractionError::Upstream {
            status, message, ..
        } => {
            assert_eq!(status, Some(429));
            assert_eq!(message, "Resource has been exhausted");
        }
        other => panic!("expected Upstream, got {:?}", other),
    }
}

#[tokio::test]
async fn test_plain_text_error_body_is_kept() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream connect error"))
        .mount(&upstream)
        .await;

    let client = GeminiClient::new(&upstream.uri(), TEST_MODEL, Duration::from_secs(5)).unwrap();
    let err = client.generate_content(&key(), &request()).await.unwrap_err();

    assert!(err.is_retryable());
    assert!(err.to_string().contains("upstream connect error"));
}

#[tokio::test]
async fn test_unrecognized_success_body_is_invalid_response() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&upstream)
        .await;

    let client = GeminiClient::new(&upstream.uri(), TEST_MODEL, Duration::from_secs(5)).unwrap();
    let err = client.generate_content(&key(), &request()).await.unwrap_err();

    assert!(matches!(err, ExtractionError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_http_timeout_maps_to_timeout() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_text_reply("[]"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&upstream)
        .await;

    let client = GeminiClient::new(&upstream.uri(), TEST_MODEL, Duration::from_millis(200)).unwrap();
    let err = client.generate_content(&key(), &request()).await.unwrap_err();

    assert!(matches!(err, ExtractionError::Timeout { timeout_ms: 200 }));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on this port once the listener is dropped
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let client = GeminiClient::new(&uri, TEST_MODEL, Duration::from_secs(2)).unwrap();
    let err = client.generate_content(&key(), &request()).await.unwrap_err();

    assert!(matches!(err, ExtractionError::Upstream { status: None, .. }));
    assert!(err.is_retryable());
}
