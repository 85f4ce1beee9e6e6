// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use attendrs::config::settings::Settings;
use attendrs::domain::models::credential::ApiKey;
use attendrs::domain::services::extraction_gateway::{ExtractionGateway, GatewayConfig};
use attendrs::infrastructure::inference::gemini_client::GeminiClient;
use attendrs::presentation::routes;
use attendrs::utils::retry_policy::RetryPolicy;
use axum_test::TestServer;
use config::{File, FileFormat};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

/// 1x1 PNG
pub const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub const TEST_API_KEY: &str = "AIzaSyIntegrationSecret987";
pub const TEST_MODEL: &str = "gemini-2.0-flash";
pub const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub upstream: MockServer,
}

pub fn settings_from(toml: &str) -> Settings {
    Settings::from_source(File::from_str(toml, FileFormat::Toml)).expect("valid test settings")
}

pub fn gateway_config(upstream: &MockServer, api_key: Option<&str>) -> GatewayConfig {
    GatewayConfig {
        credential: api_key.and_then(ApiKey::new),
        model_endpoint: upstream.uri(),
        model: TEST_MODEL.to_string(),
        timeout: Duration::from_secs(5),
        max_retries: 0,
        ..GatewayConfig::default()
    }
}

pub fn build_gateway(config: GatewayConfig) -> Arc<ExtractionGateway> {
    let client = GeminiClient::new(&config.model_endpoint, &config.model, Duration::from_secs(10))
        .expect("valid client");
    let mut policy = RetryPolicy::with_max_retries(config.max_retries);
    policy.initial_backoff = Duration::from_millis(10);
    policy.enable_jitter = false;
    Arc::new(ExtractionGateway::new(config, Arc::new(client)).with_retry_policy(policy))
}

pub async fn create_test_app(api_key: Option<&str>) -> TestApp {
    create_test_app_with(api_key, "", |config| config).await
}

pub async fn create_test_app_with<F>(api_key: Option<&str>, settings_toml: &str, customize: F) -> TestApp
where
    F: FnOnce(GatewayConfig) -> GatewayConfig,
{
    let upstream = MockServer::start().await;
    let config = customize(gateway_config(&upstream, api_key));
    let gateway = build_gateway(config);
    let settings = Arc::new(settings_from(settings_toml));

    let server = TestServer::new(routes::app(gateway, settings)).expect("test server");
    TestApp { server, upstream }
}

/// 上游成功响应，文本放在第一个候选的第一段
pub fn gemini_text_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {
            "promptTokenCount": 1290,
            "candidatesTokenCount": 64,
            "totalTokenCount": 1354
        }
    })
}
