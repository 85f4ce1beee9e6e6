// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::domain::models::credential::ApiKey;
use crate::domain::models::generation::{GenerateContentRequest, GenerateContentResponse};
use crate::domain::services::inference_client::InferenceClient;
use crate::utils::errors::ExtractionError;

/// 上游错误信息最大保留长度
const MAX_ERROR_MESSAGE_CHARS: usize = 500;

/// Gemini `generateContent` 客户端
///
/// 通过 HTTPS 发送单次非流式请求，密钥放在 `x-goog-api-key` 请求头中，不出现在URL里。
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    /// 创建客户端
    ///
    /// # 参数
    /// * `base_url` - 接口基础URL，例如 `https://generativelanguage.googleapis.com/v1beta`
    /// * `model` - 模型名称，可带 `models/` 前缀
    /// * `timeout` - HTTP 请求超时
    ///
    /// # 错误
    /// * 基础URL无效或 HTTP 客户端构建失败时返回 `Configuration`
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, ExtractionError> {
        Url::parse(base_url).map_err(|e| {
            ExtractionError::Configuration(format!("URL del modelo inválida '{}': {}", base_url, e))
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("attendrs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ExtractionError::Configuration(format!("No se pudo crear el cliente HTTP: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.trim_start_matches("models/").to_string(),
            timeout,
        })
    }

    /// 完整的 generateContent 接口地址
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn map_transport(&self, err: reqwest::Error) -> ExtractionError {
        if err.is_timeout() {
            ExtractionError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ExtractionError::transport(err.to_string())
        }
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn generate_content(
        &self,
        api_key: &ApiKey,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ExtractionError> {
        let endpoint = self.endpoint();
        debug!(endpoint = %endpoint, api_key = %api_key, "Calling generateContent");

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", api_key.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                counter!("attendrs_upstream_requests_total", "status" => "transport").increment(1);
                self.map_transport(e)
            })?;

        let status = response.status();
        counter!("attendrs_upstream_requests_total", "status" => status.as_u16().to_string())
            .increment(1);

        let body = response.text().await.map_err(|e| self.map_transport(e))?;
        // Upstreams may echo the credential; mask it before it reaches logs or clients
        let body = body.replace(api_key.expose(), &api_key.masked());

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %body, "Upstream model returned an error");
            let message = upstream_error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "error desconocido".to_string());
            return Err(ExtractionError::upstream_status(status.as_u16(), message));
        }

        serde_json::from_str::<GenerateContentResponse>(&body).map_err(|e| {
            warn!(error = %e, body = %body, "Upstream response is not a generateContent envelope");
            ExtractionError::InvalidResponse(format!("cuerpo de respuesta no reconocido: {}", e))
        })
    }
}

/// 从上游错误响应中提取 `error.message`，否则截断原始文本
fn upstream_error_message(body: &str) -> Option<String> {
    let message = match serde_json::from_str::<Value>(body) {
        Ok(value) => value["error"]["message"]
            .as_str()
            .or_else(|| value["error"].as_str())
            .map(str::to_string),
        Err(_) => None,
    }
    .or_else(|| {
        let trimmed = body.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })?;

    Some(message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect())
}
