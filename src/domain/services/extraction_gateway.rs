// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, histogram};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::settings::Settings;
use crate::domain::models::credential::ApiKey;
use crate::domain::models::generation::{GenerateContentRequest, GenerateContentResponse};
use crate::domain::models::patient_record::{ExtractionResult, RecordMode};
use crate::domain::models::submission::ImageSubmission;
use crate::domain::services::inference_client::InferenceClient;
use crate::domain::services::prompt::PromptTemplate;
use crate::domain::services::record_normalizer;
use crate::domain::services::response_cleaner::strip_code_fences;
use crate::utils::errors::ExtractionError;
use crate::utils::retry_policy::RetryPolicy;

/// 表示内容被安全策略拦截的结束原因
const BLOCKING_FINISH_REASONS: [&str; 6] = [
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "OTHER",
];

/// 网关配置
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 上游 API 密钥
    pub credential: Option<ApiKey>,
    /// 上游接口基础URL
    pub model_endpoint: String,
    /// 模型名称
    pub model: String,
    /// 指令模板
    pub prompt: PromptTemplate,
    /// 单次上游请求超时
    pub timeout: Duration,
    /// 瞬时故障最大重试次数
    pub max_retries: u32,
    /// 记录校验模式
    pub record_mode: RecordMode,
    /// 默认图片类型
    pub default_media_type: String,
    /// 采样温度
    pub temperature: Option<f32>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            credential: None,
            model_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            prompt: PromptTemplate::Detailed,
            timeout: Duration::from_secs(60),
            max_retries: 1,
            record_mode: RecordMode::Passthrough,
            default_media_type: "image/jpeg".to_string(),
            temperature: Some(0.0),
        }
    }
}

impl GatewayConfig {
    /// 从应用配置构建网关配置
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            credential: settings.model.api_key.clone().and_then(ApiKey::new),
            model_endpoint: settings.model.api_base_url.clone(),
            model: settings.model.name.clone(),
            prompt: PromptTemplate::from_settings(&settings.prompt),
            timeout: Duration::from_millis(settings.model.timeout_ms),
            max_retries: settings.model.max_retries,
            record_mode: settings.extraction.record_mode,
            default_media_type: settings.extraction.default_media_type.clone(),
            temperature: settings.model.temperature,
        }
    }
}

/// 提取网关
///
/// 接收图片，构造指令并调用上游视觉语言模型，把模型输出清理、解析为患者记录数组。
/// 无共享可变状态，可通过 `Arc` 在请求间共享。
pub struct ExtractionGateway {
    config: GatewayConfig,
    client: Arc<dyn InferenceClient>,
    retry_policy: RetryPolicy,
}

impl ExtractionGateway {
    pub fn new(config: GatewayConfig, client: Arc<dyn InferenceClient>) -> Self {
        let retry_policy = RetryPolicy::with_max_retries(config.max_retries);
        Self {
            config,
            client,
            retry_policy,
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn has_credential(&self) -> bool {
        self.config.credential.is_some()
    }

    /// 校验原始请求字段并执行提取
    pub async fn process(
        &self,
        image_data: Option<&str>,
        media_type: Option<&str>,
    ) -> Result<ExtractionResult, ExtractionError> {
        let submission = ImageSubmission::parse(
            image_data,
            media_type,
            &self.config.default_media_type,
        )
        .inspect_err(|e| {
            counter!("attendrs_extractions_total", "outcome" => e.kind()).increment(1);
        })?;
        self.extract(&submission).await
    }

    /// 从图片中提取到诊患者记录
    ///
    /// # 参数
    /// * `image` - 已校验的图片提交
    ///
    /// # 返回值
    /// * `Ok(ExtractionResult)` - 模型输出的记录，顺序与模型输出一致
    /// * `Err(ExtractionError)` - 配置缺失、上游失败、内容被拦截或输出无法解析
    #[instrument(
        skip_all,
        fields(
            request_id = %Uuid::new_v4(),
            model = %self.config.model,
            media_type = image.media_type(),
            image_bytes = image.decoded_len(),
        )
    )]
    pub async fn extract(&self, image: &ImageSubmission) -> Result<ExtractionResult, ExtractionError> {
        let started = Instant::now();
        let result = self.run(image).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        counter!("attendrs_extractions_total", "outcome" => outcome).increment(1);
        histogram!("attendrs_extraction_duration_seconds").record(started.elapsed().as_secs_f64());

        result
    }

    async fn run(&self, image: &ImageSubmission) -> Result<ExtractionResult, ExtractionError> {
        let api_key = self.config.credential.as_ref().ok_or_else(|| {
            warn!("Upstream API key is not configured");
            ExtractionError::Configuration("API key del modelo no configurada".to_string())
        })?;
        debug!(api_key = %api_key, prompt = self.config.prompt.variant().as_str(), "Submitting image to upstream model");

        let request = GenerateContentRequest::with_image(
            self.config.prompt.text(),
            image.media_type(),
            image.image_data(),
            self.config.temperature,
        );

        let response = self.call_with_retry(api_key, &request).await?;

        if let Some(usage) = response.usage_metadata {
            counter!("attendrs_tokens_total", "kind" => "prompt").increment(usage.prompt_token_count as u64);
            counter!("attendrs_tokens_total", "kind" => "completion")
                .increment(usage.candidates_token_count as u64);
            debug!(
                prompt_tokens = usage.prompt_token_count,
                completion_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "Upstream token usage"
            );
        }

        let text = generated_text(&response)?;
        let cleaned = strip_code_fences(text);

        let value: Value = serde_json::from_str(cleaned).map_err(|e| {
            warn!(error = %e, raw = cleaned, "Model output is not valid JSON");
            ExtractionError::ResponseParse {
                message: format!("No se pudo interpretar la respuesta del modelo como JSON: {}", e),
                raw: cleaned.to_string(),
            }
        })?;

        let result = record_normalizer::normalize(value, self.config.record_mode, cleaned)?;
        info!(records = result.len(), "Extraction completed");
        Ok(result)
    }

    async fn call_with_retry(
        &self,
        api_key: &ApiKey,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ExtractionError> {
        let timeout_ms = self.config.timeout.as_millis() as u64;
        let mut attempt = 0;

        loop {
            let started = Instant::now();
            let outcome = match tokio::time::timeout(
                self.config.timeout,
                self.client.generate_content(api_key, request),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(ExtractionError::Timeout { timeout_ms }),
            };
            histogram!("attendrs_upstream_latency_seconds").record(started.elapsed().as_secs_f64());

            match outcome {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && self.retry_policy.should_retry(attempt) => {
                    attempt += 1;
                    let backoff = self.retry_policy.calculate_backoff(attempt);
                    warn!(attempt, backoff_ms = backoff.as_millis() as u64, error = %err, "Transient upstream failure, retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => {
                    warn!(attempts = attempt + 1, error = %err, "Upstream call failed");
                    return Err(err);
                }
            }
        }
    }
}

/// 取出第一段生成文本；内容被拦截时不尝试恢复部分输出
fn generated_text(response: &GenerateContentResponse) -> Result<&str, ExtractionError> {
    if let Some(reason) = response.block_reason() {
        warn!(reason, "Prompt blocked by upstream model");
        return Err(ExtractionError::ContentBlocked {
            reason: reason.to_string(),
        });
    }

    if response.candidates.is_empty() {
        return Err(ExtractionError::InvalidResponse(
            "la respuesta no contiene candidatos".to_string(),
        ));
    }

    if let Some(reason) = response
        .finish_reason()
        .filter(|reason| BLOCKING_FINISH_REASONS.contains(reason))
    {
        warn!(reason, "Candidate withheld by upstream model");
        return Err(ExtractionError::ContentBlocked {
            reason: reason.to_string(),
        });
    }

    response
        .first_text()
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            ExtractionError::InvalidResponse(format!(
                "la respuesta no contiene texto generado (finishReason: {})",
                response.finish_reason().unwrap_or("desconocido")
            ))
        })
}
