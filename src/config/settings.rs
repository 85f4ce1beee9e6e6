// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::models::patient_record::RecordMode;
use crate::domain::models::submission::normalize_media_type;
use crate::domain::services::prompt::PromptVariant;

/// 应用程序配置设置
///
/// 包含服务器、上游模型、提示词模板、记录校验、请求限制和指标等配置项
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    /// 服务器配置
    #[validate(nested)]
    pub server: ServerSettings,
    /// 上游视觉语言模型配置
    #[validate(nested)]
    pub model: ModelSettings,
    /// 提示词配置
    #[validate(nested)]
    pub prompt: PromptSettings,
    /// 提取结果处理配置
    #[validate(nested)]
    pub extraction: ExtractionSettings,
    /// 请求限制配置
    #[validate(nested)]
    pub limits: LimitSettings,
    /// 指标导出配置
    #[validate(nested)]
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// 运行环境 (development, production)
    pub environment: String,
}

impl ServerSettings {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// 上游模型配置设置
#[derive(Clone, Deserialize, Validate)]
pub struct ModelSettings {
    /// API 密钥
    pub api_key: Option<String>,
    /// API 基础URL
    #[validate(url)]
    pub api_base_url: String,
    /// 模型名称
    #[validate(length(min = 1, message = "model name cannot be empty"))]
    pub name: String,
    /// 采样温度
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: Option<f32>,
    /// 单次上游请求超时时间（毫秒）
    #[validate(range(min = 1000, max = 600000))]
    pub timeout_ms: u64,
    /// 瞬时故障的最大重试次数
    #[validate(range(min = 0, max = 3))]
    pub max_retries: u32,
}

// The credential must never reach logs through `{:?}`.
impl std::fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSettings")
            .field(
                "api_key",
                &self.api_key.as_deref().map(crate::utils::redact::mask_secret),
            )
            .field("api_base_url", &self.api_base_url)
            .field("name", &self.name)
            .field("temperature", &self.temperature)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// 提示词配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_prompt_settings"))]
pub struct PromptSettings {
    /// 模板类型 (detailed, concise, custom)
    pub template: PromptVariant,
    /// 自定义模板文本 (当 template=custom 时使用)
    pub custom_text: Option<String>,
}

fn validate_prompt_settings(prompt: &PromptSettings) -> Result<(), ValidationError> {
    if prompt.template == PromptVariant::Custom
        && prompt
            .custom_text
            .as_deref()
            .is_none_or(|text| text.trim().is_empty())
    {
        return Err(ValidationError::new("custom_prompt_missing")
            .with_message("prompt.custom_text is required when prompt.template is custom".into()));
    }
    Ok(())
}

/// 提取结果处理配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExtractionSettings {
    /// 记录校验模式 (passthrough, coerce, strict)
    pub record_mode: RecordMode,
    /// 请求未提供 mediaType 时使用的默认值
    #[validate(custom(function = "validate_default_media_type"))]
    pub default_media_type: String,
}

fn validate_default_media_type(media_type: &str) -> Result<(), ValidationError> {
    normalize_media_type(media_type).map(|_| ()).map_err(|e| {
        ValidationError::new("unsupported_media_type").with_message(e.to_string().into())
    })
}

/// 请求限制配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LimitSettings {
    /// 请求体最大字节数
    #[validate(range(min = 1024))]
    pub body_limit_bytes: usize,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败或校验失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Self::environment());

        let mut settings: Settings = builder.build()?.try_deserialize()?;
        settings.apply_plain_env(|key| std::env::var(key).ok());
        settings.check()?;
        Ok(settings)
    }

    /// 基于默认值和一个额外配置源构建配置，不读取进程环境
    pub fn from_source<S>(source: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings: Settings = Self::defaults()?.add_source(source).build()?.try_deserialize()?;
        settings.check()?;
        Ok(settings)
    }

    /// `ATTENDRS__SECTION__KEY` 形式的环境变量源
    fn environment() -> Environment {
        Environment::with_prefix("ATTENDRS").separator("__")
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Default server settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.environment", "development")?
            // Default model settings
            .set_default(
                "model.api_base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("model.name", "gemini-2.0-flash")?
            .set_default("model.temperature", 0.0)?
            .set_default("model.timeout_ms", 60000)?
            .set_default("model.max_retries", 1)?
            // Default prompt settings
            .set_default("prompt.template", "detailed")?
            // Default extraction settings
            .set_default("extraction.record_mode", "passthrough")?
            .set_default("extraction.default_media_type", "image/jpeg")?
            // 50 MiB, enough for base64-encoded phone photos
            .set_default("limits.body_limit_bytes", 50 * 1024 * 1024)?
            // Default metrics settings
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    /// 应用常见的非前缀环境变量
    ///
    /// `GEMINI_API_KEY` / `GOOGLE_API_KEY` 仅在未配置密钥时生效，`PORT` 覆盖监听端口
    fn apply_plain_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if self
            .model
            .api_key
            .as_deref()
            .is_none_or(|key| key.trim().is_empty())
        {
            self.model.api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("GOOGLE_API_KEY"));
        }

        if let Some(port) = non_empty("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|errors| ConfigError::Message(format!("invalid configuration: {}", errors)))
    }
}
