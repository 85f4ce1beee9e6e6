// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 提取错误类型
///
/// 覆盖从输入校验到上游调用、响应解析的全部失败情形，
/// 由表示层统一映射为 HTTP 响应。
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// 请求输入缺失或格式错误
    #[error("{0}")]
    InvalidInput(String),

    /// 服务端配置缺失（例如未配置 API 密钥）
    #[error("{0}")]
    Configuration(String),

    /// 上游返回非成功状态或传输失败
    #[error("Error del modelo upstream{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Upstream {
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    /// 上游调用超时
    #[error("El modelo no respondió en {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// 上游因安全策略拒绝生成内容
    #[error("Contenido bloqueado por el modelo: {reason}")]
    ContentBlocked { reason: String },

    /// 上游响应结构无效
    #[error("Respuesta inválida del modelo: {0}")]
    InvalidResponse(String),

    /// 模型输出无法解析为 JSON 或不符合记录格式
    #[error("{message}")]
    ResponseParse { message: String, raw: String },
}

impl ExtractionError {
    /// 判断错误是否可重试
    ///
    /// 仅传输失败、超时以及 429/5xx 状态可重试；内容拦截与解析错误不可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractionError::Upstream { retryable, .. } => *retryable,
            ExtractionError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// 用于指标标签的错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::InvalidInput(_) => "invalid_input",
            ExtractionError::Configuration(_) => "configuration",
            ExtractionError::Upstream { .. } => "upstream",
            ExtractionError::Timeout { .. } => "timeout",
            ExtractionError::ContentBlocked { .. } => "content_blocked",
            ExtractionError::InvalidResponse(_) => "invalid_response",
            ExtractionError::ResponseParse { .. } => "response_parse",
        }
    }

    /// 根据上游 HTTP 状态构造错误
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        ExtractionError::Upstream {
            status: Some(status),
            message: message.into(),
            retryable: status == 429 || (500..600).contains(&status),
        }
    }

    /// 构造传输层错误
    pub fn transport(message: impl Into<String>) -> Self {
        ExtractionError::Upstream {
            status: None,
            message: message.into(),
            retryable: true,
        }
    }
}
