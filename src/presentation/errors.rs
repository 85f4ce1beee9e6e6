// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::utils::errors::ExtractionError;

/// 配置错误时返回给客户端的提示，不包含任何密钥内容
const CONFIGURATION_NOTE: &str =
    "Defina GEMINI_API_KEY o GOOGLE_API_KEY en el entorno del servidor";

/// 应用错误类型
///
/// 封装所有可能的请求处理错误，统一转换为 JSON 响应
#[derive(Debug)]
pub enum AppError {
    /// 提取流程中的错误
    Extraction(ExtractionError),
    /// 直接以指定状态码返回的错误（如请求体过大）
    Status(StatusCode, String),
}

impl AppError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Status(status, message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = match self {
            AppError::Status(status, message) => {
                return (status, Json(json!({ "error": message }))).into_response();
            }
            AppError::Extraction(err) => err,
        };

        let (status, body) = match &err {
            ExtractionError::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ExtractionError::Configuration(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message, "note": CONFIGURATION_NOTE }),
            ),
            ExtractionError::Upstream { status, .. } => {
                let mut body = json!({ "error": err.to_string() });
                if let Some(status) = status {
                    body["upstreamStatus"] = json!(status);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            ExtractionError::Timeout { .. } => {
                (StatusCode::GATEWAY_TIMEOUT, json!({ "error": err.to_string() }))
            }
            ExtractionError::ContentBlocked { .. } | ExtractionError::InvalidResponse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
            ExtractionError::ResponseParse { message, raw } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "raw": raw }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Extraction(err)
    }
}
