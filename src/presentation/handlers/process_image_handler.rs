// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::rejection::JsonRejection, http::StatusCode, Extension, Json};
use std::sync::Arc;
use tracing::warn;

use crate::application::dto::process_image_request::ProcessImageRequestDto;
use crate::domain::models::patient_record::ExtractionResult;
use crate::domain::services::extraction_gateway::ExtractionGateway;
use crate::presentation::errors::AppError;
use crate::utils::errors::ExtractionError;

/// 处理图片并返回到诊患者列表
///
/// 客户端断开时 axum 会丢弃该 future，进行中的上游请求随之取消。
///
/// # 返回值
///
/// * `200` - 患者记录数组
/// * `400` - 输入缺失/无效，或模型输出无法解析（附带 `raw`）
/// * `413` - 请求体超过限制
/// * `500` / `504` - 配置错误、上游错误或超时
pub async fn process_image(
    Extension(gateway): Extension<Arc<ExtractionGateway>>,
    payload: Result<Json<ProcessImageRequestDto>, JsonRejection>,
) -> Result<Json<ExtractionResult>, AppError> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!("Rejected oversized image payload");
            return Err(AppError::status(
                StatusCode::PAYLOAD_TOO_LARGE,
                "La imagen excede el tamaño máximo permitido",
            ));
        }
        Err(rejection) => {
            return Err(ExtractionError::InvalidInput(format!(
                "Cuerpo de la solicitud inválido: {}",
                rejection.body_text()
            ))
            .into());
        }
    };

    let result = gateway
        .process(payload.image_data.as_deref(), payload.media_type.as_deref())
        .await?;

    Ok(Json(result))
}
