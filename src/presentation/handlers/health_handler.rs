// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{Extension, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::application::dto::health_response::HealthResponseDto;
use crate::config::settings::Settings;
use crate::domain::services::extraction_gateway::ExtractionGateway;

/// 健康检查端点
///
/// 报告是否配置了上游密钥，但从不返回密钥本身
pub async fn health_check(
    Extension(gateway): Extension<Arc<ExtractionGateway>>,
    Extension(settings): Extension<Arc<Settings>>,
) -> Json<HealthResponseDto> {
    let config = gateway.config();
    Json(HealthResponseDto {
        status: "ok",
        timestamp: Utc::now(),
        has_api_key: gateway.has_credential(),
        model: config.model.clone(),
        prompt_template: config.prompt.variant().as_str(),
        record_mode: config.record_mode.as_str(),
        environment: settings.server.environment.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
