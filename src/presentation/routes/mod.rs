// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::services::extraction_gateway::ExtractionGateway;
use crate::presentation::handlers::{health_handler, process_image_handler};
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 返回值
///
/// 返回未挂载共享状态的路由
pub fn routes() -> Router {
    Router::new()
        .route("/api/health", get(health_handler::health_check))
        .route("/api/process-image", post(process_image_handler::process_image))
        .fallback(not_found)
}

/// 创建完整应用
///
/// 挂载网关、配置、请求体大小限制和请求追踪
pub fn app(gateway: Arc<ExtractionGateway>, settings: Arc<Settings>) -> Router {
    routes()
        .layer(DefaultBodyLimit::max(settings.limits.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(gateway))
        .layer(Extension(settings))
}

/// 未匹配路由
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Ruta no encontrada" })),
    )
}
