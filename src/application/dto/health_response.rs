// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// `GET /api/health` 响应体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponseDto {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub has_api_key: bool,
    pub model: String,
    pub prompt_template: &'static str,
    pub record_mode: &'static str,
    pub environment: String,
    pub version: &'static str,
}
