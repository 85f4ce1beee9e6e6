// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// `POST /api/process-image` 请求体
///
/// 字段均为可选，缺失时由网关返回 400 而不是由 JSON 解析器拒绝。
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProcessImageRequestDto {
    #[serde(rename = "imageData", alias = "image_data", default)]
    pub image_data: Option<String>,
    #[serde(rename = "mediaType", alias = "media_type", default)]
    pub media_type: Option<String>,
}
