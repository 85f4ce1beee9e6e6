// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::utils::errors::ExtractionError;

/// 上游模型接受的图片类型
pub const SUPPORTED_MEDIA_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
    "image/heif",
];

/// 经过校验的图片提交
#[derive(Debug, Clone)]
pub struct ImageSubmission {
    image_data: String,
    media_type: String,
    decoded_len: usize,
}

impl ImageSubmission {
    /// 校验并构造图片提交
    ///
    /// # 参数
    /// * `image_data` - base64 图片数据，也接受 `data:<mime>;base64,<payload>` 形式
    /// * `media_type` - 请求中的 MIME 类型，缺失时依次使用 data URL 中的类型和 `default_media_type`
    /// * `default_media_type` - 配置的默认 MIME 类型
    ///
    /// # 错误
    /// * 图片数据缺失、不是合法 base64 或解码后为空时返回 `InvalidInput`
    /// * MIME 类型不受支持时返回 `InvalidInput`
    pub fn parse(
        image_data: Option<&str>,
        media_type: Option<&str>,
        default_media_type: &str,
    ) -> Result<Self, ExtractionError> {
        let raw = image_data
            .map(str::trim)
            .filter(|data| !data.is_empty())
            .ok_or_else(|| ExtractionError::InvalidInput("imageData es requerido".to_string()))?;

        let (payload, data_url_mime) = split_data_url(raw)?;

        let media_type = media_type
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .or(data_url_mime)
            .unwrap_or(default_media_type);
        let media_type = normalize_media_type(media_type)?;

        // Line-wrapped base64 is common from some clients
        let payload: String = if payload.bytes().any(|b| b.is_ascii_whitespace()) {
            payload.chars().filter(|c| !c.is_ascii_whitespace()).collect()
        } else {
            payload.to_string()
        };

        let decoded_len = STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| ExtractionError::InvalidInput(format!("imageData no es base64 válido: {}", e)))?
            .len();

        if decoded_len == 0 {
            return Err(ExtractionError::InvalidInput(
                "imageData está vacío".to_string(),
            ));
        }

        Ok(Self {
            image_data: payload,
            media_type,
            decoded_len,
        })
    }

    /// base64 数据（不含 data URL 前缀）
    pub fn image_data(&self) -> &str {
        &self.image_data
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// 解码后的图片字节数
    pub fn decoded_len(&self) -> usize {
        self.decoded_len
    }
}

fn split_data_url(raw: &str) -> Result<(&str, Option<&str>), ExtractionError> {
    let Some(rest) = raw.strip_prefix("data:") else {
        return Ok((raw, None));
    };

    let (header, payload) = rest.split_once(',').ok_or_else(|| {
        ExtractionError::InvalidInput("data URL sin contenido".to_string())
    })?;

    let mut segments = header.split(';');
    let mime = segments.next().filter(|m| !m.is_empty());
    if !segments.any(|s| s.eq_ignore_ascii_case("base64")) {
        return Err(ExtractionError::InvalidInput(
            "data URL debe estar codificada en base64".to_string(),
        ));
    }

    Ok((payload, mime))
}

/// 规范化 MIME 类型并检查是否受支持
pub fn normalize_media_type(media_type: &str) -> Result<String, ExtractionError> {
    let lower = media_type.trim().to_ascii_lowercase();
    let normalized = match lower.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        _ => lower,
    };

    if SUPPORTED_MEDIA_TYPES.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(ExtractionError::InvalidInput(format!(
            "mediaType no soportado: {} (permitidos: {})",
            media_type,
            SUPPORTED_MEDIA_TYPES.join(", ")
        )))
    }
}
