// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use crate::domain::models::credential::ApiKey;
use crate::domain::models::generation::{GenerateContentRequest, GenerateContentResponse};
use crate::utils::errors::ExtractionError;

/// 视觉语言模型推理客户端
///
/// 网关只依赖 `generateContent` 的请求/响应结构，不依赖具体厂商 SDK。
/// 实现需要把传输失败和非成功状态映射为 `ExtractionError::Upstream`。
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// 发送一次非流式生成请求
    async fn generate_content(
        &self,
        api_key: &ApiKey,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ExtractionError>;
}
