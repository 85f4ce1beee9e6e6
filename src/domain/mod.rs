// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：图片提交、患者记录、上游请求/响应结构
/// - 服务（services）：提取网关、提示词、响应清理和记录校验
///
/// 领域层只通过 `InferenceClient` 抽象与上游模型交互，
/// 不依赖任何具体的 HTTP 实现。
pub mod models;
pub mod services;
