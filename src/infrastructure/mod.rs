// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统的交互。
///
/// 包含的子模块：
/// - 推理（inference）：上游视觉语言模型的 HTTPS 客户端
/// - 指标（metrics）：Prometheus 指标导出
///
/// 基础设施层依赖于领域层的抽象接口（`InferenceClient`），
/// 领域层不依赖任何具体实现。
pub mod inference;
pub mod metrics;
