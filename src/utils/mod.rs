// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
/// 包括错误类型、日志初始化、重试策略和敏感信息脱敏
pub mod errors;
pub mod redact;
pub mod retry_policy;
pub mod telemetry;
