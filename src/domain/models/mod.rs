// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 上游密钥（credential）
/// - 上游生成接口的请求/响应结构（generation）
/// - 患者记录与记录校验模式（patient_record）
/// - 图片提交（submission）
pub mod credential;
pub mod generation;
pub mod patient_record;
pub mod submission;
