// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 提取网关（extraction_gateway）：图片到患者记录的完整转换流程
/// - 推理客户端接口（inference_client）：上游视觉语言模型的抽象
/// - 提示词模板（prompt）：发送给模型的指令文本
/// - 记录校验（record_normalizer）：按配置处理模型输出的记录
/// - 响应清理（response_cleaner）：去除 markdown 代码块
pub mod extraction_gateway;
pub mod inference_client;
pub mod prompt;
pub mod record_normalizer;
pub mod response_cleaner;
