// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 日志中允许展示的密钥前缀长度
const VISIBLE_PREFIX_CHARS: usize = 4;

/// 对密钥进行脱敏
///
/// 仅保留前几个字符用于诊断，其余部分以 `***` 代替。
/// 过短的值完全隐藏，避免前缀即为整个密钥。
pub fn mask_secret(secret: &str) -> String {
    let secret = secret.trim();
    if secret.chars().count() <= VISIBLE_PREFIX_CHARS * 2 {
        return "***".to_string();
    }
    let prefix: String = secret.chars().take(VISIBLE_PREFIX_CHARS).collect();
    format!("{}***", prefix)
}
