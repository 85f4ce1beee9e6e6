// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

const FENCE: &str = "```";

/// 去除模型输出外层的 markdown 代码块标记和空白
///
/// 反复剥离直到结果不再变化，因此对已清理的文本再次调用不会改变结果。
pub fn strip_code_fences(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let next = strip_once(current).trim();
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> &str {
    let mut stripped = text;

    if let Some(rest) = stripped.strip_prefix(FENCE) {
        // Language tag such as `json` directly after the opening fence
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        stripped = &rest[tag_len..];
    }

    if let Some(rest) = stripped.strip_suffix(FENCE) {
        stripped = rest;
    }

    stripped
}
