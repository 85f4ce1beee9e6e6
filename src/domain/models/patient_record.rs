// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 记录字段名，按输出顺序排列
pub const RECORD_FIELDS: [&str; 5] = ["FECHA", "HORA", "NOMBRE", "IDENTIDAD", "EDAD"];

/// 患者到诊记录
///
/// 字段均为模型生成的文本，缺失字段默认为空字符串。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientRecord {
    /// 日期，格式 YYYY/MM/DD
    #[serde(rename = "FECHA")]
    pub fecha: String,
    /// 时间，格式 HH:MM
    #[serde(rename = "HORA")]
    pub hora: String,
    /// 大写姓名
    #[serde(rename = "NOMBRE")]
    pub nombre: String,
    /// 身份证号，仅数字
    #[serde(rename = "IDENTIDAD")]
    pub identidad: String,
    /// 年龄，仅数字
    #[serde(rename = "EDAD")]
    pub edad: String,
}

/// 记录校验模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordMode {
    /// 原样返回解析后的 JSON
    #[default]
    Passthrough,
    /// 补齐缺失字段并转换为字符串
    Coerce,
    /// 拒绝不符合格式的记录
    Strict,
}

impl RecordMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordMode::Passthrough => "passthrough",
            RecordMode::Coerce => "coerce",
            RecordMode::Strict => "strict",
        }
    }
}

/// 提取结果
///
/// 按模型输出顺序排列的记录；序列化为 JSON 数组本身。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractionResult(Value);

impl ExtractionResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// 记录数量；非数组结果计为 1
    pub fn len(&self) -> usize {
        match &self.0 {
            Value::Array(items) => items.len(),
            Value::Null => 0,
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Vec<PatientRecord>> for ExtractionResult {
    fn from(records: Vec<PatientRecord>) -> Self {
        Self(Value::Array(
            records
                .into_iter()
                .map(|record| {
                    serde_json::to_value(record).unwrap_or(Value::Null)
                })
                .collect(),
        ))
    }
}
