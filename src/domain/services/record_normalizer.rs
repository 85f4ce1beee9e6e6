// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::models::patient_record::{
    ExtractionResult, PatientRecord, RecordMode, RECORD_FIELDS,
};
use crate::utils::errors::ExtractionError;

static FECHA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}/(0[1-9]|1[0-2])/(0[1-9]|[12]\d|3[01])$").expect("valid regex"));
static HORA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid regex"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid regex"));

/// 按记录模式处理解析后的模型输出
///
/// # 参数
/// * `value` - 已解析的 JSON
/// * `mode` - 记录校验模式
/// * `raw` - 清理后的原始文本，校验失败时随错误返回
pub fn normalize(value: Value, mode: RecordMode, raw: &str) -> Result<ExtractionResult, ExtractionError> {
    match mode {
        RecordMode::Passthrough => Ok(ExtractionResult::new(value)),
        RecordMode::Coerce => {
            let records = objects(value, raw)?
                .iter()
                .map(coerce_record)
                .collect::<Vec<_>>();
            Ok(ExtractionResult::from(records))
        }
        RecordMode::Strict => {
            let objects = objects(value, raw)?;
            let mut records = Vec::with_capacity(objects.len());
            for (index, object) in objects.iter().enumerate() {
                let record = strict_record(object)
                    .map_err(|reason| rejected(format!("Registro {}: {}", index, reason), raw))?;
                records.push(record);
            }
            Ok(ExtractionResult::from(records))
        }
    }
}

fn rejected(message: String, raw: &str) -> ExtractionError {
    ExtractionError::ResponseParse {
        message,
        raw: raw.to_string(),
    }
}

fn objects(value: Value, raw: &str) -> Result<Vec<Map<String, Value>>, ExtractionError> {
    let Value::Array(items) = value else {
        return Err(rejected(
            "La respuesta del modelo no es un arreglo JSON".to_string(),
            raw,
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(rejected(
                format!("Registro {} no es un objeto: {}", index, other),
                raw,
            )),
        })
        .collect()
}

/// Key lookup tolerant of casing drift such as `Nombre`.
fn field<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).or_else(|| {
        object
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

fn coerce_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

fn coerce_record(object: &Map<String, Value>) -> PatientRecord {
    let get = |name: &str| coerce_value(field(object, name));
    PatientRecord {
        fecha: get("FECHA"),
        hora: get("HORA"),
        nombre: get("NOMBRE"),
        identidad: get("IDENTIDAD"),
        edad: get("EDAD"),
    }
}

fn strict_record(object: &Map<String, Value>) -> Result<PatientRecord, String> {
    for name in RECORD_FIELDS {
        match object.get(name) {
            Some(Value::String(_)) => {}
            Some(other) => return Err(format!("{} debe ser texto, se recibió {}", name, other)),
            None => return Err(format!("falta el campo {}", name)),
        }
    }

    let text = |name: &str| {
        object
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let record = PatientRecord {
        fecha: text("FECHA"),
        hora: text("HORA"),
        nombre: text("NOMBRE"),
        identidad: text("IDENTIDAD"),
        edad: text("EDAD"),
    };

    // Empty means unreadable in the source sheet, which is allowed
    let check = |name: &str, value: &str, re: &Regex, expected: &str| {
        if value.is_empty() || re.is_match(value) {
            Ok(())
        } else {
            Err(format!("{} '{}' no cumple el formato {}", name, value, expected))
        }
    };
    check("FECHA", record.fecha.as_str(), &*FECHA_RE, "YYYY/MM/DD")?;
    check("HORA", record.hora.as_str(), &*HORA_RE, "HH:MM")?;
    check("IDENTIDAD", record.identidad.as_str(), &*DIGITS_RE, "solo dígitos")?;
    check("EDAD", record.edad.as_str(), &*DIGITS_RE, "solo dígitos")?;

    if record.nombre != record.nombre.to_uppercase() {
        return Err(format!("NOMBRE '{}' debe estar en mayúsculas", record.nombre));
    }

    Ok(record)
}
