// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::config::settings::PromptSettings;

/// 完整模板：逐行扫描、先计数再提取、最后自检数量
const DETAILED_PROMPT: &str = r#"Eres un asistente que analiza la imagen de una hoja de agenda médica.

INSTRUCCIONES:
1. Recorre la imagen fila por fila, de arriba hacia abajo, sin omitir ninguna fila.
2. Identifica la columna que indica si el paciente llegó (marca de verificación, casilla rellena o marcada).
3. Antes de extraer datos, cuenta cuántas filas tienen esa marca. Revisa de nuevo cada fila para confirmar el conteo.
4. Extrae únicamente las filas marcadas. No incluyas filas sin marca y no inventes datos.
5. Para cada fila marcada devuelve un objeto con exactamente estas claves:
   - "FECHA": fecha de la cita en formato YYYY/MM/DD
   - "HORA": hora de la cita en formato HH:MM
   - "NOMBRE": nombre completo del paciente en MAYÚSCULAS
   - "IDENTIDAD": número de identidad, solo dígitos
   - "EDAD": edad, solo dígitos
   Si un dato no es legible, usa una cadena vacía "".
6. Comprueba que la cantidad de objetos del arreglo sea igual al número de filas marcadas que contaste.

FORMATO DE RESPUESTA:
Responde únicamente con un arreglo JSON, en el mismo orden de las filas. Sin texto adicional, sin explicaciones y sin bloques de código markdown.
Si ninguna fila está marcada, responde [].
Ejemplo: [{"FECHA":"2025/01/01","HORA":"09:00","NOMBRE":"ANA LOPEZ","IDENTIDAD":"12345","EDAD":"40"}]"#;

/// 简短模板
const CONCISE_PROMPT: &str = r#"Extrae de esta hoja de agenda médica los pacientes marcados como llegados. Responde solo con un arreglo JSON de objetos con las claves FECHA (YYYY/MM/DD), HORA (HH:MM), NOMBRE (MAYÚSCULAS), IDENTIDAD (solo dígitos) y EDAD (solo dígitos), sin markdown."#;

/// 配置中的模板类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    #[default]
    Detailed,
    Concise,
    Custom,
}

impl PromptVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptVariant::Detailed => "detailed",
            PromptVariant::Concise => "concise",
            PromptVariant::Custom => "custom",
        }
    }
}

/// 发送给上游模型的指令模板
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PromptTemplate {
    #[default]
    Detailed,
    Concise,
    Custom(String),
}

impl PromptTemplate {
    /// 从配置构建模板
    ///
    /// `custom` 缺少文本时回退到完整模板（配置校验会提前拒绝这种情况）
    pub fn from_settings(settings: &PromptSettings) -> Self {
        match settings.template {
            PromptVariant::Detailed => PromptTemplate::Detailed,
            PromptVariant::Concise => PromptTemplate::Concise,
            PromptVariant::Custom => settings
                .custom_text
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(|text| PromptTemplate::Custom(text.to_string()))
                .unwrap_or_default(),
        }
    }

    pub fn variant(&self) -> PromptVariant {
        match self {
            PromptTemplate::Detailed => PromptVariant::Detailed,
            PromptTemplate::Concise => PromptVariant::Concise,
            PromptTemplate::Custom(_) => PromptVariant::Custom,
        }
    }

    /// 指令文本
    pub fn text(&self) -> &str {
        match self {
            PromptTemplate::Detailed => DETAILED_PROMPT,
            PromptTemplate::Concise => CONCISE_PROMPT,
            PromptTemplate::Custom(text) => text.as_str(),
        }
    }
}
