//! 按 `(subFolder, subType)` 类型化后的 UDMI 载荷。
//!
//! 字段名沿用 UDMI 线上格式（snake_case），未知字段忽略。

use crate::device::Entry;
use crate::site::SiteSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// 解析 RFC3339 时间戳；缺失或格式错误时返回 None。
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// 接受布尔值或 "true"/"false" 字符串；其他形态视为缺失。
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(value)) => Some(value),
        Some(serde_json::Value::String(value)) => match value.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// 接受字符串、数字或布尔值并统一为文本；对象、数组与 null 视为缺失。
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(value)) => Some(value),
        Some(serde_json::Value::Number(value)) => Some(number_text(&value)),
        Some(serde_json::Value::Bool(value)) => Some(value.to_string()),
        _ => None,
    })
}

/// 整数值的浮点数按整数输出（`78.0` -> `"78"`）。
fn number_text(number: &serde_json::Number) -> String {
    match number.as_f64() {
        Some(value)
            if number.is_f64()
                && value.is_finite()
                && value.fract() == 0.0
                && value.abs() < i64::MAX as f64 =>
        {
            (value as i64).to_string()
        }
        _ => number.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hardware {
    #[serde(default, deserialize_with = "lenient_text")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Software {
    #[serde(default, deserialize_with = "lenient_text")]
    pub firmware: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient_text")]
    pub site: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub section: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub operational: Option<bool>,
}

/// system 子目录载荷（model / state / config）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemPayload {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub operational: Option<bool>,
    /// 新版 UDMI 将 operational 移入 `operation` 对象。
    #[serde(default)]
    pub operation: Option<Operation>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub serial_no: Option<String>,
    #[serde(default)]
    pub hardware: Option<Hardware>,
    #[serde(default)]
    pub software: Option<Software>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl SystemPayload {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.timestamp.as_deref())
    }

    pub fn operational(&self) -> Option<bool> {
        self.operational.or_else(|| {
            self.operation
                .as_ref()
                .and_then(|operation| operation.operational)
        })
    }
}

/// 单个点位读数。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointReading {
    #[serde(default)]
    pub present_value: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub units: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub value_state: Option<String>,
}

impl PointReading {
    /// present_value 的字符串形式：字符串原样返回，数字按 [`number_text`] 输出，
    /// 其余 JSON 值按文本输出。
    pub fn present_value_text(&self) -> Option<String> {
        match self.present_value.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(value) => Some(value.clone()),
            serde_json::Value::Number(value) => Some(number_text(value)),
            other => Some(other.to_string()),
        }
    }
}

/// pointset 子目录载荷。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointsetPayload {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub points: BTreeMap<String, PointReading>,
}

impl PointsetPayload {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.timestamp.as_deref())
    }
}

/// 设备级 validation 载荷。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceValidationPayload {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<Entry>,
    #[serde(default)]
    pub errors: Option<Vec<Entry>>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub detail: Option<String>,
}

impl DeviceValidationPayload {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.timestamp.as_deref())
    }
}

/// 站点级 validation 载荷（由 `_validator` 发出）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteValidationPayload {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub summary: Option<SiteSummary>,
    #[serde(default)]
    pub devices: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub status: Option<Entry>,
    #[serde(default)]
    pub pointset: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Option<Vec<Entry>>,
}

impl SiteValidationPayload {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.timestamp.as_deref())
    }
}
