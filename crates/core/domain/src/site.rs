//! 站点文档模型。

use crate::device::Entry;
use crate::error::InvalidMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 站点校验汇总（设备名列表）。
///
/// 反序列化同时接受 UDMI 载荷的 snake_case 字段名。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    #[serde(default, alias = "correct_devices", skip_serializing_if = "Option::is_none")]
    pub correct_devices: Option<Vec<String>>,
    #[serde(default, alias = "extra_devices", skip_serializing_if = "Option::is_none")]
    pub extra_devices: Option<Vec<String>>,
    #[serde(default, alias = "missing_devices", skip_serializing_if = "Option::is_none")]
    pub missing_devices: Option<Vec<String>>,
    #[serde(default, alias = "error_devices", skip_serializing_if = "Option::is_none")]
    pub error_devices: Option<Vec<String>>,
}

/// 站点级校验结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteValidation {
    pub timestamp: DateTime<Utc>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SiteSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointset: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Entry>>,
}

/// 站点文档。不变量：`name` 非空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<SiteValidation>,
    /// `summary.error_devices` 的简化投影（看板用）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_devices: Option<Vec<String>>,
}

impl Site {
    pub fn new(
        name: impl Into<String>,
        validation: Option<SiteValidation>,
        error_devices: Option<Vec<String>>,
    ) -> Result<Self, InvalidMessage> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidMessage::new("name"));
        }
        Ok(Self {
            name,
            validation,
            error_devices,
        })
    }
}
