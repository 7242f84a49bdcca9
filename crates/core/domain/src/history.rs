//! 校验历史记录（只追加的时序数据，写入后不再更新）。

use crate::key::DeviceKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceValidationRecord {
    pub device_key: DeviceKey,
    pub timestamp: DateTime<Utc>,
    pub message: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteValidationRecord {
    pub site_name: String,
    pub timestamp: DateTime<Utc>,
    pub message: serde_json::Value,
}
