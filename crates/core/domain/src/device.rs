//! 设备文档模型
//!
//! - Point / PointMeta：设备点位（遥测/配置通道）
//! - Device：设备文档（按 DeviceKey 整体 upsert）
//! - DeviceDraft：全可选字段的构建输入，`build()` 统一校验 name/site
//! - Validation / Entry：最近一次校验结果

use crate::error::InvalidMessage;
use crate::key::DeviceKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 点位附加信息。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// 设备点位。
///
/// `id` 与 `name` 都等于点位的线上编码；`value`/`units`/`state` 是“最后已知值”，
/// 各自独立更新。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PointMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// UDMI 状态条目（status 或 errors[] 中的一项）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// 设备最近一次校验结果。`timestamp` 与 `version` 必填。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub timestamp: DateTime<Utc>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Entry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Entry>,
}

impl Validation {
    /// 校验必填字段后构造。
    pub fn new(
        timestamp: Option<DateTime<Utc>>,
        version: Option<String>,
    ) -> Result<Self, InvalidMessage> {
        let timestamp = timestamp.ok_or_else(|| InvalidMessage::new("timestamp"))?;
        let version = version
            .filter(|version| !version.is_empty())
            .ok_or_else(|| InvalidMessage::new("version"))?;
        Ok(Self {
            timestamp,
            version,
            category: None,
            message: None,
            detail: None,
            errors: None,
            status: None,
        })
    }
}

/// 设备文档。
///
/// 不变量：`name` 与 `site` 非空（由 [`DeviceDraft::build`] 保证）。
/// `points` 始终是完整点位集合，只经由点位合并引擎整体替换。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub name: String,
    pub site: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payload: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operational: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_state_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_state_saved: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_telemetry_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_telemetry_saved: Option<DateTime<Utc>>,
}

/// 设备文档构建输入。
///
/// 所有字段可选；通过 [`improve`] / [`improve_text`] 写入，空输入不会覆盖已有值。
#[derive(Debug, Clone, Default)]
pub struct DeviceDraft {
    pub name: Option<String>,
    pub site: Option<String>,
    pub id: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub section: Option<String>,
    pub last_payload: Option<DateTime<Utc>>,
    pub operational: Option<bool>,
    pub serial_number: Option<String>,
    pub firmware: Option<String>,
    pub tags: Option<Vec<String>>,
    pub points: Option<Vec<Point>>,
    pub validation: Option<Validation>,
    pub last_state_updated: Option<DateTime<Utc>>,
    pub last_state_saved: Option<DateTime<Utc>>,
    pub last_telemetry_updated: Option<DateTime<Utc>>,
    pub last_telemetry_saved: Option<DateTime<Utc>>,
}

impl DeviceDraft {
    /// 以主键为起点的空草稿（新设备）。
    pub fn for_key(key: &DeviceKey) -> Self {
        Self {
            name: Some(key.name.clone()),
            site: Some(key.site.clone()),
            ..Self::default()
        }
    }

    /// 校验并产出设备文档；name/site 为空时返回 `InvalidMessage`，不产生部分文档。
    pub fn build(self) -> Result<Device, InvalidMessage> {
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| InvalidMessage::new("name"))?;
        let site = self
            .site
            .filter(|site| !site.is_empty())
            .ok_or_else(|| InvalidMessage::new("site"))?;
        Ok(Device {
            name,
            site,
            id: self.id,
            make: self.make,
            model: self.model,
            section: self.section,
            last_payload: self.last_payload,
            operational: self.operational,
            serial_number: self.serial_number,
            firmware: self.firmware,
            tags: self.tags,
            points: self.points,
            validation: self.validation,
            last_state_updated: self.last_state_updated,
            last_state_saved: self.last_state_saved,
            last_telemetry_updated: self.last_telemetry_updated,
            last_telemetry_saved: self.last_telemetry_saved,
        })
    }
}

impl From<Device> for DeviceDraft {
    fn from(device: Device) -> Self {
        Self {
            name: Some(device.name),
            site: Some(device.site),
            id: device.id,
            make: device.make,
            model: device.model,
            section: device.section,
            last_payload: device.last_payload,
            operational: device.operational,
            serial_number: device.serial_number,
            firmware: device.firmware,
            tags: device.tags,
            points: device.points,
            validation: device.validation,
            last_state_updated: device.last_state_updated,
            last_state_saved: device.last_state_saved,
            last_telemetry_updated: device.last_telemetry_updated,
            last_telemetry_saved: device.last_telemetry_saved,
        }
    }
}

/// 仅在有新值时写入（只改进、不擦除）。
pub fn improve<T>(slot: &mut Option<T>, value: Option<T>) {
    if let Some(value) = value {
        *slot = Some(value);
    }
}

/// 同 [`improve`]，空字符串视为缺失。
pub fn improve_text(slot: &mut Option<String>, value: Option<String>) {
    improve(slot, value.filter(|value| !value.is_empty()));
}
