//! 分类后的 UDMI 事件（类型化载荷的标签联合）。

use crate::key::{DeviceKey, SiteKey};
use crate::payload::{
    DeviceValidationPayload, PointsetPayload, SiteValidationPayload, SystemPayload,
};

/// system / pointset 接受的 subType 白名单。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubType {
    Model,
    State,
    Config,
}

impl SubType {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "model" => Some(Self::Model),
            "state" => Some(Self::State),
            "config" => Some(Self::Config),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::State => "state",
            Self::Config => "config",
        }
    }
}

/// 设备级载荷。
#[derive(Debug, Clone, PartialEq)]
pub enum DevicePayload {
    System {
        sub_type: Option<SubType>,
        payload: SystemPayload,
    },
    Pointset {
        sub_type: Option<SubType>,
        payload: PointsetPayload,
    },
    Validation {
        payload: DeviceValidationPayload,
        raw: serde_json::Value,
    },
}

/// 设备级事件。
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceEvent {
    pub key: DeviceKey,
    pub device_num_id: Option<String>,
    pub payload: DevicePayload,
}

/// 站点级事件（仅 validation）。
#[derive(Debug, Clone, PartialEq)]
pub struct SiteEvent {
    pub key: SiteKey,
    pub payload: SiteValidationPayload,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UdmiEvent {
    Device(DeviceEvent),
    Site(SiteEvent),
}

impl UdmiEvent {
    /// 是否为 validation 消息（需要额外写入历史记录）。
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Device(event) => matches!(event.payload, DevicePayload::Validation { .. }),
            Self::Site(_) => true,
        }
    }
}
