//! 入站消息（pub/sub 信封解码后的形态）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 消息属性。
///
/// 字段名是与上游发布方约定的线上契约（`deviceId`、`deviceRegistryId`、
/// `subFolder`、`subType` 等），不可重命名。缺失的属性反序列化为空值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAttributes {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub device_registry_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_num_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl MessageAttributes {
    /// 非空的 subFolder。
    pub fn sub_folder(&self) -> Option<&str> {
        non_empty(self.sub_folder.as_deref())
    }

    /// 非空的 subType。
    pub fn sub_type(&self) -> Option<&str> {
        non_empty(self.sub_type.as_deref())
    }

    pub fn device_num_id(&self) -> Option<&str> {
        non_empty(self.device_num_id.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// 入站消息：属性 + 不透明载荷。
///
/// `data` 的解释方式由 `(subFolder, subType)` 决定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub attributes: MessageAttributes,
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(attributes: MessageAttributes, data: serde_json::Value) -> Self {
        Self {
            attributes,
            data,
            publish_time: None,
        }
    }
}
