//! 主键提取。在任何存储访问之前执行。

use domain::{DeviceKey, InvalidMessage, MessageAttributes, SiteKey};

/// deviceId 为空返回 `InvalidMessage("deviceId")`，deviceRegistryId 为空返回 `InvalidMessage("site")`。
pub fn device_key(attributes: &MessageAttributes) -> Result<DeviceKey, InvalidMessage> {
    if attributes.device_id.is_empty() {
        return Err(InvalidMessage::new("deviceId"));
    }
    if attributes.device_registry_id.is_empty() {
        return Err(InvalidMessage::new("site"));
    }
    DeviceKey::new(
        attributes.device_id.clone(),
        attributes.device_registry_id.clone(),
    )
}

pub fn site_key(attributes: &MessageAttributes) -> Result<SiteKey, InvalidMessage> {
    SiteKey::new(attributes.device_registry_id.clone())
}
