//! UDMI 消息规范化：分类、主键提取、载荷类型化。
//!
//! 顺序固定为 分类 -> 主键 -> 载荷（validation 另查必填字段）；未处理的消息返回 `Ok(None)`，
//! 由调用方记录告警后丢弃。

pub mod classify;
pub mod key;

pub use classify::{
    Classification, DEFAULT_VALIDATOR_ID, classify, is_pointset, is_site_scoped, is_system,
    is_validation,
};
pub use key::{device_key, site_key};

use domain::{
    DeviceEvent, DevicePayload, DeviceValidationPayload, InvalidMessage, Message,
    PointsetPayload, SiteEvent, SiteValidationPayload, SystemPayload, UdmiEvent,
    parse_timestamp,
};
use serde::de::DeserializeOwned;
use tracing::debug;

/// 将入站消息转换为类型化事件。
pub fn normalize(message: &Message, validator_id: &str) -> Result<Option<UdmiEvent>, InvalidMessage> {
    let attributes = &message.attributes;
    let classification = classify(attributes);
    if classification == Classification::Unhandled {
        return Ok(None);
    }

    if classification == Classification::Validation && is_site_scoped(attributes, validator_id) {
        let key = site_key(attributes)?;
        let payload: SiteValidationPayload = typed(&message.data)?;
        if timestamp_present_but_invalid(payload.timestamp.as_deref()) {
            debug!(target: "udmi.handler", site = %key, "payload_timestamp_unparsed");
        }
        require_validation_fields(payload.timestamp.as_deref(), payload.version.as_deref())?;
        return Ok(Some(UdmiEvent::Site(SiteEvent {
            key,
            payload,
            raw: message.data.clone(),
        })));
    }

    let key = device_key(attributes)?;
    let payload = match classification {
        Classification::System(sub_type) => {
            let payload: SystemPayload = typed(&message.data)?;
            note_timestamp(&key, payload.timestamp.as_deref());
            DevicePayload::System { sub_type, payload }
        }
        Classification::Pointset(sub_type) => {
            let payload: PointsetPayload = typed(&message.data)?;
            note_timestamp(&key, payload.timestamp.as_deref());
            DevicePayload::Pointset { sub_type, payload }
        }
        Classification::Validation => {
            let payload: DeviceValidationPayload = typed(&message.data)?;
            require_validation_fields(payload.timestamp.as_deref(), payload.version.as_deref())?;
            DevicePayload::Validation {
                payload,
                raw: message.data.clone(),
            }
        }
        Classification::Unhandled => return Ok(None),
    };

    Ok(Some(UdmiEvent::Device(DeviceEvent {
        key,
        device_num_id: attributes.device_num_id().map(str::to_string),
        payload,
    })))
}

fn typed<T: DeserializeOwned>(data: &serde_json::Value) -> Result<T, InvalidMessage> {
    serde_json::from_value(data.clone()).map_err(|_| InvalidMessage::new("data"))
}

fn note_timestamp(key: &domain::DeviceKey, raw: Option<&str>) {
    if timestamp_present_but_invalid(raw) {
        debug!(target: "udmi.handler", device = %key, "payload_timestamp_unparsed");
    }
}

/// 校验结果必须带可解析的 timestamp 与非空 version，在读取存储前拒绝。
fn require_validation_fields(
    timestamp: Option<&str>,
    version: Option<&str>,
) -> Result<(), InvalidMessage> {
    if parse_timestamp(timestamp).is_none() {
        return Err(InvalidMessage::new("timestamp"));
    }
    if version.is_none_or(str::is_empty) {
        return Err(InvalidMessage::new("version"));
    }
    Ok(())
}

/// 时间戳存在但无法解析（按缺失处理）。
fn timestamp_present_but_invalid(raw: Option<&str>) -> bool {
    raw.is_some() && parse_timestamp(raw).is_none()
}
