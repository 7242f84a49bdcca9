//! 按 `(subFolder, subType)` 对入站消息分类。
//!
//! system / pointset 只接受 subType 缺失或属于 {model, state, config}；
//! validation 接受任意 subType（含缺失）。两者的不对称保持原样。

use domain::{MessageAttributes, SubType};

/// 站点级消息使用的保留设备标识。
pub const DEFAULT_VALIDATOR_ID: &str = "_validator";

/// 分类结果，四者互斥。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    System(Option<SubType>),
    Pointset(Option<SubType>),
    Validation,
    Unhandled,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System(_) => "system",
            Self::Pointset(_) => "pointset",
            Self::Validation => "validation",
            Self::Unhandled => "unhandled",
        }
    }
}

pub fn classify(attributes: &MessageAttributes) -> Classification {
    match attributes.sub_folder() {
        Some("system") => whitelisted(attributes)
            .map(Classification::System)
            .unwrap_or(Classification::Unhandled),
        Some("pointset") => whitelisted(attributes)
            .map(Classification::Pointset)
            .unwrap_or(Classification::Unhandled),
        Some("validation") => Classification::Validation,
        _ => Classification::Unhandled,
    }
}

/// subType 缺失返回 `Some(None)`；不在白名单内返回 `None`。
fn whitelisted(attributes: &MessageAttributes) -> Option<Option<SubType>> {
    match attributes.sub_type() {
        None => Some(None),
        Some(raw) => SubType::from_wire(raw).map(Some),
    }
}

pub fn is_system(attributes: &MessageAttributes) -> bool {
    matches!(classify(attributes), Classification::System(_))
}

pub fn is_pointset(attributes: &MessageAttributes) -> bool {
    matches!(classify(attributes), Classification::Pointset(_))
}

pub fn is_validation(attributes: &MessageAttributes) -> bool {
    matches!(classify(attributes), Classification::Validation)
}

/// deviceId 等于保留标识时视为站点级消息。
pub fn is_site_scoped(attributes: &MessageAttributes, validator_id: &str) -> bool {
    attributes.device_id == validator_id
}
