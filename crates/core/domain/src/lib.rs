//! UDMI 领域模型：入站消息、主键、设备/站点文档、类型化载荷与校验历史。

pub mod device;
pub mod error;
pub mod event;
pub mod history;
pub mod key;
pub mod message;
pub mod payload;
pub mod site;

pub use device::{Device, DeviceDraft, Entry, Point, PointMeta, Validation, improve, improve_text};
pub use error::InvalidMessage;
pub use event::{DeviceEvent, DevicePayload, SiteEvent, SubType, UdmiEvent};
pub use history::{DeviceValidationRecord, SiteValidationRecord};
pub use key::{DeviceKey, SiteKey};
pub use message::{Message, MessageAttributes};
pub use payload::{
    DeviceValidationPayload, Hardware, Location, Operation, PointReading, PointsetPayload,
    SiteValidationPayload, Software, SystemPayload, parse_timestamp,
};
pub use site::{Site, SiteSummary, SiteValidation};
