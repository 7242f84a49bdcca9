/// 消息不完整或字段非法（缺少主键字段、文档名称为空等）。
///
/// 在主键提取或文档构建阶段同步抛出，发生在任何存储 I/O 之前。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid message: {field}")]
pub struct InvalidMessage {
    pub field: String,
}

impl InvalidMessage {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}
