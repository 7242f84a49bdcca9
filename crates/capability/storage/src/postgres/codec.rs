//! JSON 文本列编解码
//!
//! 关系型后端把嵌套子对象（points、tags、validation、error_devices）
//! 序列化为 JSON 文本列，读取时再解析回来。

use crate::error::StorageError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// 子对象 → JSON 文本（None 保持为 NULL）。
pub fn encode_json<T: Serialize>(value: Option<&T>) -> Result<Option<String>, StorageError> {
    value
        .map(|value| serde_json::to_string(value).map_err(StorageError::from))
        .transpose()
}

/// JSON 文本 → 子对象（NULL 与空串均视为缺失）。
pub fn decode_json<T: DeserializeOwned>(raw: Option<String>) -> Result<Option<T>, StorageError> {
    match raw {
        Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
        _ => Ok(None),
    }
}
