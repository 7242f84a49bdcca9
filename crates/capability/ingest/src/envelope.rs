//! pub/sub 信封解码。
//!
//! 支持两种形态：
//! - 直接信封 `{ attributes, data, publishTime }`
//! - 推送订阅形态 `{ "message": { attributes, data, publishTime } }`
//!
//! `data` 为 base64 编码的 JSON；为空时按 `{}` 处理。

use crate::IngestError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use domain::{Message, MessageAttributes, parse_timestamp};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    attributes: MessageAttributes,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    publish_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireEnvelope {
    Push { message: Envelope },
    Direct(Envelope),
}

/// 解码信封字节为入站消息。
pub fn decode_envelope(bytes: &[u8]) -> Result<Message, IngestError> {
    let wire: WireEnvelope = serde_json::from_slice(bytes)
        .map_err(|err| IngestError::Envelope(format!("envelope: {}", err)))?;
    let envelope = match wire {
        WireEnvelope::Push { message } => message,
        WireEnvelope::Direct(envelope) => envelope,
    };

    let data = decode_data(envelope.data.as_deref())?;
    Ok(Message {
        attributes: envelope.attributes,
        data,
        publish_time: parse_timestamp(envelope.publish_time.as_deref()),
    })
}

fn decode_data(raw: Option<&str>) -> Result<serde_json::Value, IngestError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    let bytes = STANDARD
        .decode(raw)
        .map_err(|err| IngestError::Envelope(format!("data base64: {}", err)))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(&bytes).map_err(|err| IngestError::Envelope(format!("data json: {}", err)))
}
