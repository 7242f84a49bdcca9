use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use domain::Message;
use serde_json::json;
use std::sync::Arc;
use udmi_ingest::{IngestError, MessageHandler, NoopSource, Source, decode_envelope};

fn encoded(value: serde_json::Value) -> String {
    STANDARD.encode(value.to_string())
}

#[test]
fn decodes_direct_envelope() {
    let body = json!({
        "attributes": {
            "deviceId": "AHU-1",
            "deviceRegistryId": "reg-1",
            "deviceNumId": "2625324262579600",
            "subFolder": "pointset",
            "subType": "state",
            "projectId": "bos-platform-dev"
        },
        "data": encoded(json!({ "points": { "p1": { "present_value": 78 } } })),
        "publishTime": "2022-03-21T13:19:33Z"
    });
    let message = decode_envelope(body.to_string().as_bytes()).expect("message");
    assert_eq!(message.attributes.device_id, "AHU-1");
    assert_eq!(message.attributes.sub_type(), Some("state"));
    assert_eq!(message.attributes.project_id.as_deref(), Some("bos-platform-dev"));
    assert_eq!(message.data["points"]["p1"]["present_value"], 78);
    assert!(message.publish_time.is_some());
}

#[test]
fn decodes_push_envelope() {
    let body = json!({
        "message": {
            "attributes": { "deviceId": "_validator", "deviceRegistryId": "reg-1", "subFolder": "validation" },
            "data": encoded(json!({ "version": "1.4.0" }))
        },
        "subscription": "projects/p/subscriptions/udmi"
    });
    let message = decode_envelope(body.to_string().as_bytes()).expect("message");
    assert_eq!(message.attributes.device_id, "_validator");
    assert_eq!(message.data, json!({ "version": "1.4.0" }));
    assert!(message.publish_time.is_none());
}

#[test]
fn empty_data_is_empty_object() {
    let body = json!({ "attributes": { "deviceId": "AHU-1" }, "data": "" });
    let message = decode_envelope(body.to_string().as_bytes()).expect("message");
    assert_eq!(message.data, json!({}));
    assert_eq!(message.attributes.device_registry_id, "");
}

#[test]
fn rejects_non_json_payload() {
    let body = json!({ "attributes": {}, "data": STANDARD.encode("not json") });
    let err = decode_envelope(body.to_string().as_bytes()).unwrap_err();
    assert!(matches!(err, IngestError::Envelope(_)));
    assert!(decode_envelope(b"garbage").is_err());
}

struct CountingHandler(std::sync::atomic::AtomicUsize);

#[async_trait]
impl MessageHandler for CountingHandler {
    async fn handle(&self, _message: Message) -> Result<(), IngestError> {
        self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn noop_source_returns_immediately() {
    let handler = Arc::new(CountingHandler(Default::default()));
    NoopSource.run(handler.clone()).await.expect("noop");
    assert_eq!(handler.0.load(std::sync::atomic::Ordering::SeqCst), 0);
}
