use domain::{DevicePayload, InvalidMessage, Message, MessageAttributes, SubType, UdmiEvent};
use serde_json::json;
use udmi_normalize::{DEFAULT_VALIDATOR_ID, normalize};

fn message(
    device_id: &str,
    registry: &str,
    sub_folder: &str,
    sub_type: Option<&str>,
    data: serde_json::Value,
) -> Message {
    Message::new(
        MessageAttributes {
            device_id: device_id.to_string(),
            device_registry_id: registry.to_string(),
            sub_folder: Some(sub_folder.to_string()),
            sub_type: sub_type.map(str::to_string),
            device_num_id: Some("2625324262579600".to_string()),
            ..MessageAttributes::default()
        },
        data,
    )
}

#[test]
fn system_state_becomes_device_event() {
    let msg = message(
        "AHU-1",
        "reg-1",
        "system",
        Some("state"),
        json!({ "serial_no": "SN1", "timestamp": "2022-03-21T13:19:32Z" }),
    );
    let Some(UdmiEvent::Device(event)) = normalize(&msg, DEFAULT_VALIDATOR_ID).expect("ok") else {
        panic!("expected device event");
    };
    assert_eq!(event.key.name, "AHU-1");
    assert_eq!(event.device_num_id.as_deref(), Some("2625324262579600"));
    match event.payload {
        DevicePayload::System { sub_type, payload } => {
            assert_eq!(sub_type, Some(SubType::State));
            assert_eq!(payload.serial_no.as_deref(), Some("SN1"));
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn unhandled_returns_none() {
    let msg = message("AHU-1", "reg-1", "system", Some("garbage"), json!({}));
    assert!(normalize(&msg, DEFAULT_VALIDATOR_ID).expect("ok").is_none());
}

#[test]
fn missing_device_id_is_invalid() {
    let msg = message("", "reg-1", "pointset", None, json!({ "points": {} }));
    assert_eq!(
        normalize(&msg, DEFAULT_VALIDATOR_ID).unwrap_err(),
        InvalidMessage::new("deviceId")
    );
}

#[test]
fn unhandled_wins_over_missing_key() {
    let msg = message("", "", "blobset", None, json!({}));
    assert!(normalize(&msg, DEFAULT_VALIDATOR_ID).expect("ok").is_none());
}

#[test]
fn validator_validation_is_site_event() {
    let msg = message(
        DEFAULT_VALIDATOR_ID,
        "reg-1",
        "validation",
        None,
        json!({
            "timestamp": "2022-03-21T13:19:32Z",
            "version": "1.4.0",
            "summary": { "error_devices": ["AHU-1"] }
        }),
    );
    let Some(UdmiEvent::Site(event)) = normalize(&msg, DEFAULT_VALIDATOR_ID).expect("ok") else {
        panic!("expected site event");
    };
    assert_eq!(event.key.name, "reg-1");
    let summary = event.payload.summary.expect("summary");
    assert_eq!(summary.error_devices, Some(vec!["AHU-1".to_string()]));
    assert_eq!(event.raw["version"], "1.4.0");
}

#[test]
fn non_object_data_is_invalid() {
    let msg = message("AHU-1", "reg-1", "pointset", Some("state"), json!([1, 2]));
    assert_eq!(
        normalize(&msg, DEFAULT_VALIDATOR_ID).unwrap_err(),
        InvalidMessage::new("data")
    );
}

#[test]
fn custom_validator_id() {
    let msg = message("site-bot", "reg-1", "validation", Some("event"), json!({}));
    assert!(matches!(
        normalize(&msg, "site-bot").expect("ok"),
        Some(UdmiEvent::Site(_))
    ));
    assert!(matches!(
        normalize(&msg, DEFAULT_VALIDATOR_ID).expect("ok"),
        Some(UdmiEvent::Device(_))
    ));
}

#[test]
fn integer_version_does_not_reject_pointset() {
    let msg = message(
        "AHU-1",
        "reg-1",
        "pointset",
        Some("state"),
        json!({
            "version": 1,
            "timestamp": "2022-03-21T13:19:32Z",
            "points": { "p1": { "present_value": 78 } }
        }),
    );
    let Some(UdmiEvent::Device(event)) = normalize(&msg, DEFAULT_VALIDATOR_ID).expect("ok") else {
        panic!("expected device event");
    };
    match event.payload {
        DevicePayload::Pointset { payload, .. } => {
            assert_eq!(payload.points.len(), 1);
            assert!(payload.timestamp().is_some());
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn integer_version_does_not_reject_system() {
    let msg = message(
        "AHU-1",
        "reg-1",
        "system",
        Some("state"),
        json!({ "version": 1, "serial_no": "SN1" }),
    );
    let Some(UdmiEvent::Device(event)) = normalize(&msg, DEFAULT_VALIDATOR_ID).expect("ok") else {
        panic!("expected device event");
    };
    match event.payload {
        DevicePayload::System { payload, .. } => {
            assert_eq!(payload.serial_no.as_deref(), Some("SN1"));
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn validation_without_required_fields_is_invalid() {
    let msg = message("AHU-1", "reg-1", "validation", None, json!({ "version": "1.4.0" }));
    assert_eq!(
        normalize(&msg, DEFAULT_VALIDATOR_ID).unwrap_err(),
        InvalidMessage::new("timestamp")
    );
    let msg = message(
        DEFAULT_VALIDATOR_ID,
        "reg-1",
        "validation",
        None,
        json!({ "timestamp": "2022-03-21T13:19:32Z" }),
    );
    assert_eq!(
        normalize(&msg, DEFAULT_VALIDATOR_ID).unwrap_err(),
        InvalidMessage::new("version")
    );
    let msg = message(
        "AHU-1",
        "reg-1",
        "validation",
        None,
        json!({ "timestamp": "2022-03-21T13:19:32Z", "version": 1 }),
    );
    assert!(normalize(&msg, DEFAULT_VALIDATOR_ID).expect("ok").is_some());
}
