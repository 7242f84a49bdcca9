//! 设备文档构建。
//!
//! 以已有文档为起点，按事件类型只改进、不擦除字段，输出完整文档（非增量）。

use crate::points::merge_points;
use chrono::{DateTime, Utc};
use domain::{
    Device, DeviceDraft, DeviceEvent, DevicePayload, DeviceValidationPayload, InvalidMessage,
    PointsetPayload, SubType, SystemPayload, Validation, improve, improve_text,
};

/// 合并事件与已有设备文档。`now` 为处理时间，写入 `*Saved` 字段。
pub fn build_device(
    event: &DeviceEvent,
    existing: Option<Device>,
    now: DateTime<Utc>,
) -> Result<Device, InvalidMessage> {
    let mut draft = existing
        .map(DeviceDraft::from)
        .unwrap_or_else(|| DeviceDraft::for_key(&event.key));
    improve_text(&mut draft.id, event.device_num_id.clone());

    match &event.payload {
        DevicePayload::System { sub_type, payload } => {
            apply_system(&mut draft, *sub_type, payload, now)
        }
        DevicePayload::Pointset { sub_type, payload } => {
            apply_pointset(&mut draft, *sub_type, payload, now)
        }
        DevicePayload::Validation { payload, .. } => {
            draft.validation = Some(device_validation(payload)?);
        }
    }

    draft.build()
}

fn apply_system(
    draft: &mut DeviceDraft,
    sub_type: Option<SubType>,
    payload: &SystemPayload,
    now: DateTime<Utc>,
) {
    let timestamp = payload.timestamp();
    improve(&mut draft.last_payload, timestamp);
    improve(&mut draft.operational, payload.operational());
    improve_text(&mut draft.serial_number, payload.serial_no.clone());
    if let Some(hardware) = &payload.hardware {
        improve_text(&mut draft.make, hardware.make.clone());
        improve_text(&mut draft.model, hardware.model.clone());
    }
    if let Some(software) = &payload.software {
        improve_text(&mut draft.firmware, software.firmware.clone());
    }
    if let Some(location) = &payload.location {
        improve_text(&mut draft.site, location.site.clone());
        improve_text(&mut draft.section, location.section.clone());
    }
    if sub_type == Some(SubType::State) {
        improve(&mut draft.last_state_updated, timestamp);
        draft.last_state_saved = Some(now);
    }
}

fn apply_pointset(
    draft: &mut DeviceDraft,
    sub_type: Option<SubType>,
    payload: &PointsetPayload,
    now: DateTime<Utc>,
) {
    let timestamp = payload.timestamp();
    improve(&mut draft.last_payload, timestamp);
    // 空点位集合不覆盖已有点位
    if !payload.points.is_empty() {
        draft.points = Some(merge_points(&payload.points, draft.points.as_deref()));
    }
    if sub_type == Some(SubType::State) {
        improve(&mut draft.last_telemetry_updated, timestamp);
        draft.last_telemetry_saved = Some(now);
    }
}

/// category / message / detail 缺失时取 status 中的同名字段。
fn device_validation(payload: &DeviceValidationPayload) -> Result<Validation, InvalidMessage> {
    let mut validation = Validation::new(payload.timestamp(), payload.version.clone())?;
    let status = payload.status.as_ref();
    validation.category = payload
        .category
        .clone()
        .or_else(|| status.and_then(|status| status.category.clone()));
    validation.message = payload
        .message
        .clone()
        .or_else(|| status.and_then(|status| status.message.clone()));
    validation.detail = payload
        .detail
        .clone()
        .or_else(|| status.and_then(|status| status.detail.clone()));
    validation.errors = payload.errors.clone();
    validation.status = payload.status.clone();
    Ok(validation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain::{DeviceKey, Point, PointsetPayload};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 3, 21, 14, 0, 0).unwrap()
    }

    fn event(payload: DevicePayload) -> DeviceEvent {
        DeviceEvent {
            key: DeviceKey::new("AHU-1", "reg-1").expect("key"),
            device_num_id: None,
            payload,
        }
    }

    fn system(sub_type: Option<SubType>, data: serde_json::Value) -> DeviceEvent {
        event(DevicePayload::System {
            sub_type,
            payload: serde_json::from_value(data).expect("system"),
        })
    }

    #[test]
    fn system_state_on_new_device() {
        let event = system(
            Some(SubType::State),
            json!({
                "hardware": { "make": "Acme", "model": "X1" },
                "operational": "true",
                "serial_no": "SN1",
                "software": { "firmware": "v2" },
                "timestamp": "2022-03-21T13:19:32Z"
            }),
        );
        let device = build_device(&event, None, now()).expect("device");
        let ts = Utc.with_ymd_and_hms(2022, 3, 21, 13, 19, 32).unwrap();
        assert_eq!(device.name, "AHU-1");
        assert_eq!(device.site, "reg-1");
        assert_eq!(device.make.as_deref(), Some("Acme"));
        assert_eq!(device.model.as_deref(), Some("X1"));
        assert_eq!(device.operational, Some(true));
        assert_eq!(device.serial_number.as_deref(), Some("SN1"));
        assert_eq!(device.firmware.as_deref(), Some("v2"));
        assert_eq!(device.last_payload, Some(ts));
        assert_eq!(device.last_state_updated, Some(ts));
        assert_eq!(device.last_state_saved, Some(now()));
        assert!(device.points.is_none());
    }

    #[test]
    fn absent_fields_do_not_erase() {
        let first = system(
            Some(SubType::Model),
            json!({ "hardware": { "make": "Acme" }, "location": { "section": "2F" } }),
        );
        let device = build_device(&first, None, now()).expect("device");
        let second = system(
            Some(SubType::Model),
            json!({ "hardware": { "make": "" }, "serial_no": "SN9" }),
        );
        let device = build_device(&second, Some(device), now()).expect("device");
        assert_eq!(device.make.as_deref(), Some("Acme"));
        assert_eq!(device.section.as_deref(), Some("2F"));
        assert_eq!(device.serial_number.as_deref(), Some("SN9"));
        assert!(device.last_state_saved.is_none());
    }

    #[test]
    fn pointset_state_sets_telemetry_bookkeeping() {
        let existing = DeviceDraft {
            points: Some(vec![Point {
                id: "p1".to_string(),
                name: "p1".to_string(),
                value: None,
                units: Some("Bars".to_string()),
                meta: None,
                state: None,
            }]),
            ..DeviceDraft::for_key(&DeviceKey::new("AHU-1", "reg-1").expect("key"))
        }
        .build()
        .expect("device");
        let payload: PointsetPayload = serde_json::from_value(json!({
            "timestamp": "2022-03-21T13:19:32Z",
            "points": { "p1": { "present_value": 78 } }
        }))
        .expect("pointset");
        let event = event(DevicePayload::Pointset {
            sub_type: Some(SubType::State),
            payload,
        });
        let device = build_device(&event, Some(existing), now()).expect("device");
        let points = device.points.expect("points");
        assert_eq!(points[0].value.as_deref(), Some("78"));
        assert_eq!(points[0].units.as_deref(), Some("Bars"));
        assert_eq!(device.last_telemetry_saved, Some(now()));
        assert!(device.last_telemetry_updated.is_some());
    }

    #[test]
    fn empty_pointset_keeps_points() {
        let first = event(DevicePayload::Pointset {
            sub_type: None,
            payload: serde_json::from_value(json!({ "points": { "p1": { "present_value": 1 } } }))
                .expect("pointset"),
        });
        let device = build_device(&first, None, now()).expect("device");
        let second = event(DevicePayload::Pointset {
            sub_type: None,
            payload: PointsetPayload::default(),
        });
        let device = build_device(&second, Some(device), now()).expect("device");
        assert_eq!(device.points.map(|points| points.len()), Some(1));
    }

    #[test]
    fn validation_falls_back_to_status() {
        let data = json!({
            "timestamp": "2022-03-21T13:19:32Z",
            "version": "1.4.0",
            "status": { "category": "validation.device.schema", "message": "bad", "level": 500 }
        });
        let event = event(DevicePayload::Validation {
            payload: serde_json::from_value(data.clone()).expect("validation"),
            raw: data,
        });
        let device = build_device(&event, None, now()).expect("device");
        let validation = device.validation.expect("validation");
        assert_eq!(validation.category.as_deref(), Some("validation.device.schema"));
        assert_eq!(validation.message.as_deref(), Some("bad"));
        assert_eq!(validation.status.and_then(|status| status.level), Some(500));
    }

    #[test]
    fn validation_without_version_is_invalid() {
        let data = json!({ "timestamp": "2022-03-21T13:19:32Z" });
        let event = event(DevicePayload::Validation {
            payload: serde_json::from_value(data.clone()).expect("validation"),
            raw: data,
        });
        assert_eq!(
            build_device(&event, None, now()).unwrap_err(),
            InvalidMessage::new("version")
        );
    }

    #[test]
    fn device_num_id_sets_id() {
        let mut event = system(None, json!({}));
        event.device_num_id = Some("2625324262579600".to_string());
        let device = build_device(&event, None, now()).expect("device");
        assert_eq!(device.id.as_deref(), Some("2625324262579600"));
    }
}
