use udmi_telemetry::{
    TelemetryMetrics, metrics, new_request_ids, record_conflict_retry, record_message_received,
};

#[test]
fn request_ids_non_empty() {
    let ids = new_request_ids();
    assert!(!ids.request_id.is_empty());
    assert!(!ids.trace_id.is_empty());
    assert_ne!(ids.request_id, ids.trace_id);
}

#[test]
fn fresh_metrics_start_at_zero() {
    let snapshot = TelemetryMetrics::new().snapshot();
    assert_eq!(snapshot, Default::default());
}

#[test]
fn global_counters_increase() {
    let before = metrics().snapshot();
    record_message_received();
    record_conflict_retry();
    let after = metrics().snapshot();
    assert!(after.messages_received > before.messages_received);
    assert!(after.conflict_retries > before.conflict_retries);
}
