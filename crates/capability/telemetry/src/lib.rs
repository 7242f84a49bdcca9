//! 追踪初始化、请求 ID 与进程级计数指标。

use serde::Serialize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 指标快照（GET /metrics 直接输出）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub messages_received: u64,
    pub messages_unhandled: u64,
    pub messages_invalid: u64,
    pub device_upserts: u64,
    pub site_upserts: u64,
    pub validation_records: u64,
    pub conflict_retries: u64,
    pub persistence_failures: u64,
}

/// 事件处理计数器。
pub struct TelemetryMetrics {
    messages_received: AtomicU64,
    messages_unhandled: AtomicU64,
    messages_invalid: AtomicU64,
    device_upserts: AtomicU64,
    site_upserts: AtomicU64,
    validation_records: AtomicU64,
    conflict_retries: AtomicU64,
    persistence_failures: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            messages_received: AtomicU64::new(0),
            messages_unhandled: AtomicU64::new(0),
            messages_invalid: AtomicU64::new(0),
            device_upserts: AtomicU64::new(0),
            site_upserts: AtomicU64::new(0),
            validation_records: AtomicU64::new(0),
            conflict_retries: AtomicU64::new(0),
            persistence_failures: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_unhandled: self.messages_unhandled.load(Ordering::Relaxed),
            messages_invalid: self.messages_invalid.load(Ordering::Relaxed),
            device_upserts: self.device_upserts.load(Ordering::Relaxed),
            site_upserts: self.site_upserts.load(Ordering::Relaxed),
            validation_records: self.validation_records.load(Ordering::Relaxed),
            conflict_retries: self.conflict_retries.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info，`RUST_LOG` 覆盖）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录入站消息次数。
pub fn record_message_received() {
    metrics().messages_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录未处理（分类落空）消息次数。
pub fn record_message_unhandled() {
    metrics().messages_unhandled.fetch_add(1, Ordering::Relaxed);
}

/// 记录非法消息次数。
pub fn record_message_invalid() {
    metrics().messages_invalid.fetch_add(1, Ordering::Relaxed);
}

pub fn record_device_upsert() {
    metrics().device_upserts.fetch_add(1, Ordering::Relaxed);
}

pub fn record_site_upsert() {
    metrics().site_upserts.fetch_add(1, Ordering::Relaxed);
}

/// 记录校验历史写入次数。
pub fn record_validation_record() {
    metrics().validation_records.fetch_add(1, Ordering::Relaxed);
}

/// 记录版本冲突后的重试次数。
pub fn record_conflict_retry() {
    metrics().conflict_retries.fetch_add(1, Ordering::Relaxed);
}

/// 记录存储失败次数（含重试耗尽）。
pub fn record_persistence_failure() {
    metrics()
        .persistence_failures
        .fetch_add(1, Ordering::Relaxed);
}
