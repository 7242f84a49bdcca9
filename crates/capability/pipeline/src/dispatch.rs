//! 单条消息的处理流程。
//!
//! 分类 -> 主键 -> 读取 -> 构建 -> 条件写入；validation 消息额外追加历史记录。
//! 条件写入遇到版本冲突时重新读取并重新合并，最多重试 `max_conflict_retries` 次。

use crate::device::build_device;
use crate::site::build_site;
use chrono::{DateTime, Utc};
use domain::{
    DeviceEvent, DeviceKey, DevicePayload, DeviceValidationRecord, InvalidMessage, Message,
    SiteEvent, SiteKey, SiteValidationRecord, UdmiEvent,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use udmi_normalize::{DEFAULT_VALIDATOR_ID, normalize};
use udmi_storage::{DeviceStore, SiteStore, StorageError, ValidationHistoryStore};
use udmi_telemetry::{
    record_conflict_retry, record_device_upsert, record_message_invalid, record_message_received,
    record_message_unhandled, record_persistence_failure, record_site_upsert,
    record_validation_record,
};

/// 处理时间来源。
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟。
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 处理错误。
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Invalid(#[from] InvalidMessage),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("conflict retries exhausted: {key} after {attempts} attempts")]
    ConflictRetriesExhausted { key: String, attempts: usize },
}

/// 处理结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// 未处理的分类，已记录告警并丢弃。
    Skipped,
    DeviceUpdated { key: DeviceKey, version: i64 },
    SiteUpdated { key: SiteKey, version: i64 },
}

/// 分发参数。
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// 站点级消息的保留设备标识。
    pub validator_id: String,
    pub max_conflict_retries: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            validator_id: DEFAULT_VALIDATOR_ID.to_string(),
            max_conflict_retries: 3,
        }
    }
}

struct DispatcherInner {
    devices: Arc<dyn DeviceStore>,
    sites: Arc<dyn SiteStore>,
    history: Arc<dyn ValidationHistoryStore>,
    clock: Arc<dyn Clock>,
    config: DispatcherConfig,
}

/// 消息分发入口。
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    pub fn new(
        devices: Arc<dyn DeviceStore>,
        sites: Arc<dyn SiteStore>,
        history: Arc<dyn ValidationHistoryStore>,
    ) -> Self {
        Self::with_config(
            devices,
            sites,
            history,
            Arc::new(SystemClock),
            DispatcherConfig::default(),
        )
    }

    pub fn with_config(
        devices: Arc<dyn DeviceStore>,
        sites: Arc<dyn SiteStore>,
        history: Arc<dyn ValidationHistoryStore>,
        clock: Arc<dyn Clock>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                devices,
                sites,
                history,
                clock,
                config,
            }),
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.inner.config
    }

    pub async fn handle(&self, message: &Message) -> Result<HandleOutcome, HandlerError> {
        record_message_received();
        let attributes = &message.attributes;
        debug!(
            target: "udmi.handler",
            device_id = %attributes.device_id,
            registry_id = %attributes.device_registry_id,
            sub_folder = ?attributes.sub_folder,
            sub_type = ?attributes.sub_type,
            "message_received"
        );

        let result = self.dispatch(message).await;
        match &result {
            Err(HandlerError::Invalid(err)) => {
                record_message_invalid();
                warn!(
                    target: "udmi.handler",
                    device_id = %attributes.device_id,
                    registry_id = %attributes.device_registry_id,
                    field = %err.field,
                    "message_invalid"
                );
            }
            Err(_) => record_persistence_failure(),
            Ok(_) => {}
        }
        result
    }

    async fn dispatch(&self, message: &Message) -> Result<HandleOutcome, HandlerError> {
        let Some(event) = normalize(message, &self.inner.config.validator_id)? else {
            record_message_unhandled();
            warn!(
                target: "udmi.handler",
                device_id = %message.attributes.device_id,
                sub_folder = ?message.attributes.sub_folder,
                sub_type = ?message.attributes.sub_type,
                "message_unhandled"
            );
            return Ok(HandleOutcome::Skipped);
        };

        // 同一条消息内的所有时间字段使用同一个处理时间
        let now = self.inner.clock.now();
        match event {
            UdmiEvent::Device(event) => self.handle_device(&event, now).await,
            UdmiEvent::Site(event) => self.handle_site(&event, now).await,
        }
    }

    async fn handle_device(
        &self,
        event: &DeviceEvent,
        now: DateTime<Utc>,
    ) -> Result<HandleOutcome, HandlerError> {
        // 文档构建失败时不写任何记录
        let upserted = match self.upsert_device(event, now).await {
            Err(HandlerError::Invalid(err)) => return Err(err.into()),
            other => other,
        };

        let recorded = match &event.payload {
            DevicePayload::Validation { payload, raw } => {
                let record = DeviceValidationRecord {
                    device_key: event.key.clone(),
                    timestamp: payload.timestamp().unwrap_or(now),
                    message: raw.clone(),
                };
                let result = self.inner.history.insert_device_validation(&record).await;
                if result.is_ok() {
                    record_validation_record();
                    info!(target: "udmi.handler", device = %event.key, "validation_recorded");
                }
                Some(result)
            }
            _ => None,
        };

        let version = upserted?;
        if let Some(recorded) = recorded {
            recorded?;
        }
        Ok(HandleOutcome::DeviceUpdated {
            key: event.key.clone(),
            version,
        })
    }

    async fn upsert_device(
        &self,
        event: &DeviceEvent,
        now: DateTime<Utc>,
    ) -> Result<i64, HandlerError> {
        let mut attempts = 0;
        loop {
            let (existing, expected_version) = match self.inner.devices.get_device(&event.key).await? {
                Some(current) => (Some(current.record), Some(current.version)),
                None => (None, None),
            };
            let device = build_device(event, existing, now)?;
            match self
                .inner
                .devices
                .upsert_device(&event.key, &device, expected_version)
                .await
            {
                Ok(version) => {
                    record_device_upsert();
                    info!(
                        target: "udmi.handler",
                        device = %event.key,
                        version,
                        points = device.points.as_ref().map(Vec::len).unwrap_or(0),
                        "device_upserted"
                    );
                    return Ok(version);
                }
                Err(err) if err.is_conflict() => {
                    attempts += 1;
                    if attempts > self.inner.config.max_conflict_retries {
                        return Err(HandlerError::ConflictRetriesExhausted {
                            key: event.key.to_string(),
                            attempts,
                        });
                    }
                    record_conflict_retry();
                    debug!(target: "udmi.handler", device = %event.key, attempts, "upsert_conflict_retry");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn handle_site(
        &self,
        event: &SiteEvent,
        now: DateTime<Utc>,
    ) -> Result<HandleOutcome, HandlerError> {
        let upserted = match self.upsert_site(event).await {
            Err(HandlerError::Invalid(err)) => return Err(err.into()),
            other => other,
        };

        let record = SiteValidationRecord {
            site_name: event.key.name.clone(),
            timestamp: event.payload.timestamp().unwrap_or(now),
            message: event.raw.clone(),
        };
        let recorded = self.inner.history.insert_site_validation(&record).await;
        if recorded.is_ok() {
            record_validation_record();
            info!(target: "udmi.handler", site = %event.key, "validation_recorded");
        }

        let version = upserted?;
        recorded?;
        Ok(HandleOutcome::SiteUpdated {
            key: event.key.clone(),
            version,
        })
    }

    async fn upsert_site(&self, event: &SiteEvent) -> Result<i64, HandlerError> {
        let mut attempts = 0;
        loop {
            let (existing, expected_version) = match self.inner.sites.get_site(&event.key).await? {
                Some(current) => (Some(current.record), Some(current.version)),
                None => (None, None),
            };
            let site = build_site(event, existing)?;
            match self
                .inner
                .sites
                .upsert_site(&event.key, &site, expected_version)
                .await
            {
                Ok(version) => {
                    record_site_upsert();
                    info!(
                        target: "udmi.handler",
                        site = %event.key,
                        version,
                        error_devices = site.error_devices.as_ref().map(Vec::len).unwrap_or(0),
                        "site_upserted"
                    );
                    return Ok(version);
                }
                Err(err) if err.is_conflict() => {
                    attempts += 1;
                    if attempts > self.inner.config.max_conflict_retries {
                        return Err(HandlerError::ConflictRetriesExhausted {
                            key: event.key.to_string(),
                            attempts,
                        });
                    }
                    record_conflict_retry();
                    debug!(target: "udmi.handler", site = %event.key, attempts, "upsert_conflict_retry");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
