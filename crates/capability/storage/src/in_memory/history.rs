//! 校验历史内存存储实现
//!
//! 仅用于本地运行和测试，按插入顺序保存记录。

use crate::error::StorageError;
use crate::traits::ValidationHistoryStore;
use domain::{DeviceValidationRecord, SiteValidationRecord};
use std::sync::RwLock;

pub struct InMemoryValidationHistoryStore {
    devices: RwLock<Vec<DeviceValidationRecord>>,
    sites: RwLock<Vec<SiteValidationRecord>>,
}

impl InMemoryValidationHistoryStore {
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(Vec::new()),
            sites: RwLock::new(Vec::new()),
        }
    }

    /// 已写入的设备校验记录（用于测试）
    pub fn device_records(&self) -> Vec<DeviceValidationRecord> {
        self.devices
            .read()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    /// 已写入的站点校验记录（用于测试）
    pub fn site_records(&self) -> Vec<SiteValidationRecord> {
        self.sites
            .read()
            .map(|items| items.clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryValidationHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ValidationHistoryStore for InMemoryValidationHistoryStore {
    async fn insert_device_validation(
        &self,
        record: &DeviceValidationRecord,
    ) -> Result<(), StorageError> {
        let mut items = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        items.push(record.clone());
        Ok(())
    }

    async fn insert_site_validation(
        &self,
        record: &SiteValidationRecord,
    ) -> Result<(), StorageError> {
        let mut items = self
            .sites
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        items.push(record.clone());
        Ok(())
    }
}
