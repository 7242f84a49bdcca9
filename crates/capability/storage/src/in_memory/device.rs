//! 设备内存存储实现
//!
//! 仅用于本地运行和测试。
//!
//! 功能：
//! - 按 DeviceKey 读取/条件写入完整文档
//! - 写锁内完成版本校验，保证比较与写入原子

use crate::error::StorageError;
use crate::models::{Versioned, next_version};
use crate::traits::DeviceStore;
use domain::{Device, DeviceKey};
use std::collections::HashMap;
use std::sync::RwLock;

/// 设备内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryDeviceStore {
    devices: RwLock<HashMap<DeviceKey, Versioned<Device>>>,
}

impl InMemoryDeviceStore {
    /// 创建新的设备存储
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }

    /// 设备数量（用于测试）
    pub fn len(&self) -> usize {
        self.devices.read().map(|map| map.len()).unwrap_or(0)
    }
}

impl Default for InMemoryDeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn get_device(
        &self,
        key: &DeviceKey,
    ) -> Result<Option<Versioned<Device>>, StorageError> {
        let map = self
            .devices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(key).cloned())
    }

    async fn upsert_device(
        &self,
        key: &DeviceKey,
        device: &Device,
        expected_version: Option<i64>,
    ) -> Result<i64, StorageError> {
        let mut map = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let current = map.get(key).map(|item| item.version);
        let version = next_version(key, current, expected_version)?;
        map.insert(key.clone(), Versioned::new(device.clone(), version));
        Ok(version)
    }
}
