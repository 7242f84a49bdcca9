//! 存储接口 Trait 定义
//!
//! 定义键控文档存储的异步接口（持久化适配器）：
//! - DeviceStore：设备文档 get / upsert
//! - SiteStore：站点文档 get / upsert
//! - ValidationHistoryStore：校验历史 insert（只追加）
//!
//! 设计原则：
//! - upsert 始终写入完整文档，而非局部更新表达式
//! - upsert 以读取时的版本号为条件，不一致时返回 `StorageError::Conflict`
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::Versioned;
use async_trait::async_trait;
use domain::{Device, DeviceKey, DeviceValidationRecord, Site, SiteKey, SiteValidationRecord};

/// 设备文档存储接口
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// 按主键读取设备文档
    async fn get_device(&self, key: &DeviceKey)
    -> Result<Option<Versioned<Device>>, StorageError>;

    /// 条件写入完整设备文档，返回新版本号
    async fn upsert_device(
        &self,
        key: &DeviceKey,
        device: &Device,
        expected_version: Option<i64>,
    ) -> Result<i64, StorageError>;
}

/// 站点文档存储接口
#[async_trait]
pub trait SiteStore: Send + Sync {
    async fn get_site(&self, key: &SiteKey) -> Result<Option<Versioned<Site>>, StorageError>;

    async fn upsert_site(
        &self,
        key: &SiteKey,
        site: &Site,
        expected_version: Option<i64>,
    ) -> Result<i64, StorageError>;
}

/// 校验历史存储接口（时序，只追加）
#[async_trait]
pub trait ValidationHistoryStore: Send + Sync {
    async fn insert_device_validation(
        &self,
        record: &DeviceValidationRecord,
    ) -> Result<(), StorageError>;

    async fn insert_site_validation(&self, record: &SiteValidationRecord)
    -> Result<(), StorageError>;
}
