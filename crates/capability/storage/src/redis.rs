//! Redis 文档存储实现
//!
//! 文档型后端：每个文档保存为 hash `{doc, version}`，`doc` 为完整 JSON。
//!
//! 键格式：
//! - 设备：`udmi:site:{site}:device:{name}`
//! - 站点：`udmi:site:{name}`
//! - 校验历史（list，RPUSH 追加）：`{文档键}:validations`
//!
//! 条件写入通过 Lua 脚本在服务端原子完成版本比较与写入。

use crate::error::StorageError;
use crate::models::Versioned;
use crate::traits::{DeviceStore, SiteStore, ValidationHistoryStore};
use domain::{
    Device, DeviceKey, DeviceValidationRecord, Site, SiteKey, SiteValidationRecord,
};
use redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// ARGV[1]：期望版本（空串表示仅在不存在时创建）；ARGV[2]：文档 JSON。
/// 返回新版本号，冲突时返回 -1。
const COMPARE_AND_SET: &str = r"
local current = redis.call('HGET', KEYS[1], 'version')
if ARGV[1] == '' then
  if current then
    return -1
  end
elseif current ~= ARGV[1] then
  return -1
end
local next = (tonumber(current) or 0) + 1
redis.call('HSET', KEYS[1], 'doc', ARGV[2], 'version', next)
return next
";

fn device_key(key: &DeviceKey) -> String {
    format!("udmi:site:{}:device:{}", key.site, key.name)
}

fn site_key(key: &SiteKey) -> String {
    format!("udmi:site:{}", key.name)
}

fn history_key(document_key: &str) -> String {
    format!("{}:validations", document_key)
}

/// Redis 文档存储（设备、站点、校验历史共用一条多路复用连接）。
///
/// 连接在 [`RedisDocumentStore::connect`] 中建立一次，每次操作克隆句柄复用。
pub struct RedisDocumentStore {
    connection: redis::aio::MultiplexedConnection,
    compare_and_set: redis::Script,
}

impl RedisDocumentStore {
    pub fn new(connection: redis::aio::MultiplexedConnection) -> Self {
        Self {
            connection,
            compare_and_set: redis::Script::new(COMPARE_AND_SET),
        }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(redis_url)?;
        let connection = client.get_multiplexed_tokio_connection().await?;
        Ok(Self::new(connection))
    }

    fn connection(&self) -> redis::aio::MultiplexedConnection {
        self.connection.clone()
    }

    async fn get_document<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<Versioned<T>>, StorageError> {
        let mut connection = self.connection();
        let (doc, version): (Option<String>, Option<i64>) = redis::cmd("HMGET")
            .arg(key)
            .arg("doc")
            .arg("version")
            .query_async(&mut connection)
            .await?;
        let (Some(doc), Some(version)) = (doc, version) else {
            return Ok(None);
        };
        let record: T = serde_json::from_str(&doc)?;
        Ok(Some(Versioned::new(record, version)))
    }

    async fn put_document<T: Serialize>(
        &self,
        key: &str,
        record: &T,
        expected_version: Option<i64>,
    ) -> Result<i64, StorageError> {
        let mut connection = self.connection();
        let doc = serde_json::to_string(record)?;
        let expected = expected_version
            .map(|version| version.to_string())
            .unwrap_or_default();
        let version: i64 = self
            .compare_and_set
            .key(key)
            .arg(expected)
            .arg(doc)
            .invoke_async(&mut connection)
            .await?;
        if version < 0 {
            return Err(StorageError::conflict(key));
        }
        Ok(version)
    }

    async fn append<T: Serialize>(&self, key: String, record: &T) -> Result<(), StorageError> {
        let mut connection = self.connection();
        let data = serde_json::to_string(record)?;
        connection.rpush::<_, _, ()>(key, data).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl DeviceStore for RedisDocumentStore {
    async fn get_device(
        &self,
        key: &DeviceKey,
    ) -> Result<Option<Versioned<Device>>, StorageError> {
        self.get_document(&device_key(key)).await
    }

    async fn upsert_device(
        &self,
        key: &DeviceKey,
        device: &Device,
        expected_version: Option<i64>,
    ) -> Result<i64, StorageError> {
        self.put_document(&device_key(key), device, expected_version)
            .await
    }
}

#[async_trait::async_trait]
impl SiteStore for RedisDocumentStore {
    async fn get_site(&self, key: &SiteKey) -> Result<Option<Versioned<Site>>, StorageError> {
        self.get_document(&site_key(key)).await
    }

    async fn upsert_site(
        &self,
        key: &SiteKey,
        site: &Site,
        expected_version: Option<i64>,
    ) -> Result<i64, StorageError> {
        self.put_document(&site_key(key), site, expected_version)
            .await
    }
}

#[async_trait::async_trait]
impl ValidationHistoryStore for RedisDocumentStore {
    async fn insert_device_validation(
        &self,
        record: &DeviceValidationRecord,
    ) -> Result<(), StorageError> {
        self.append(history_key(&device_key(&record.device_key)), record)
            .await
    }

    async fn insert_site_validation(
        &self,
        record: &SiteValidationRecord,
    ) -> Result<(), StorageError> {
        let key = SiteKey {
            name: record.site_name.clone(),
        };
        self.append(history_key(&site_key(&key)), record).await
    }
}
