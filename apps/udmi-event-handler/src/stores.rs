//! 按配置装配存储后端。
//!
//! PostgreSQL 连接池与 Redis 客户端在启动时创建一次，注入各存储实现。

use std::sync::Arc;
use tracing::info;
use udmi_config::{AppConfig, StoreBackend};
use udmi_storage::{
    DeviceStore, InMemoryDeviceStore, InMemorySiteStore, InMemoryValidationHistoryStore,
    PgDeviceStore, PgSiteStore, PgValidationHistoryStore, RedisDocumentStore, SiteStore,
    StorageError, ValidationHistoryStore, connect_pool, ensure_schema,
};

/// 分发器依赖的三类存储。
#[derive(Clone)]
pub struct Stores {
    pub devices: Arc<dyn DeviceStore>,
    pub sites: Arc<dyn SiteStore>,
    pub history: Arc<dyn ValidationHistoryStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            devices: Arc::new(InMemoryDeviceStore::new()),
            sites: Arc::new(InMemorySiteStore::new()),
            history: Arc::new(InMemoryValidationHistoryStore::new()),
        }
    }
}

pub async fn build_stores(config: &AppConfig) -> Result<Stores, StorageError> {
    let stores = match config.store {
        StoreBackend::Memory => Stores::in_memory(),
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| StorageError::new("UDMI_DATABASE_URL not set"))?;
            let pool = connect_pool(database_url).await?;
            ensure_schema(&pool).await?;
            Stores {
                devices: Arc::new(PgDeviceStore::new(pool.clone())),
                sites: Arc::new(PgSiteStore::new(pool.clone())),
                history: Arc::new(PgValidationHistoryStore::new(pool)),
            }
        }
        StoreBackend::Redis => {
            let store = Arc::new(RedisDocumentStore::connect(&config.redis_url).await?);
            Stores {
                devices: store.clone(),
                sites: store.clone(),
                history: store,
            }
        }
    };
    info!(target: "udmi.storage", backend = %config.store, "store_ready");
    Ok(stores)
}
