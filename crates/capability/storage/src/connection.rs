//! Postgres 连接池
//!
//! 事件处理服务启动时调用一次 [`connect_pool`]，得到的 `PgPool` 克隆后注入
//! 设备、站点与校验历史三个存储，所有消息共用同一组连接。

use crate::error::StorageError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// 单个处理进程持有的最大连接数。
const MAX_CONNECTIONS: u32 = 8;

/// 按 `UDMI_DATABASE_URL` 建立连接池；地址不可达时返回 `StorageError::Backend`。
pub async fn connect_pool(database_url: &str) -> Result<PgPool, StorageError> {
    Ok(PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await?)
}
