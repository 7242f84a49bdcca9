//! 存储层错误类型
//!
//! 定义统一的存储错误类型，用于封装底层错误：
//! - 版本冲突（条件写入失败）
//! - SQL / Redis 执行错误、连接错误
//! - 文档序列化错误

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 条件写入时版本号与读取时不一致（并发写入）。
    #[error("version conflict: {0}")]
    Conflict(String),
    #[error("{0}")]
    Backend(String),
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn conflict(key: impl std::fmt::Display) -> Self {
        Self::Conflict(key.to_string())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("document codec: {}", err))
    }
}
