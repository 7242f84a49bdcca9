//! 存储模型
//!
//! - Versioned：带版本号的文档（乐观并发控制）
//! - next_version：条件写入的版本校验

use crate::error::StorageError;

/// 带版本号的文档。版本从 1 开始，每次写入加 1。
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub record: T,
    pub version: i64,
}

impl<T> Versioned<T> {
    pub fn new(record: T, version: i64) -> Self {
        Self { record, version }
    }
}

/// 校验当前版本与期望版本一致，返回写入后的新版本号。
///
/// `expected = None` 表示“仅在文档不存在时创建”。
pub fn next_version(
    key: impl std::fmt::Display,
    current: Option<i64>,
    expected: Option<i64>,
) -> Result<i64, StorageError> {
    if current != expected {
        return Err(StorageError::conflict(key));
    }
    Ok(current.unwrap_or(0) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_version_increments_on_match() {
        assert_eq!(next_version("k", None, None).expect("create"), 1);
        assert_eq!(next_version("k", Some(3), Some(3)).expect("update"), 4);
    }

    #[test]
    fn next_version_rejects_mismatch() {
        assert!(next_version("k", Some(1), None).unwrap_err().is_conflict());
        assert!(next_version("k", None, Some(1)).unwrap_err().is_conflict());
        assert!(next_version("k", Some(2), Some(1)).unwrap_err().is_conflict());
    }
}
