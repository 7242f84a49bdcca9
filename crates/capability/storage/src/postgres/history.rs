//! Postgres 校验历史存储实现（只 insert）

use crate::error::StorageError;
use crate::traits::ValidationHistoryStore;
use domain::{DeviceValidationRecord, SiteValidationRecord};
use sqlx::PgPool;

pub struct PgValidationHistoryStore {
    pub pool: PgPool,
}

impl PgValidationHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ValidationHistoryStore for PgValidationHistoryStore {
    async fn insert_device_validation(
        &self,
        record: &DeviceValidationRecord,
    ) -> Result<(), StorageError> {
        let message = serde_json::to_string(&record.message)?;
        sqlx::query(
            "insert into udmi_device_validations (device_name, device_site, ts, message) \
             values ($1, $2, $3, $4)",
        )
        .bind(&record.device_key.name)
        .bind(&record.device_key.site)
        .bind(record.timestamp)
        .bind(message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_site_validation(
        &self,
        record: &SiteValidationRecord,
    ) -> Result<(), StorageError> {
        let message = serde_json::to_string(&record.message)?;
        sqlx::query(
            "insert into udmi_site_validations (site_name, ts, message) values ($1, $2, $3)",
        )
        .bind(&record.site_name)
        .bind(record.timestamp)
        .bind(message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
