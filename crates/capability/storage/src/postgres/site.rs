//! Postgres 站点存储实现
//!
//! validation 与 error_devices 以 JSON 文本列保存，读取时解析回来。

use crate::error::StorageError;
use crate::models::Versioned;
use crate::postgres::codec::{decode_json, encode_json};
use crate::traits::SiteStore;
use domain::{Site, SiteKey};
use sqlx::{PgPool, Row};

pub struct PgSiteStore {
    pub pool: PgPool,
}

impl PgSiteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SiteStore for PgSiteStore {
    async fn get_site(&self, key: &SiteKey) -> Result<Option<Versioned<Site>>, StorageError> {
        let row = sqlx::query(
            "select name, validation, error_devices, version from udmi_sites where name = $1",
        )
        .bind(&key.name)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let site = Site {
            name: row.try_get("name")?,
            validation: decode_json(row.try_get("validation")?)?,
            error_devices: decode_json(row.try_get("error_devices")?)?,
        };
        Ok(Some(Versioned::new(site, row.try_get("version")?)))
    }

    async fn upsert_site(
        &self,
        key: &SiteKey,
        site: &Site,
        expected_version: Option<i64>,
    ) -> Result<i64, StorageError> {
        let validation = encode_json(site.validation.as_ref())?;
        let error_devices = encode_json(site.error_devices.as_ref())?;
        let row = match expected_version {
            None => {
                sqlx::query(
                    "insert into udmi_sites (name, validation, error_devices, version) \
                     values ($1, $2, $3, 1) \
                     on conflict (name) do nothing \
                     returning version",
                )
                .bind(&key.name)
                .bind(validation)
                .bind(error_devices)
                .fetch_optional(&self.pool)
                .await?
            }
            Some(expected) => {
                sqlx::query(
                    "update udmi_sites set validation = $2, error_devices = $3, \
                     version = version + 1 \
                     where name = $1 and version = $4 \
                     returning version",
                )
                .bind(&key.name)
                .bind(validation)
                .bind(error_devices)
                .bind(expected)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        let Some(row) = row else {
            return Err(StorageError::conflict(key));
        };
        Ok(row.try_get("version")?)
    }
}
