//! Postgres 设备存储实现
//!
//! 通过 SQL 实现设备文档的读取与条件写入。
//!
//! 设计要点：
//! - 主键列 (key_name, key_site) 与文档列分开，文档整体覆盖
//! - points / tags / validation 以 JSON 文本列保存
//! - 新建用 `on conflict do nothing`，更新用 `where version = $n`，
//!   未命中行即视为版本冲突
//! - 使用参数化 SQL 防止注入

use crate::error::StorageError;
use crate::models::Versioned;
use crate::postgres::codec::{decode_json, encode_json};
use crate::traits::DeviceStore;
use domain::{Device, DeviceKey};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};

const DEVICE_COLUMNS: &str = "name, site, id, make, model, section, last_payload, operational, \
     serial_number, firmware, tags, points, validation, last_state_updated, last_state_saved, \
     last_telemetry_updated, last_telemetry_saved, version";

pub struct PgDeviceStore {
    pub pool: PgPool,
}

impl PgDeviceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 预先编码的 JSON 文本列。
struct EncodedColumns {
    tags: Option<String>,
    points: Option<String>,
    validation: Option<String>,
}

impl EncodedColumns {
    fn from_device(device: &Device) -> Result<Self, StorageError> {
        Ok(Self {
            tags: encode_json(device.tags.as_ref())?,
            points: encode_json(device.points.as_ref())?,
            validation: encode_json(device.validation.as_ref())?,
        })
    }
}

/// 依次绑定 $3..$19 的文档列。
fn bind_document<'q>(
    query: Query<'q, Postgres, PgArguments>,
    device: &'q Device,
    encoded: EncodedColumns,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(&device.name)
        .bind(&device.site)
        .bind(&device.id)
        .bind(&device.make)
        .bind(&device.model)
        .bind(&device.section)
        .bind(device.last_payload)
        .bind(device.operational)
        .bind(&device.serial_number)
        .bind(&device.firmware)
        .bind(encoded.tags)
        .bind(encoded.points)
        .bind(encoded.validation)
        .bind(device.last_state_updated)
        .bind(device.last_state_saved)
        .bind(device.last_telemetry_updated)
        .bind(device.last_telemetry_saved)
}

fn device_from_row(row: &PgRow) -> Result<Versioned<Device>, StorageError> {
    let device = Device {
        name: row.try_get("name")?,
        site: row.try_get("site")?,
        id: row.try_get("id")?,
        make: row.try_get("make")?,
        model: row.try_get("model")?,
        section: row.try_get("section")?,
        last_payload: row.try_get("last_payload")?,
        operational: row.try_get("operational")?,
        serial_number: row.try_get("serial_number")?,
        firmware: row.try_get("firmware")?,
        tags: decode_json(row.try_get("tags")?)?,
        points: decode_json(row.try_get("points")?)?,
        validation: decode_json(row.try_get("validation")?)?,
        last_state_updated: row.try_get("last_state_updated")?,
        last_state_saved: row.try_get("last_state_saved")?,
        last_telemetry_updated: row.try_get("last_telemetry_updated")?,
        last_telemetry_saved: row.try_get("last_telemetry_saved")?,
    };
    Ok(Versioned::new(device, row.try_get("version")?))
}

#[async_trait::async_trait]
impl DeviceStore for PgDeviceStore {
    async fn get_device(
        &self,
        key: &DeviceKey,
    ) -> Result<Option<Versioned<Device>>, StorageError> {
        let sql = format!(
            "select {} from udmi_devices where key_name = $1 and key_site = $2",
            DEVICE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&key.name)
            .bind(&key.site)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(device_from_row(&row)?))
    }

    async fn upsert_device(
        &self,
        key: &DeviceKey,
        device: &Device,
        expected_version: Option<i64>,
    ) -> Result<i64, StorageError> {
        let encoded = EncodedColumns::from_device(device)?;
        let row = match expected_version {
            None => {
                let query = sqlx::query(
                    "insert into udmi_devices (key_name, key_site, name, site, id, make, model, \
                     section, last_payload, operational, serial_number, firmware, tags, points, \
                     validation, last_state_updated, last_state_saved, last_telemetry_updated, \
                     last_telemetry_saved, version) \
                     values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                     $16, $17, $18, $19, 1) \
                     on conflict (key_name, key_site) do nothing \
                     returning version",
                )
                .bind(&key.name)
                .bind(&key.site);
                bind_document(query, device, encoded)
                    .fetch_optional(&self.pool)
                    .await?
            }
            Some(expected) => {
                let query = sqlx::query(
                    "update udmi_devices set \
                     name = $3, site = $4, id = $5, make = $6, model = $7, section = $8, \
                     last_payload = $9, operational = $10, serial_number = $11, firmware = $12, \
                     tags = $13, points = $14, validation = $15, last_state_updated = $16, \
                     last_state_saved = $17, last_telemetry_updated = $18, \
                     last_telemetry_saved = $19, version = version + 1 \
                     where key_name = $1 and key_site = $2 and version = $20 \
                     returning version",
                )
                .bind(&key.name)
                .bind(&key.site);
                bind_document(query, device, encoded)
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
