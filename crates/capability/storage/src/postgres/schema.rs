//! 表结构初始化（幂等）。

use crate::error::StorageError;
use sqlx::PgPool;

const STATEMENTS: &[&str] = &[
    "create table if not exists udmi_devices ( \
       key_name text not null, \
       key_site text not null, \
       name text not null, \
       site text not null, \
       id text, \
       make text, \
       model text, \
       section text, \
       last_payload timestamptz, \
       operational boolean, \
       serial_number text, \
       firmware text, \
       tags text, \
       points text, \
       validation text, \
       last_state_updated timestamptz, \
       last_state_saved timestamptz, \
       last_telemetry_updated timestamptz, \
       last_telemetry_saved timestamptz, \
       version bigint not null, \
       primary key (key_name, key_site))",
    "create table if not exists udmi_sites ( \
       name text primary key, \
       validation text, \
       error_devices text, \
       version bigint not null)",
    "create table if not exists udmi_device_validations ( \
       id bigserial primary key, \
       device_name text not null, \
       device_site text not null, \
       ts timestamptz not null, \
       message text not null)",
    "create index if not exists idx_udmi_device_validations_key \
       on udmi_device_validations (device_site, device_name, ts)",
    "create table if not exists udmi_site_validations ( \
       id bigserial primary key, \
       site_name text not null, \
       ts timestamptz not null, \
       message text not null)",
    "create index if not exists idx_udmi_site_validations_site \
       on udmi_site_validations (site_name, ts)",
];

/// 创建所需表与索引（已存在则跳过）。
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StorageError> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
