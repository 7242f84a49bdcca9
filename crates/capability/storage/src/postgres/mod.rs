//! # PostgreSQL 存储实现模块
//!
//! 关系型后端，满足与文档型后端相同的持久化契约。
//!
//! ## 包含的实现
//!
//! - **DeviceStore** (`device.rs`)：设备文档，主键 (key_name, key_site)
//! - **SiteStore** (`site.rs`)：站点文档，主键 name
//! - **ValidationHistoryStore** (`history.rs`)：设备/站点校验历史（只追加）
//!
//! ## 数据库模式
//!
//! 由 [`schema::ensure_schema`] 幂等创建：
//!
//! - `udmi_devices`：设备文档列 + `points`/`tags`/`validation` JSON 文本列 + `version`
//! - `udmi_sites`：`validation`/`error_devices` JSON 文本列 + `version`
//! - `udmi_device_validations`：(device_site, device_name, ts) 索引
//! - `udmi_site_validations`：(site_name, ts) 索引
//!
//! ## 并发控制
//!
//! upsert 为条件写入：
//! - 新建：`insert ... on conflict do nothing returning version`
//! - 更新：`update ... where version = $expected returning version`
//!
//! 未返回行即为版本冲突（`StorageError::Conflict`），由调用方重新读取并重新合并。
//!
//! ## 连接池
//!
//! 连接池由 `connection::connect_pool` 在进程启动时建立一次，
//! 通过构造函数注入各存储实例共享。

pub mod codec;
pub mod device;
pub mod history;
pub mod schema;
pub mod site;

pub use device::*;
pub use history::*;
pub use schema::ensure_schema;
pub use site::*;
