//! 内存存储实现模块
//!
//! 仅用于本地运行和测试。
//!
//! 包含以下实现：
//! - DeviceStore: InMemoryDeviceStore
//! - SiteStore: InMemorySiteStore
//! - ValidationHistoryStore: InMemoryValidationHistoryStore

pub mod device;
pub mod history;
pub mod site;

pub use device::*;
pub use history::*;
pub use site::*;
