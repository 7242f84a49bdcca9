//! UDMI 文档归并：点位合并、设备/站点文档构建与消息分发。
//!
//! 构建函数是纯函数（输入：事件 + 已有文档 + 处理时间），
//! 所有存储访问集中在 [`Dispatcher`]。

pub mod device;
pub mod dispatch;
pub mod points;
pub mod site;

pub use device::build_device;
pub use dispatch::{
    Clock, Dispatcher, DispatcherConfig, HandleOutcome, HandlerError, SystemClock,
};
pub use points::merge_points;
pub use site::build_site;
