//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Inspection Context: 图像提交、检验请求状态机、检验结果
//! - History Context: 历史记录筛选与明细展开

pub mod history;
pub mod inspection;

// 共享的时间戳解析与显示
mod timestamp;

pub use timestamp::{DisplayClock, DisplayClockError, Timestamp, MAX_OFFSET_MINUTES};
