//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：历史记录

mod history_queries;

pub mod handlers;

pub use history_queries::*;
