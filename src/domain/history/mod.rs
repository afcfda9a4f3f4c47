//! History Context - 历史记录限界上下文
//!
//! 职责:
//! - 范围/日期筛选与查询参数
//! - 历史记录（整体替换）
//! - 单条展开的明细视图状态

mod entities;
mod errors;
mod value_objects;
mod view_state;

pub use entities::{HistoryItem, HistoryRecord};
pub use errors::HistoryDomainError;
pub use value_objects::{
    parse_date, DateWindow, ExpansionState, HistoryFilter, HistoryQuery, HistoryRange, RecordId,
    DATE_FORMAT,
};
pub use view_state::{ApplyOutcome, HistoryViewState, LoadStatus, QueryTicket};
