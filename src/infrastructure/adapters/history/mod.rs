//! History Adapter - 历史记录服务客户端实现

mod dto;
mod fake_history_client;
mod http_history_client;

pub use dto::{parse_records, HistoryItemDto, HistoryRecordDto};
pub use fake_history_client::FakeHistoryClient;
pub use http_history_client::*;
