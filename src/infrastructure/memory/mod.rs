//! Memory Layer - In-Memory State Management
//!
//! 检验界面状态、历史视图状态和摄像头会话的内存实现

mod history_store;
mod media_source;
mod screen_state;

pub use history_store::InMemoryHistoryStore;
pub use media_source::LiveMediaSource;
pub use screen_state::InMemoryScreenState;
