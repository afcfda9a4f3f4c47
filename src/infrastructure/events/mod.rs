//! Events - 控制台事件广播

mod publisher;

pub use publisher::{ConsoleEvent, EventPublisher};
