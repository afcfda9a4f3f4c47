//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：检验提交与摄像头会话

mod camera_commands;
mod inspection_commands;

pub mod handlers;

pub use camera_commands::*;
pub use inspection_commands::*;
