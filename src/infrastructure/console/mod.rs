//! Console - 终端界面
//!
//! - state: 端口实现与 Handlers 的组装
//! - render: 展示模型 -> 文本
//! - repl: 交互式命令循环

mod render;
mod repl;
mod state;

pub use render::{render_history, render_notice, render_screen};
pub use repl::{parse_command, stdout_output, ConsoleCommand, ConsoleOutput, Repl, HELP_TEXT};
pub use state::{ConsoleDeps, ConsoleState};
