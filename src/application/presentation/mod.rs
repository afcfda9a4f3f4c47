//! Presentation Models - 展示模型
//!
//! 从领域状态派生出的只读视图，渲染层只读取这里的字符串。

mod history_table;
mod result_view;

pub use history_table::*;
pub use result_view::*;
