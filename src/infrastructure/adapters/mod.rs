//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod camera;
pub mod history;
pub mod inspection;

pub use camera::*;
pub use history::*;
pub use inspection::*;
