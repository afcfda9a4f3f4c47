//! Command Handlers - 命令处理器

mod camera_handlers;
mod inspection_handlers;

pub use camera_handlers::{CloseCameraHandler, OpenCameraHandler};
pub use inspection_handlers::{StartedSubmission, SubmitInspectionHandler};
