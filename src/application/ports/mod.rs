//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod camera_device;
mod history_service;
mod history_store;
mod inspection_service;
mod media_source;
mod preview_surface;
mod screen_state;

pub use camera_device::{CameraDevicePort, CameraError, CaptureStream, FrameSize, VideoFrame};
pub use history_service::{HistoryError, HistoryServicePort};
pub use history_store::HistoryStorePort;
pub use inspection_service::{InspectionError, InspectionServicePort};
pub use media_source::{CameraOpened, MediaSourcePort};
pub use preview_surface::{PreviewSurface, SurfaceId};
pub use screen_state::ScreenStatePort;
