//! Camera Adapter - 视频采集设备与预览显示面

mod frame_surface;
mod mjpeg;
mod mjpeg_camera;
mod synthetic_camera;

pub use frame_surface::FrameSurface;
pub use mjpeg::MjpegSplitter;
pub use mjpeg_camera::{FrameStore, MjpegCameraConfig, MjpegCameraDevice, MjpegStream};
pub use synthetic_camera::{FailingCameraDevice, SyntheticCameraDevice, SyntheticStream};
