//! Camera Device Port - 视频采集设备抽象
//!
//! 设备打开后返回一条采集流；流只持有最新一帧，
//! 停止后不再产生新帧。

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// 摄像头错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Camera stream ended")]
    StreamEnded,

    #[error("Frame encoding failed: {0}")]
    Encode(String),
}

/// 帧尺寸（原生分辨率）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 一帧 RGB8 图像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub size: FrameSize,
    /// 行优先，每像素 3 字节
    pub rgb: Vec<u8>,
    pub sequence: u64,
}

impl VideoFrame {
    /// 像素数据长度与尺寸一致时才构造
    pub fn new(size: FrameSize, rgb: Vec<u8>, sequence: u64) -> Option<Self> {
        (rgb.len() == size.pixel_count() * 3).then_some(Self {
            size,
            rgb,
            sequence,
        })
    }
}

/// 采集流
pub trait CaptureStream: Send + Sync {
    /// 设备名称（日志与界面显示）
    fn device_label(&self) -> String;

    /// 原生分辨率；第一帧到达之前未知
    fn native_size(&self) -> Option<FrameSize>;

    /// 最新一帧
    fn latest_frame(&self) -> Option<VideoFrame>;

    /// 是否仍在采集
    fn is_live(&self) -> bool;

    /// 停止所有采集轨道并释放设备，可重复调用
    fn stop(&self);
}

/// Camera Device Port
#[async_trait]
pub trait CameraDevicePort: Send + Sync {
    /// 请求独占访问视频设备（仅视频，无音频）
    async fn open(&self) -> Result<Arc<dyn CaptureStream>, CameraError>;
}
