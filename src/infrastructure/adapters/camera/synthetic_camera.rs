//! Synthetic Camera - 合成摄像头
//!
//! 不依赖任何硬件，按帧序号生成确定性的渐变画面。
//! 用于测试以及没有 CCTV 服务时的本地演示。

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::application::ports::{CameraDevicePort, CameraError, CaptureStream, FrameSize, VideoFrame};

/// 合成摄像头设备
pub struct SyntheticCameraDevice {
    size: FrameSize,
    opened: AtomicU64,
}

impl SyntheticCameraDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: FrameSize::new(width, height),
            opened: AtomicU64::new(0),
        }
    }

    /// 设备被打开的次数
    pub fn open_count(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraDevicePort for SyntheticCameraDevice {
    async fn open(&self) -> Result<Arc<dyn CaptureStream>, CameraError> {
        if self.size.pixel_count() == 0 {
            return Err(CameraError::DeviceUnavailable(format!(
                "invalid synthetic frame size {}",
                self.size
            )));
        }
        let n = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(size = %self.size, open_count = n, "Synthetic camera opened");
        Ok(Arc::new(SyntheticStream::new(self.size)))
    }
}

/// 合成采集流
pub struct SyntheticStream {
    size: FrameSize,
    sequence: AtomicU64,
    live: AtomicBool,
}

impl SyntheticStream {
    pub fn new(size: FrameSize) -> Self {
        Self {
            size,
            sequence: AtomicU64::new(0),
            live: AtomicBool::new(true),
        }
    }
}

impl CaptureStream for SyntheticStream {
    fn device_label(&self) -> String {
        format!("synthetic {}", self.size)
    }

    fn native_size(&self) -> Option<FrameSize> {
        self.is_live().then_some(self.size)
    }

    fn latest_frame(&self) -> Option<VideoFrame> {
        if !self.is_live() {
            return None;
        }
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let (w, h) = (self.size.width, self.size.height);
        let mut rgb = Vec::with_capacity(self.size.pixel_count() * 3);
        for y in 0..h {
            for x in 0..w {
                rgb.push((x * 255 / w.max(1)) as u8);
                rgb.push((y * 255 / h.max(1)) as u8);
                rgb.push((seq % 255) as u8);
            }
        }
        VideoFrame::new(self.size, rgb, seq)
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            tracing::debug!(size = %self.size, "Synthetic camera stopped");
        }
    }
}

/// 总是打开失败的设备（权限被拒绝、设备不存在）
pub struct FailingCameraDevice {
    error: CameraError,
}

impl FailingCameraDevice {
    pub fn new(error: CameraError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl CameraDevicePort for FailingCameraDevice {
    async fn open(&self) -> Result<Arc<dyn CaptureStream>, CameraError> {
        Err(self.error.clone())
    }
}
