//! Frame Surface - 内存中的预览显示面
//!
//! 控制台没有真正的视频元素，显示面只记录绑定的流，
//! 快照时读取流的最新一帧。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::ports::{CaptureStream, FrameSize, PreviewSurface, SurfaceId, VideoFrame};

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

pub struct FrameSurface {
    id: SurfaceId,
    bound: Mutex<Option<Arc<dyn CaptureStream>>>,
    /// 绘制上下文是否可用
    drawable: bool,
}

impl FrameSurface {
    pub fn new() -> Self {
        Self::build(true)
    }

    /// 无法绘制快照的显示面
    pub fn without_context() -> Self {
        Self::build(false)
    }

    fn build(drawable: bool) -> Self {
        Self {
            id: SurfaceId(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed)),
            bound: Mutex::new(None),
            drawable,
        }
    }

    fn stream(&self) -> Option<Arc<dyn CaptureStream>> {
        self.bound.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for FrameSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewSurface for FrameSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn bind(&self, stream: Arc<dyn CaptureStream>) {
        tracing::debug!(surface = %self.id, device = %stream.device_label(), "Surface bound");
        *self.bound.lock().unwrap_or_else(|e| e.into_inner()) = Some(stream);
    }

    fn unbind(&self) {
        if self.bound.lock().unwrap_or_else(|e| e.into_inner()).take().is_some() {
            tracing::debug!(surface = %self.id, "Surface unbound");
        }
    }

    fn is_bound(&self) -> bool {
        self.bound.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    fn natural_size(&self) -> Option<FrameSize> {
        self.stream()?.native_size()
    }

    fn snapshot(&self) -> Option<VideoFrame> {
        if !self.drawable {
            return None;
        }
        self.stream()?.latest_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::CameraDevicePort;
    use crate::infrastructure::adapters::camera::SyntheticCameraDevice;

    #[tokio::test]
    async fn test_bind_and_snapshot() {
        let surface = FrameSurface::new();
        assert!(surface.natural_size().is_none());
        assert!(surface.snapshot().is_none());

        let stream = SyntheticCameraDevice::new(8, 6).open().await.unwrap();
        surface.bind(stream);
        assert!(surface.is_bound());
        assert_eq!(surface.natural_size(), Some(FrameSize::new(8, 6)));
        assert_eq!(surface.snapshot().unwrap().size, FrameSize::new(8, 6));

        surface.unbind();
        assert!(!surface.is_bound());
        assert!(surface.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_without_context_has_no_snapshot() {
        let surface = FrameSurface::without_context();
        surface.bind(SyntheticCameraDevice::new(8, 6).open().await.unwrap());
        assert!(surface.natural_size().is_some());
        assert!(surface.snapshot().is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(FrameSurface::new().id(), FrameSurface::new().id());
    }
}
