//! Live Media Source - 摄像头会话与抓拍
//!
//! 同一时间最多一个会话。会话被丢弃时停止采集流，
//! 所以无论正常关闭还是整个来源被销毁，设备都会释放。

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::application::ports::{
    CameraDevicePort, CameraError, CameraOpened, CaptureStream, MediaSourcePort, PreviewSurface,
};
use crate::domain::inspection::ImagePayload;

/// 打开的摄像头会话
struct CameraSession {
    stream: Arc<dyn CaptureStream>,
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stream.stop();
    }
}

#[derive(Default)]
struct MediaInner {
    session: Option<CameraSession>,
    surface: Option<Arc<dyn PreviewSurface>>,
}

/// 基于真实（或合成）采集设备的图像来源
pub struct LiveMediaSource {
    device: Arc<dyn CameraDevicePort>,
    jpeg_quality: u8,
    inner: Mutex<MediaInner>,
    /// 串行化打开过程，避免并发打开两个会话
    opening: tokio::sync::Mutex<()>,
}

impl LiveMediaSource {
    pub fn new(device: Arc<dyn CameraDevicePort>, jpeg_quality: u8) -> Self {
        Self {
            device,
            jpeg_quality: jpeg_quality.clamp(1, 100),
            inner: Mutex::new(MediaInner::default()),
            opening: tokio::sync::Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MediaInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn encode(&self, width: u32, height: u32, rgb: Vec<u8>) -> Option<Vec<u8>> {
        let image = RgbImage::from_raw(width, height, rgb)?;
        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality);
        if let Err(e) = encoder.encode_image(&image) {
            tracing::debug!(error = %e, "JPEG encoding failed");
            return None;
        }
        Some(buffer)
    }
}

#[async_trait]
impl MediaSourcePort for LiveMediaSource {
    async fn open_camera(&self) -> Result<CameraOpened, CameraError> {
        let _opening = self.opening.lock().await;

        {
            let mut inner = self.lock();
            match &inner.session {
                Some(session) if session.stream.is_live() => return Ok(CameraOpened::AlreadyOpen),
                Some(_) => {
                    // 流已自行结束，当作已关闭
                    tracing::info!("Discarding ended camera session");
                    if let Some(surface) = &inner.surface {
                        surface.unbind();
                    }
                    inner.session = None;
                }
                None => {}
            }
        }

        let stream = self.device.open().await?;
        let device_label = stream.device_label();

        let mut inner = self.lock();
        if let Some(surface) = &inner.surface {
            surface.bind(stream.clone());
        }
        inner.session = Some(CameraSession { stream });

        tracing::info!(device = %device_label, "Camera session opened");
        Ok(CameraOpened::Opened { device_label })
    }

    fn close_camera(&self) -> bool {
        let mut inner = self.lock();
        let Some(session) = inner.session.take() else {
            return false;
        };
        if let Some(surface) = &inner.surface {
            surface.unbind();
        }
        drop(session);
        tracing::info!("Camera session closed");
        true
    }

    fn attach_surface(&self, surface: Arc<dyn PreviewSurface>) {
        let mut inner = self.lock();
        if let Some(previous) = inner.surface.take() {
            if previous.id() != surface.id() {
                previous.unbind();
                tracing::debug!(old = %previous.id(), new = %surface.id(), "Preview surface replaced");
            }
        }
        if let Some(session) = &inner.session {
            if !surface.is_bound() {
                surface.bind(session.stream.clone());
            }
        }
        inner.surface = Some(surface);
    }

    fn detach_surface(&self) {
        if let Some(surface) = self.lock().surface.take() {
            surface.unbind();
        }
    }

    fn capture_frame(&self) -> Option<ImagePayload> {
        let surface = {
            let inner = self.lock();
            inner.session.as_ref()?;
            inner.surface.clone()?
        };
        let size = surface.natural_size()?;
        let frame = surface.snapshot()?;
        if frame.size != size {
            tracing::debug!(expected = %size, actual = %frame.size, "Snapshot size changed");
        }

        let jpeg = self.encode(frame.size.width, frame.size.height, frame.rgb)?;
        ImagePayload::from_capture(jpeg, frame.size.width, frame.size.height).ok()
    }

    fn is_open(&self) -> bool {
        self.lock().session.is_some()
    }
}
