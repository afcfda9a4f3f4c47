//! MJPEG Camera - 通过检验服务的 CCTV 端点读取实时画面
//!
//! GET {base}/cctv?t=<millis>
//! Content-Type: multipart/x-mixed-replace; boundary=frame
//!
//! 后台任务持续读取流并只保留最新一张 JPEG，
//! 需要画面时再解码成 RGB。

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::mjpeg::MjpegSplitter;
use crate::application::ports::{CameraDevicePort, CameraError, CaptureStream, FrameSize, VideoFrame};

/// MJPEG 摄像头配置
#[derive(Debug, Clone)]
pub struct MjpegCameraConfig {
    /// CCTV 服务基础 URL
    pub base_url: String,
    /// 建立连接的超时时间（秒）
    pub connect_timeout_secs: u64,
}

impl Default for MjpegCameraConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

impl MjpegCameraConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }
}

/// MJPEG 摄像头设备
pub struct MjpegCameraDevice {
    client: Client,
    config: MjpegCameraConfig,
}

impl MjpegCameraDevice {
    pub fn new(config: MjpegCameraConfig) -> Result<Self, CameraError> {
        // 流式响应不设置整体超时
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn stream_url(&self) -> String {
        format!("{}/cctv", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CameraDevicePort for MjpegCameraDevice {
    async fn open(&self) -> Result<Arc<dyn CaptureStream>, CameraError> {
        let url = self.stream_url();
        // 时间戳参数避免中间层缓存
        let nonce = chrono::Utc::now().timestamp_millis().to_string();

        tracing::debug!(url = %url, "Opening CCTV stream");

        let request = self.client.get(&url).query(&[("t", nonce)]).send();
        let response = tokio::time::timeout(
            Duration::from_secs(self.config.connect_timeout_secs),
            request,
        )
        .await
        .map_err(|_| CameraError::DeviceUnavailable("CCTV stream timed out".to_string()))?
        .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(CameraError::PermissionDenied(format!(
                    "HTTP {}",
                    response.status().as_u16()
                )));
            }
            status if !status.is_success() => {
                return Err(CameraError::DeviceUnavailable(format!("HTTP {}", status.as_u16())));
            }
            _ => {}
        }

        let store = Arc::new(FrameStore::new());
        let cancel = CancellationToken::new();
        let reader_store = store.clone();
        let reader_cancel = cancel.clone();
        let label = url.clone();

        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut splitter = MjpegSplitter::new();
            loop {
                tokio::select! {
                    _ = reader_cancel.cancelled() => break,
                    chunk = body.next() => match chunk {
                        Some(Ok(bytes)) => {
                            for jpeg in splitter.push(&bytes) {
                                reader_store.store(jpeg);
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(url = %label, error = %e, "CCTV stream read failed");
                            break;
                        }
                        None => {
                            tracing::info!(url = %label, "CCTV stream ended");
                            break;
                        }
                    }
                }
            }
            reader_store.close();
        });

        tracing::info!(url = %url, "CCTV stream opened");

        Ok(Arc::new(MjpegStream { url, store, cancel }))
    }
}

/// 最新一帧缓存
#[derive(Debug)]
pub struct FrameStore {
    latest: Mutex<Option<StoredJpeg>>,
    live: AtomicBool,
}

#[derive(Debug, Clone)]
struct StoredJpeg {
    jpeg: Arc<[u8]>,
    size: FrameSize,
    sequence: u64,
}

impl FrameStore {
    pub fn new() -> Self {
        Self {
            latest: Mutex::new(None),
            live: AtomicBool::new(true),
        }
    }

    /// 保存一帧；无法读取尺寸的数据被丢弃
    pub fn store(&self, jpeg: Vec<u8>) -> bool {
        let Some(size) = jpeg_dimensions(&jpeg) else {
            tracing::debug!(bytes = jpeg.len(), "Dropping undecodable MJPEG frame");
            return false;
        };
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        let sequence = latest.as_ref().map_or(0, |f| f.sequence + 1);
        *latest = Some(StoredJpeg {
            jpeg: jpeg.into(),
            size,
            sequence,
        });
        true
    }

    pub fn size(&self) -> Option<FrameSize> {
        if !self.is_live() {
            return None;
        }
        self.current().map(|f| f.size)
    }

    /// 解码最新一帧
    pub fn decode_latest(&self) -> Option<VideoFrame> {
        if !self.is_live() {
            return None;
        }
        let stored = self.current()?;
        let image = image::load_from_memory_with_format(&stored.jpeg, image::ImageFormat::Jpeg)
            .map_err(|e| tracing::debug!(error = %e, "Failed to decode MJPEG frame"))
            .ok()?
            .to_rgb8();
        let size = FrameSize::new(image.width(), image.height());
        VideoFrame::new(size, image.into_raw(), stored.sequence)
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    fn current(&self) -> Option<StoredJpeg> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}

fn jpeg_dimensions(jpeg: &[u8]) -> Option<FrameSize> {
    let reader = image::ImageReader::with_format(Cursor::new(jpeg), image::ImageFormat::Jpeg);
    let (width, height) = reader.into_dimensions().ok()?;
    Some(FrameSize::new(width, height))
}

/// MJPEG 采集流；Drop 时停止读取任务
pub struct MjpegStream {
    url: String,
    store: Arc<FrameStore>,
    cancel: CancellationToken,
}

impl CaptureStream for MjpegStream {
    fn device_label(&self) -> String {
        format!("CCTV {}", self.url)
    }

    fn native_size(&self) -> Option<FrameSize> {
        self.store.size()
    }

    fn latest_frame(&self) -> Option<VideoFrame> {
        self.store.decode_latest()
    }

    fn is_live(&self) -> bool {
        self.store.is_live() && !self.cancel.is_cancelled()
    }

    fn stop(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!(url = %self.url, "Stopping CCTV stream");
        }
        self.cancel.cancel();
        self.store.close();
    }
}

impl Drop for MjpegStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
