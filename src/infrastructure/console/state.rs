//! Console State
//!
//! 控制台持有的所有端口实现与 Command/Query Handlers

use std::sync::Arc;
use std::time::Duration;

use crate::application::presentation::{HistoryScreen, ScreenView};
use crate::application::{
    // Ports
    CameraDevicePort, HistoryServicePort, HistoryStorePort, InspectionServicePort,
    MediaSourcePort, PreviewSurface, ScreenStatePort,
    // Command handlers
    CloseCameraHandler, OpenCameraHandler, SubmitInspectionHandler,
    // Query handlers
    ChangeHistoryFilterHandler, LoadHistoryHandler, ToggleHistoryDetailHandler,
    ApplicationError,
};
use crate::config::{AppConfig, CameraSourceKind};
use crate::domain::inspection::{SubmissionGuard, UploadPolicy};
use crate::domain::DisplayClock;
use crate::infrastructure::adapters::camera::{
    FrameSurface, MjpegCameraConfig, MjpegCameraDevice, SyntheticCameraDevice,
};
use crate::infrastructure::adapters::history::{HttpHistoryClient, HttpHistoryClientConfig};
use crate::infrastructure::adapters::inspection::{
    HttpInspectionClient, HttpInspectionClientConfig,
};
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::memory::{InMemoryHistoryStore, InMemoryScreenState, LiveMediaSource};

/// 合成摄像头的画面尺寸
const SYNTHETIC_SIZE: (u32, u32) = (640, 480);

/// 控制台依赖
pub struct ConsoleDeps {
    pub inspection: Arc<dyn InspectionServicePort>,
    pub history: Arc<dyn HistoryServicePort>,
    pub camera: Arc<dyn CameraDevicePort>,
    pub upload_policy: UploadPolicy,
    pub jpeg_quality: u8,
    pub clock: DisplayClock,
}

/// 控制台状态
pub struct ConsoleState {
    // ========== State ==========
    pub screen: Arc<InMemoryScreenState>,
    pub history_store: Arc<InMemoryHistoryStore>,
    pub media: Arc<LiveMediaSource>,
    pub surface: Arc<FrameSurface>,
    pub guard: Arc<SubmissionGuard>,
    pub events: Arc<EventPublisher>,
    pub clock: DisplayClock,

    // ========== Command Handlers ==========
    pub submit_handler: SubmitInspectionHandler,
    pub open_camera_handler: OpenCameraHandler,
    pub close_camera_handler: CloseCameraHandler,

    // ========== Query Handlers ==========
    pub load_history_handler: LoadHistoryHandler,
    pub change_filter_handler: ChangeHistoryFilterHandler,
    pub toggle_detail_handler: ToggleHistoryDetailHandler,
}

impl ConsoleState {
    pub fn new(deps: ConsoleDeps) -> Self {
        let events = Arc::new(EventPublisher::new());
        let guard = SubmissionGuard::new();
        let screen = Arc::new(InMemoryScreenState::new());
        let history_store = Arc::new(InMemoryHistoryStore::new(deps.clock.today()));
        let media = Arc::new(LiveMediaSource::new(deps.camera, deps.jpeg_quality));
        let surface = Arc::new(FrameSurface::new());
        media.attach_surface(surface.clone());

        Self {
            submit_handler: SubmitInspectionHandler::new(
                guard.clone(),
                screen.clone(),
                deps.inspection,
                media.clone(),
                deps.upload_policy,
                events.clone(),
            ),
            open_camera_handler: OpenCameraHandler::new(media.clone(), events.clone()),
            close_camera_handler: CloseCameraHandler::new(media.clone(), events.clone()),
            load_history_handler: LoadHistoryHandler::new(
                deps.history.clone(),
                history_store.clone(),
                events.clone(),
            ),
            change_filter_handler: ChangeHistoryFilterHandler::new(
                deps.history,
                history_store.clone(),
                events.clone(),
            ),
            toggle_detail_handler: ToggleHistoryDetailHandler::new(history_store.clone()),

            screen,
            history_store,
            media,
            surface,
            guard,
            events,
            clock: deps.clock,
        }
    }

    /// 按配置创建 HTTP 客户端与摄像头设备
    pub fn from_config(config: &AppConfig) -> Result<Self, ApplicationError> {
        let inspection = HttpInspectionClient::new(
            HttpInspectionClientConfig::new(&config.inspection.url)
                .with_timeout(config.inspection.timeout_secs),
        )?;
        let history = HttpHistoryClient::new(
            HttpHistoryClientConfig::new(&config.history.url)
                .with_timeout(config.history.timeout_secs),
        )?;
        let camera: Arc<dyn CameraDevicePort> = match config.camera.source {
            CameraSourceKind::Cctv => Arc::new(MjpegCameraDevice::new(
                MjpegCameraConfig::new(&config.camera.cctv_url)
                    .with_connect_timeout(config.camera.connect_timeout_secs),
            )?),
            CameraSourceKind::Synthetic => {
                Arc::new(SyntheticCameraDevice::new(SYNTHETIC_SIZE.0, SYNTHETIC_SIZE.1))
            }
        };
        let clock = DisplayClock::new(config.display.utc_offset_minutes)
            .map_err(|e| ApplicationError::validation(e.to_string()))?;

        Ok(Self::new(ConsoleDeps {
            inspection: Arc::new(inspection),
            history: Arc::new(history),
            camera,
            upload_policy: config.upload.policy(),
            jpeg_quality: config.camera.jpeg_quality,
            clock,
        }))
    }

    pub fn screen_view(&self) -> ScreenView {
        ScreenView::derive(&self.screen.snapshot(), &self.clock)
    }

    pub fn history_view(&self) -> HistoryScreen {
        HistoryScreen::derive(&self.history_store.snapshot(), &self.clock)
    }

    /// 等待预览显示面出现第一帧
    pub async fn wait_for_frame(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.media.is_open() && self.surface.natural_size().is_some() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}
