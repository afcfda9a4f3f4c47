//! Camera Command Handlers

use std::sync::Arc;

use crate::application::commands::{
    CloseCameraCommand, CloseCameraResponse, OpenCameraCommand, OpenCameraResponse,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{CameraOpened, MediaSourcePort};
use crate::infrastructure::events::EventPublisher;

/// OpenCamera Handler - 已打开时为空操作
pub struct OpenCameraHandler {
    media: Arc<dyn MediaSourcePort>,
    events: Arc<EventPublisher>,
}

impl OpenCameraHandler {
    pub fn new(media: Arc<dyn MediaSourcePort>, events: Arc<EventPublisher>) -> Self {
        Self { media, events }
    }

    pub async fn handle(
        &self,
        _cmd: OpenCameraCommand,
    ) -> Result<OpenCameraResponse, ApplicationError> {
        match self.media.open_camera().await {
            Ok(CameraOpened::Opened { device_label }) => {
                tracing::info!(device = %device_label, "Camera opened");
                self.events.publish_camera_opened(&device_label);
                Ok(OpenCameraResponse {
                    opened: true,
                    device_label: Some(device_label),
                })
            }
            Ok(CameraOpened::AlreadyOpen) => {
                tracing::debug!("Camera already open");
                Ok(OpenCameraResponse {
                    opened: false,
                    device_label: None,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open camera");
                self.events.publish_camera_failed(&e.to_string());
                Err(e.into())
            }
        }
    }
}

/// CloseCamera Handler - 没有会话时为空操作
pub struct CloseCameraHandler {
    media: Arc<dyn MediaSourcePort>,
    events: Arc<EventPublisher>,
}

impl CloseCameraHandler {
    pub fn new(media: Arc<dyn MediaSourcePort>, events: Arc<EventPublisher>) -> Self {
        Self { media, events }
    }

    pub fn handle(&self, _cmd: CloseCameraCommand) -> CloseCameraResponse {
        let closed = self.media.close_camera();
        if closed {
            tracing::info!("Camera closed");
            self.events.publish_camera_closed();
        }
        CloseCameraResponse { closed }
    }
}
