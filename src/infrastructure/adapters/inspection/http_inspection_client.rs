//! HTTP Inspection Client - 调用检验服务
//!
//! 实现 InspectionServicePort trait
//!
//! 检验服务 API:
//! POST {base}/qc         multipart, 字段 `file` = 图像
//! POST {base}/qc/camera  无请求体，服务端自行抓拍
//! Response: JSON (见 dto.rs)

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::time::Duration;

use super::dto::{ErrorBodyDto, QcResponseDto};
use crate::application::ports::{InspectionError, InspectionServicePort};
use crate::domain::inspection::{ImagePayload, InspectionResult};

/// HTTP 检验客户端配置
#[derive(Debug, Clone)]
pub struct HttpInspectionClientConfig {
    /// 检验服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒），推理可能较慢
    pub timeout_secs: u64,
}

impl Default for HttpInspectionClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpInspectionClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 检验客户端
pub struct HttpInspectionClient {
    client: Client,
    config: HttpInspectionClientConfig,
}

impl HttpInspectionClient {
    pub fn new(config: HttpInspectionClientConfig) -> Result<Self, InspectionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InspectionError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn upload_url(&self) -> String {
        format!("{}/qc", self.config.base_url.trim_end_matches('/'))
    }

    fn camera_url(&self) -> String {
        format!("{}/qc/camera", self.config.base_url.trim_end_matches('/'))
    }

    /// 统一处理状态码与响应体
    async fn read_result(response: Response) -> Result<InspectionResult, InspectionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InspectionError::ServiceError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                ErrorBodyDto::message(&body)
            )));
        }

        let dto: QcResponseDto = response
            .json()
            .await
            .map_err(|e| InspectionError::InvalidResponse(format!("Failed to decode result: {}", e)))?;

        dto.into_result()
            .map_err(|e| InspectionError::InvalidResponse(e.to_string()))
    }
}

fn map_send_error(e: reqwest::Error) -> InspectionError {
    if e.is_timeout() {
        InspectionError::Timeout
    } else if e.is_connect() {
        InspectionError::NetworkError(format!("Cannot connect to inspection service: {}", e))
    } else {
        InspectionError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl InspectionServicePort for HttpInspectionClient {
    async fn inspect(&self, payload: &ImagePayload) -> Result<InspectionResult, InspectionError> {
        let part = Part::bytes(payload.bytes().to_vec())
            .file_name(payload.file_name().to_string())
            .mime_str(payload.content_type())
            .map_err(|e| InspectionError::InvalidResponse(format!("Invalid content type: {}", e)))?;
        let form = Form::new().part("file", part);

        tracing::debug!(
            url = %self.upload_url(),
            file_name = %payload.file_name(),
            bytes = payload.len(),
            "Sending inspection request"
        );

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(map_send_error)?;

        let result = Self::read_result(response).await?;
        tracing::info!(
            file_name = %payload.file_name(),
            items = result.measures().len(),
            total = result.total(),
            "Inspection completed"
        );
        Ok(result)
    }

    async fn inspect_server_capture(&self) -> Result<InspectionResult, InspectionError> {
        tracing::debug!(url = %self.camera_url(), "Requesting server-side capture");

        let response = self
            .client
            .post(self.camera_url())
            .send()
            .await
            .map_err(map_send_error)?;

        let result = Self::read_result(response).await?;
        tracing::info!(
            items = result.measures().len(),
            total = result.total(),
            "Server capture inspection completed"
        );
        Ok(result)
    }
}
