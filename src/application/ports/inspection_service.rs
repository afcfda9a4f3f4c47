//! Inspection Service Port - 检验服务抽象
//!
//! 定义检验服务的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::inspection::{ImagePayload, InspectionResult};

/// 检验服务错误
#[derive(Debug, Error)]
pub enum InspectionError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Inspection Service Port
///
/// 上游检验服务：上传图像或让服务端自行抓拍，返回分类结果
#[async_trait]
pub trait InspectionServicePort: Send + Sync {
    /// 提交图像 (POST /qc)
    async fn inspect(&self, payload: &ImagePayload) -> Result<InspectionResult, InspectionError>;

    /// 服务端摄像头抓拍并检验 (POST /qc/camera)
    async fn inspect_server_capture(&self) -> Result<InspectionResult, InspectionError>;

    /// 检查检验服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
