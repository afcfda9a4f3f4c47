//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{CameraError, HistoryError, InspectionError};
use crate::domain::history::HistoryDomainError;
use crate::domain::inspection::InspectionDomainError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 摄像头错误
    #[error("Camera error: {0}")]
    CameraError(#[from] CameraError),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<InspectionError> for ApplicationError {
    fn from(err: InspectionError) -> Self {
        Self::ExternalServiceError(err.to_string())
    }
}

impl From<HistoryError> for ApplicationError {
    fn from(err: HistoryError) -> Self {
        Self::ExternalServiceError(err.to_string())
    }
}

impl From<InspectionDomainError> for ApplicationError {
    fn from(err: InspectionDomainError) -> Self {
        match err {
            InspectionDomainError::SubmissionInFlight { .. }
            | InspectionDomainError::NotPending { .. } => Self::InvalidState(err.to_string()),
            other => Self::ValidationError(other.to_string()),
        }
    }
}

impl From<HistoryDomainError> for ApplicationError {
    fn from(err: HistoryDomainError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
