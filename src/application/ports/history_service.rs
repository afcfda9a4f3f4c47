//! History Service Port - 历史记录服务抽象

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::history::{HistoryQuery, HistoryRecord};

/// 历史服务错误（仅传输层；无法解析的响应体由适配器归一化为空集合）
#[derive(Debug, Clone, Error)]
pub enum HistoryError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),
}

#[async_trait]
pub trait HistoryServicePort: Send + Sync {
    /// GET /qc/history，按查询条件返回记录
    async fn fetch(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, HistoryError>;
}
