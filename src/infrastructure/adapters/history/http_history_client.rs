//! HTTP History Client - 调用历史记录服务
//!
//! GET {base}/qc/history?range=day&date=2024-05-01
//!
//! 非 2xx 与网络错误是传输错误；2xx 但响应体不是记录数组时
//! 归一化为空集合。

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::dto::parse_records;
use crate::application::ports::{HistoryError, HistoryServicePort};
use crate::domain::history::{HistoryQuery, HistoryRecord};

/// HTTP 历史客户端配置
#[derive(Debug, Clone)]
pub struct HttpHistoryClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for HttpHistoryClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl HttpHistoryClientConfig {
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

pub struct HttpHistoryClient {
    client: Client,
    config: HttpHistoryClientConfig,
}

impl HttpHistoryClient {
    pub fn new(config: HttpHistoryClientConfig) -> Result<Self, HistoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HistoryError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn history_url(&self) -> String {
        format!("{}/qc/history", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl HistoryServicePort for HttpHistoryClient {
    async fn fetch(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, HistoryError> {
        tracing::debug!(url = %self.history_url(), query = %query, "Sending history request");

        let response = self
            .client
            .get(self.history_url())
            .query(&query.query_params())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HistoryError::Timeout
                } else if e.is_connect() {
                    HistoryError::NetworkError(format!("Cannot connect to history service: {}", e))
                } else {
                    HistoryError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::ServiceError(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| HistoryError::NetworkError(format!("Failed to read body: {}", e)))?;

        match parse_records(&body) {
            Some(records) => {
                tracing::debug!(query = %query, records = records.len(), "History response decoded");
                Ok(records)
            }
            None => {
                tracing::warn!(
                    query = %query,
                    body_len = body.len(),
                    "History response is not a record array, treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }
}
