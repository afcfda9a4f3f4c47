//! Fake History Client - 用于测试的历史客户端

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::application::ports::{HistoryError, HistoryServicePort};
use crate::domain::history::{HistoryQuery, HistoryRecord};

/// 按查询条件返回预设记录；未预设的查询返回空集合
#[derive(Default)]
pub struct FakeHistoryClient {
    records: HashMap<HistoryQuery, Vec<HistoryRecord>>,
    failures: HashMap<HistoryQuery, HistoryError>,
    gates: HashMap<HistoryQuery, Arc<Semaphore>>,
    calls: Mutex<Vec<HistoryQuery>>,
}

impl FakeHistoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, query: HistoryQuery, records: Vec<HistoryRecord>) -> Self {
        self.records.insert(query, records);
        self
    }

    pub fn with_failure(mut self, query: HistoryQuery, error: HistoryError) -> Self {
        self.failures.insert(query, error);
        self
    }

    /// 该查询的每次请求先消耗一个许可
    pub fn with_gate(mut self, query: HistoryQuery, gate: Arc<Semaphore>) -> Self {
        self.gates.insert(query, gate);
        self
    }

    /// 已收到的查询（按到达顺序）
    pub fn calls(&self) -> Vec<HistoryQuery> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl HistoryServicePort for FakeHistoryClient {
    async fn fetch(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, HistoryError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(*query);

        if let Some(gate) = self.gates.get(query) {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(HistoryError::NetworkError("gate closed".to_string())),
            }
        }

        if let Some(error) = self.failures.get(query) {
            return Err(error.clone());
        }
        Ok(self.records.get(query).cloned().unwrap_or_default())
    }
}
