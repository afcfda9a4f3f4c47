//! Fake Inspection Client - 用于测试的检验客户端
//!
//! 按脚本依次返回结果；脚本用完后返回固定的 PASS 结果。
//! 可选的闸门 (Semaphore) 让测试控制请求何时完成。

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::application::ports::{InspectionError, InspectionServicePort};
use crate::domain::inspection::{
    Breakdown, CategoryMeasure, ImagePayload, InspectionDomainError, InspectionResult,
    MeasurementKind, Percentage,
    ReportedVerdict, ResultImages, Verdict,
};
use crate::domain::Timestamp;

pub struct FakeInspectionClient {
    script: Mutex<VecDeque<Result<InspectionResult, InspectionError>>>,
    gate: Option<Arc<Semaphore>>,
    calls: AtomicUsize,
    uploads: Mutex<Vec<String>>,
}

impl FakeInspectionClient {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            gate: None,
            calls: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_result(self, result: InspectionResult) -> Self {
        self.push(Ok(result));
        self
    }

    pub fn with_error(self, error: InspectionError) -> Self {
        self.push(Err(error));
        self
    }

    /// 每次请求先消耗一个许可
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn push(&self, response: Result<InspectionResult, InspectionError>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    /// 已发出的请求数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 已上传的文件名
    pub fn uploaded_files(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// fillet/bone 两类，共 150.6 克，PASS
    pub fn sample_result() -> Result<InspectionResult, InspectionDomainError> {
        let measure = |category: &str, magnitude: f64, share: f64, color: &str| CategoryMeasure {
            category: category.to_string(),
            kind: MeasurementKind::Weight,
            magnitude,
            share: Percentage::new(share),
            color: Some(color.to_string()),
        };
        let breakdown = Breakdown::new(
            MeasurementKind::Weight,
            vec![
                measure("fillet", 120.5, 80.0, "#2ecc71"),
                measure("bone", 30.1, 20.0, "#e74c3c"),
            ],
            150.6,
        )?;
        Ok(InspectionResult::new(
            breakdown,
            ReportedVerdict::Known(Verdict::Pass),
            Some(Timestamp::parse("2024-05-01T10:00:00Z")),
            ResultImages::default(),
        ))
    }

    async fn respond(&self) -> Result<InspectionResult, InspectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(InspectionError::NetworkError("gate closed".to_string())),
            }
        }
        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        scripted.unwrap_or_else(|| {
            Self::sample_result().map_err(|e| InspectionError::InvalidResponse(e.to_string()))
        })
    }
}

impl Default for FakeInspectionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InspectionServicePort for FakeInspectionClient {
    async fn inspect(&self, payload: &ImagePayload) -> Result<InspectionResult, InspectionError> {
        tracing::debug!(file_name = %payload.file_name(), "FakeInspectionClient: scripted response");
        self.uploads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(payload.file_name().to_string());
        self.respond().await
    }

    async fn inspect_server_capture(&self) -> Result<InspectionResult, InspectionError> {
        tracing::debug!("FakeInspectionClient: scripted server capture");
        self.respond().await
    }
}
