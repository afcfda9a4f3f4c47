//! History Context - Entities

use serde::{Deserialize, Serialize};

use super::RecordId;
use crate::domain::inspection::{Percentage, RatioScale, ReportedVerdict};
use crate::domain::Timestamp;

/// 历史记录中的分类明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub category: String,
    pub weight: f64,
    pub share: Percentage,
}

/// 历史记录（获取后不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    id: RecordId,
    image_name: String,
    total_weight: f64,
    status: ReportedVerdict,
    created_at: Timestamp,
    items: Vec<HistoryItem>,
}

impl HistoryRecord {
    pub fn new(
        id: RecordId,
        image_name: impl Into<String>,
        total_weight: f64,
        status: ReportedVerdict,
        created_at: Timestamp,
        items: Vec<HistoryItem>,
    ) -> Self {
        Self {
            id,
            image_name: image_name.into(),
            total_weight,
            status,
            created_at,
            items,
        }
    }

    /// 从上游原始明细构建，比例按整条记录统一判定刻度
    pub fn with_raw_items(
        id: RecordId,
        image_name: impl Into<String>,
        total_weight: f64,
        status: ReportedVerdict,
        created_at: Timestamp,
        raw_items: Vec<(String, f64, f64)>,
    ) -> Self {
        let scale = RatioScale::detect(raw_items.iter().map(|(_, _, ratio)| *ratio));
        let items = raw_items
            .into_iter()
            .map(|(category, weight, ratio)| HistoryItem {
                category,
                weight,
                share: scale.normalize(ratio),
            })
            .collect();
        Self::new(id, image_name, total_weight, status, created_at, items)
    }

    // Getters
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn status(&self) -> &ReportedVerdict {
        &self.status
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }
}
