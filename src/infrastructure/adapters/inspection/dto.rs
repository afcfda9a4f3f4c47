//! Inspection Service DTOs
//!
//! 两种响应形态：新版按重量 (`weight` / `total_weight`)，
//! 旧版按数量 (`count` / `total_count`)。在这里一次性归一化，
//! 比例也在这里统一换算成百分比。

use serde::Deserialize;

use crate::domain::inspection::{
    Breakdown, CategoryMeasure, InspectionDomainError, InspectionResult, MeasurementKind,
    RatioScale, ReportedVerdict, ResultImages,
};
use crate::domain::Timestamp;

/// POST /qc 与 POST /qc/camera 的响应体
#[derive(Debug, Clone, Deserialize)]
pub struct QcResponseDto {
    pub status: String,
    #[serde(default)]
    pub items: Vec<QcItemDto>,
    #[serde(default)]
    pub total_weight: Option<f64>,
    #[serde(default)]
    pub total_count: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub overlay_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QcItemDto {
    #[serde(rename = "class")]
    pub category: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub count: Option<f64>,
    #[serde(default)]
    pub ratio: f64,
    #[serde(default)]
    pub color: Option<String>,
}

impl QcItemDto {
    fn magnitude(&self, kind: MeasurementKind) -> Result<f64, InspectionDomainError> {
        match (kind, self.weight, self.count) {
            (MeasurementKind::Weight, Some(weight), _) => Ok(weight),
            (MeasurementKind::Count, _, Some(count)) => Ok(count),
            (_, None, None) => Err(InspectionDomainError::InvalidMeasurement(format!(
                "{} has neither weight nor count",
                self.category
            ))),
            _ => Err(InspectionDomainError::MixedMeasurementKinds),
        }
    }
}

/// 空字符串与 null 一样视为缺失
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl QcResponseDto {
    pub fn into_result(self) -> Result<InspectionResult, InspectionDomainError> {
        let (kind, total) = match (self.total_weight, self.total_count) {
            (Some(total), _) => (MeasurementKind::Weight, total),
            (None, Some(total)) => (MeasurementKind::Count, total),
            (None, None) => return Err(InspectionDomainError::MissingTotal),
        };

        let scale = RatioScale::detect(self.items.iter().map(|item| item.ratio));
        let measures = self
            .items
            .into_iter()
            .map(|item| {
                Ok(CategoryMeasure {
                    magnitude: item.magnitude(kind)?,
                    share: scale.normalize(item.ratio),
                    kind,
                    category: item.category,
                    color: non_empty(item.color),
                })
            })
            .collect::<Result<Vec<_>, InspectionDomainError>>()?;

        Ok(InspectionResult::new(
            Breakdown::new(kind, measures, total)?,
            ReportedVerdict::from_raw(&self.status),
            non_empty(self.created_at).map(Timestamp::parse),
            ResultImages {
                image_url: non_empty(self.image_url),
                overlay_url: non_empty(self.overlay_url),
            },
        ))
    }
}

/// 错误响应体 `{"error": "..."}` 或 `{"detail": "..."}`
#[derive(Debug, Deserialize)]
pub struct ErrorBodyDto {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBodyDto {
    /// 从响应文本中提取错误信息；不是 JSON 时原样返回
    pub fn message(body: &str) -> String {
        match serde_json::from_str::<ErrorBodyDto>(body) {
            Ok(ErrorBodyDto {
                error: Some(error), ..
            }) => error,
            Ok(ErrorBodyDto {
                detail: Some(serde_json::Value::String(detail)),
                ..
            }) => detail,
            Ok(ErrorBodyDto {
                detail: Some(detail),
                ..
            }) => detail.to_string(),
            _ => body.trim().to_string(),
        }
    }
}
