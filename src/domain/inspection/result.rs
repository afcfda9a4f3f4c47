//! Inspection Context - Settled Result

use serde::{Deserialize, Serialize};

use super::{CategoryMeasure, InspectionDomainError, MeasurementKind, ReportedVerdict};
use crate::domain::Timestamp;

/// 分类计量明细
///
/// 不变量:
/// - 所有分类使用同一种计量方式
/// - 数值均为有限非负数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    kind: MeasurementKind,
    measures: Vec<CategoryMeasure>,
    total: f64,
}

impl Breakdown {
    pub fn new(
        kind: MeasurementKind,
        measures: Vec<CategoryMeasure>,
        total: f64,
    ) -> Result<Self, InspectionDomainError> {
        if measures.iter().any(|measure| measure.kind != kind) {
            return Err(InspectionDomainError::MixedMeasurementKinds);
        }
        if let Some(bad) = measures
            .iter()
            .find(|measure| !measure.magnitude.is_finite() || measure.magnitude < 0.0)
        {
            return Err(InspectionDomainError::InvalidMeasurement(format!(
                "{} has magnitude {}",
                bad.category, bad.magnitude
            )));
        }
        if !total.is_finite() || total < 0.0 {
            return Err(InspectionDomainError::InvalidMeasurement(format!(
                "total is {}",
                total
            )));
        }
        Ok(Self {
            kind,
            measures,
            total,
        })
    }

    pub fn kind(&self) -> MeasurementKind {
        self.kind
    }

    pub fn measures(&self) -> &[CategoryMeasure] {
        &self.measures
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

/// 结果附带的图片地址
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultImages {
    pub image_url: Option<String>,
    pub overlay_url: Option<String>,
}

impl ResultImages {
    /// 原图与叠加图同时存在时才返回
    pub fn overlay_pair(&self) -> Option<(&str, &str)> {
        match (self.image_url.as_deref(), self.overlay_url.as_deref()) {
            (Some(image), Some(overlay)) => Some((image, overlay)),
            _ => None,
        }
    }
}

/// 一次检验的最终结果
///
/// 整体替换，不做局部修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionResult {
    breakdown: Breakdown,
    verdict: ReportedVerdict,
    created_at: Option<Timestamp>,
    images: ResultImages,
}

impl InspectionResult {
    pub fn new(
        breakdown: Breakdown,
        verdict: ReportedVerdict,
        created_at: Option<Timestamp>,
        images: ResultImages,
    ) -> Self {
        Self {
            breakdown,
            verdict,
            created_at,
            images,
        }
    }

    pub fn breakdown(&self) -> &Breakdown {
        &self.breakdown
    }

    pub fn kind(&self) -> MeasurementKind {
        self.breakdown.kind
    }

    pub fn measures(&self) -> &[CategoryMeasure] {
        &self.breakdown.measures
    }

    pub fn total(&self) -> f64 {
        self.breakdown.total
    }

    pub fn verdict(&self) -> &ReportedVerdict {
        &self.verdict
    }

    pub fn created_at(&self) -> Option<&Timestamp> {
        self.created_at.as_ref()
    }

    pub fn images(&self) -> &ResultImages {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inspection::Percentage;

    fn measure(category: &str, kind: MeasurementKind, magnitude: f64) -> CategoryMeasure {
        CategoryMeasure {
            category: category.to_string(),
            kind,
            magnitude,
            share: Percentage::new(50.0),
            color: None,
        }
    }

    #[test]
    fn test_breakdown_rejects_mixed_kinds() {
        let measures = vec![
            measure("fillet", MeasurementKind::Weight, 10.0),
            measure("bone", MeasurementKind::Count, 2.0),
        ];
        assert_eq!(
            Breakdown::new(MeasurementKind::Weight, measures, 12.0),
            Err(InspectionDomainError::MixedMeasurementKinds)
        );
    }

    #[test]
    fn test_breakdown_rejects_negative_magnitude() {
        let measures = vec![measure("fillet", MeasurementKind::Weight, -1.0)];
        assert!(matches!(
            Breakdown::new(MeasurementKind::Weight, measures, 1.0),
            Err(InspectionDomainError::InvalidMeasurement(_))
        ));
        assert!(Breakdown::new(MeasurementKind::Weight, vec![], f64::NAN).is_err());
    }

    #[test]
    fn test_overlay_pair_requires_both() {
        let only_image = ResultImages {
            image_url: Some("/img/a.jpg".to_string()),
            overlay_url: None,
        };
        assert!(only_image.overlay_pair().is_none());

        let both = ResultImages {
            image_url: Some("/img/a.jpg".to_string()),
            overlay_url: Some("/img/a_overlay.png".to_string()),
        };
        assert_eq!(both.overlay_pair(), Some(("/img/a.jpg", "/img/a_overlay.png")));
    }
}
