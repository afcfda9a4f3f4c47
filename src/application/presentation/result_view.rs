//! Result Presentation - 检验界面展示模型
//!
//! 纯函数：只依赖当前 InspectionScreen 的状态。

use crate::domain::inspection::{
    ActivePreview, ImageSource, InspectionResult, InspectionScreen, MeasurementKind,
    ReportedVerdict, RequestState, Verdict,
};
use crate::domain::DisplayClock;

pub const EMPTY_TITLE: &str = "No Analysis Available";
pub const EMPTY_HINT: &str = "Please upload an image to begin quality control analysis";
pub const LOADING_TITLE: &str = "Processing Request";
pub const LOADING_HINT: &str = "Analyzing image data. Please wait...";
pub const PASS_DESCRIPTION: &str = "Product meets quality standards";
pub const FAIL_DESCRIPTION: &str = "Product requires inspection";
/// 表尾百分比总是 100%，不累加各行的舍入结果
pub const FOOTER_PERCENTAGE: &str = "100%";
/// 尚无结果时的上传时间
pub const NO_TIME: &str = "-";
/// 服务端抓拍等待中、还没有预览图
pub const AWAITING_SERVER_CAPTURE: &str = "Awaiting server capture";

/// 结论样式，三者互斥
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStyle {
    Pass,
    Fail,
    /// 上游给出未知结论
    DisplayError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictBadge {
    pub style: VerdictStyle,
    pub label: String,
    pub description: String,
}

impl VerdictBadge {
    pub fn from_reported(verdict: &ReportedVerdict) -> Self {
        match verdict {
            ReportedVerdict::Known(Verdict::Pass) => Self {
                style: VerdictStyle::Pass,
                label: Verdict::Pass.as_str().to_string(),
                description: PASS_DESCRIPTION.to_string(),
            },
            ReportedVerdict::Known(Verdict::Fail) => Self {
                style: VerdictStyle::Fail,
                label: Verdict::Fail.as_str().to_string(),
                description: FAIL_DESCRIPTION.to_string(),
            },
            ReportedVerdict::Unrecognized(raw) => Self {
                style: VerdictStyle::DisplayError,
                label: "UNKNOWN".to_string(),
                description: format!("Unrecognized verdict {:?} from inspection service", raw),
            },
        }
    }
}

/// 分类行
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub category: String,
    pub magnitude: String,
    /// 一位小数，例如 "80.0"
    pub percentage: String,
    /// 进度条宽度 (0..=100)
    pub bar_width: f64,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayView {
    pub image_url: String,
    pub overlay_url: String,
}

/// 结果展示
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub badge: VerdictBadge,
    pub kind: MeasurementKind,
    pub column_header: &'static str,
    pub total_label: &'static str,
    pub unit: &'static str,
    pub rows: Vec<CategoryRow>,
    pub total: String,
    pub footer_percentage: &'static str,
    pub measured_at: String,
    /// 原图与叠加图都存在时才有
    pub overlay: Option<OverlayView>,
}

impl ResultView {
    pub fn derive(result: &InspectionResult, clock: &DisplayClock) -> Self {
        let kind = result.kind();
        let rows = result
            .measures()
            .iter()
            .map(|measure| {
                let share = measure.share.value();
                CategoryRow {
                    category: measure.category.clone(),
                    magnitude: format_magnitude(measure.magnitude),
                    percentage: format!("{:.1}", share),
                    bar_width: share.clamp(0.0, 100.0),
                    color: measure.color.clone(),
                }
            })
            .collect();

        let overlay = result
            .images()
            .overlay_pair()
            .map(|(image, overlay)| OverlayView {
                image_url: image.to_string(),
                overlay_url: overlay.to_string(),
            });

        Self {
            badge: VerdictBadge::from_reported(result.verdict()),
            kind,
            column_header: kind.column_header(),
            total_label: kind.total_label(),
            unit: kind.unit(),
            rows,
            total: format_magnitude(result.total()),
            footer_percentage: FOOTER_PERCENTAGE,
            measured_at: result
                .created_at()
                .map(|ts| clock.format_full(ts))
                .unwrap_or_else(|| NO_TIME.to_string()),
            overlay,
        }
    }
}

/// 数值按最短形式显示（150.6、120、30.1）
pub fn format_magnitude(value: f64) -> String {
    format!("{}", value)
}

/// 预览信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewInfo {
    pub file_name: String,
    pub source_label: &'static str,
    pub location: String,
    /// 结果时间；尚无结果时为 "-"
    pub upload_time: String,
}

impl PreviewInfo {
    pub fn derive(preview: &ActivePreview, result: Option<&InspectionResult>, clock: &DisplayClock) -> Self {
        Self {
            file_name: preview.name.clone(),
            source_label: preview.source.label(),
            location: preview.handle.to_string(),
            upload_time: result
                .and_then(InspectionResult::created_at)
                .map(|ts| clock.format_full(ts))
                .unwrap_or_else(|| NO_TIME.to_string()),
        }
    }
}

/// 右侧主体，互斥
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenBody {
    Empty,
    Loading,
    Result(ResultView),
    Error(String),
}

/// 检验界面展示模型
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenView {
    pub preview: Option<PreviewInfo>,
    /// 没有预览时的提示
    pub preview_note: Option<&'static str>,
    pub body: ScreenBody,
}

impl ScreenView {
    pub fn derive(screen: &InspectionScreen, clock: &DisplayClock) -> Self {
        let preview = screen
            .preview()
            .map(|preview| PreviewInfo::derive(preview, screen.result(), clock));
        let preview_note = match (screen.preview(), screen.state()) {
            (
                None,
                RequestState::Pending {
                    source: ImageSource::ServerCamera,
                    ..
                },
            ) => Some(AWAITING_SERVER_CAPTURE),
            _ => None,
        };
        let body = match screen.state() {
            RequestState::Idle => ScreenBody::Empty,
            RequestState::Pending { .. } => ScreenBody::Loading,
            RequestState::Succeeded(result) => ScreenBody::Result(ResultView::derive(result, clock)),
            RequestState::Failed(reason) => ScreenBody::Error(reason.clone()),
        };
        Self {
            preview,
            preview_note,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inspection::{
        Breakdown, CategoryMeasure, Percentage, PreviewHandle, ResultImages, SubmissionId,
    };
    use crate::domain::Timestamp;
    use std::path::PathBuf;

    fn measure(category: &str, magnitude: f64, share: f64) -> CategoryMeasure {
        CategoryMeasure {
            category: category.to_string(),
            kind: MeasurementKind::Weight,
            magnitude,
            share: Percentage::new(share),
            color: Some("#2ecc71".to_string()),
        }
    }

    fn scenario_result(verdict: ReportedVerdict, images: ResultImages) -> InspectionResult {
        InspectionResult::new(
            Breakdown::new(
                MeasurementKind::Weight,
                vec![measure("fillet", 120.5, 80.0), measure("bone", 30.1, 20.0)],
                150.6,
            )
            .unwrap(),
            verdict,
            Some(Timestamp::parse("2024-05-01T10:00:00Z")),
            images,
        )
    }

    #[test]
    fn test_pass_result_view() {
        let result = scenario_result(ReportedVerdict::Known(Verdict::Pass), ResultImages::default());
        let view = ResultView::derive(&result, &DisplayClock::utc());

        assert_eq!(view.badge.style, VerdictStyle::Pass);
        assert_eq!(view.badge.label, "PASS");
        assert_eq!(view.badge.description, PASS_DESCRIPTION);
        let percentages: Vec<&str> = view.rows.iter().map(|r| r.percentage.as_str()).collect();
        assert_eq!(percentages, vec!["80.0", "20.0"]);
        assert_eq!(view.rows[0].magnitude, "120.5");
        assert_eq!(view.total, "150.6");
        assert_eq!(view.unit, "grams");
        assert_eq!(view.measured_at, "01/05/2024, 10:00:00");
    }

    #[test]
    fn test_footer_is_always_100_percent() {
        let result = InspectionResult::new(
            Breakdown::new(
                MeasurementKind::Weight,
                vec![
                    measure("a", 1.0, 33.33),
                    measure("b", 1.0, 33.33),
                    measure("c", 1.0, 33.33),
                ],
                3.0,
            )
            .unwrap(),
            ReportedVerdict::Known(Verdict::Fail),
            None,
            ResultImages::default(),
        );
        let view = ResultView::derive(&result, &DisplayClock::utc());
        assert_eq!(view.footer_percentage, "100%");
        assert_eq!(view.badge.description, FAIL_DESCRIPTION);
        assert_eq!(view.measured_at, NO_TIME);
    }

    #[test]
    fn test_unrecognized_verdict_is_display_error() {
        let result = scenario_result(
            ReportedVerdict::Unrecognized("WARN".to_string()),
            ResultImages::default(),
        );
        let view = ResultView::derive(&result, &DisplayClock::utc());
        assert_eq!(view.badge.style, VerdictStyle::DisplayError);
        assert!(view.badge.description.contains("WARN"));
    }

    #[test]
    fn test_partial_overlay_is_omitted() {
        let partial = scenario_result(
            ReportedVerdict::Known(Verdict::Pass),
            ResultImages {
                image_url: None,
                overlay_url: Some("/o.png".to_string()),
            },
        );
        assert!(ResultView::derive(&partial, &DisplayClock::utc()).overlay.is_none());

        let full = scenario_result(
            ReportedVerdict::Known(Verdict::Pass),
            ResultImages {
                image_url: Some("/i.jpg".to_string()),
                overlay_url: Some("/o.png".to_string()),
            },
        );
        let overlay = ResultView::derive(&full, &DisplayClock::utc()).overlay.unwrap();
        assert_eq!(overlay.image_url, "/i.jpg");
    }

    #[test]
    fn test_screen_bodies() {
        let clock = DisplayClock::utc();
        let mut screen = InspectionScreen::new();
        let view = ScreenView::derive(&screen, &clock);
        assert_eq!(view.body, ScreenBody::Empty);
        assert!(view.preview.is_none());

        let id = SubmissionId::new();
        let preview = ActivePreview {
            name: "tray.jpg".to_string(),
            source: ImageSource::UploadedFile,
            handle: PreviewHandle::File(PathBuf::from("/data/tray.jpg")),
        };
        screen.begin(id, ImageSource::UploadedFile, Some(preview)).unwrap();
        let view = ScreenView::derive(&screen, &clock);
        assert_eq!(view.body, ScreenBody::Loading);
        assert_eq!(view.preview.as_ref().unwrap().upload_time, NO_TIME);

        screen
            .succeed(
                id,
                scenario_result(ReportedVerdict::Known(Verdict::Pass), ResultImages::default()),
            )
            .unwrap();
        let view = ScreenView::derive(&screen, &clock);
        assert!(matches!(view.body, ScreenBody::Result(_)));
        assert_eq!(view.preview.unwrap().upload_time, "01/05/2024, 10:00:00");
    }

    #[test]
    fn test_bar_width_is_clamped() {
        let result = InspectionResult::new(
            Breakdown::new(MeasurementKind::Weight, vec![measure("a", 1.0, 104.0)], 1.0).unwrap(),
            ReportedVerdict::Known(Verdict::Pass),
            None,
            ResultImages::default(),
        );
        let view = ResultView::derive(&result, &DisplayClock::utc());
        assert_eq!(view.rows[0].bar_width, 100.0);
        assert_eq!(view.rows[0].percentage, "104.0");
    }

    #[test]
    fn test_server_capture_pending_notes_missing_preview() {
        let clock = DisplayClock::utc();
        let mut screen = InspectionScreen::new();
        assert_eq!(ScreenView::derive(&screen, &clock).preview_note, None);

        let id = SubmissionId::new();
        screen.begin(id, ImageSource::ServerCamera, None).unwrap();
        let view = ScreenView::derive(&screen, &clock);
        assert!(view.preview.is_none());
        assert_eq!(view.preview_note, Some(AWAITING_SERVER_CAPTURE));

        screen.fail(id, "HTTP 503: Camera not ready").unwrap();
        assert_eq!(ScreenView::derive(&screen, &clock).preview_note, None);
    }
}
