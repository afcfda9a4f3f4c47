//! Inspection Context - Request State Machine
//!
//! Idle → Pending → Succeeded / Failed → Pending → ...
//!
//! 进入 Pending 时立即清除上一次的结果和错误，旧结果不会在新请求期间显示。

use serde::{Deserialize, Serialize};

use super::{
    ActivePreview, ImageSource, InspectionDomainError, InspectionResult, PreviewHandle,
    SubmissionId,
};

/// 请求状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestState {
    Idle,
    Pending {
        submission_id: SubmissionId,
        source: ImageSource,
    },
    Succeeded(InspectionResult),
    Failed(String),
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending { .. } => "pending",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

impl Default for RequestState {
    fn default() -> Self {
        Self::Idle
    }
}

/// 检验界面聚合根
///
/// 不变量:
/// - 同一时刻只有一个 RequestState
/// - 只有当前 Pending 的提交可以结算
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionScreen {
    state: RequestState,
    preview: Option<ActivePreview>,
}

impl InspectionScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// 进入 Pending
    pub fn begin(
        &mut self,
        submission_id: SubmissionId,
        source: ImageSource,
        preview: Option<ActivePreview>,
    ) -> Result<(), InspectionDomainError> {
        if let RequestState::Pending {
            submission_id: current,
            ..
        } = &self.state
        {
            return Err(InspectionDomainError::SubmissionInFlight {
                submission_id: *current,
            });
        }
        self.state = RequestState::Pending {
            submission_id,
            source,
        };
        self.preview = preview;
        Ok(())
    }

    /// Pending → Succeeded
    ///
    /// 服务端抓拍的结果带有 image_url 时，预览切换为该图片。
    pub fn succeed(
        &mut self,
        submission_id: SubmissionId,
        result: InspectionResult,
    ) -> Result<(), InspectionDomainError> {
        let source = self.pending_source(submission_id)?;
        if source == ImageSource::ServerCamera {
            if let Some(url) = result.images().image_url.clone() {
                self.preview = Some(ActivePreview {
                    name: ImageSource::ServerCamera.label().to_string(),
                    source,
                    handle: PreviewHandle::Remote(url),
                });
            }
        }
        self.state = RequestState::Succeeded(result);
        Ok(())
    }

    /// Pending → Failed
    pub fn fail(
        &mut self,
        submission_id: SubmissionId,
        reason: impl Into<String>,
    ) -> Result<(), InspectionDomainError> {
        self.pending_source(submission_id)?;
        self.state = RequestState::Failed(reason.into());
        Ok(())
    }

    fn pending_source(&self, submission_id: SubmissionId) -> Result<ImageSource, InspectionDomainError> {
        match &self.state {
            RequestState::Pending {
                submission_id: current,
                source,
            } if *current == submission_id => Ok(*source),
            _ => Err(InspectionDomainError::NotPending { submission_id }),
        }
    }

    // Getters
    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn preview(&self) -> Option<&ActivePreview> {
        self.preview.as_ref()
    }

    pub fn result(&self) -> Option<&InspectionResult> {
        match &self.state {
            RequestState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            RequestState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inspection::{Breakdown, MeasurementKind, ReportedVerdict, ResultImages, Verdict};
    use std::path::PathBuf;

    fn result_with_image(image_url: Option<&str>) -> InspectionResult {
        InspectionResult::new(
            Breakdown::new(MeasurementKind::Weight, vec![], 0.0).unwrap(),
            ReportedVerdict::Known(Verdict::Pass),
            None,
            ResultImages {
                image_url: image_url.map(str::to_string),
                overlay_url: None,
            },
        )
    }

    fn file_preview(name: &str) -> ActivePreview {
        ActivePreview {
            name: name.to_string(),
            source: ImageSource::UploadedFile,
            handle: PreviewHandle::File(PathBuf::from(name)),
        }
    }

    #[test]
    fn test_full_cycle() {
        let mut screen = InspectionScreen::new();
        assert_eq!(screen.state(), &RequestState::Idle);

        let id = SubmissionId::new();
        screen
            .begin(id, ImageSource::UploadedFile, Some(file_preview("a.jpg")))
            .unwrap();
        assert!(screen.is_pending());
        assert_eq!(screen.preview().unwrap().name, "a.jpg");

        screen.succeed(id, result_with_image(None)).unwrap();
        assert!(screen.result().is_some());
        assert!(screen.error().is_none());
    }

    #[test]
    fn test_begin_clears_previous_result_immediately() {
        let mut screen = InspectionScreen::new();
        let first = SubmissionId::new();
        screen.begin(first, ImageSource::UploadedFile, None).unwrap();
        screen.succeed(first, result_with_image(None)).unwrap();
        assert!(screen.result().is_some());

        let second = SubmissionId::new();
        screen
            .begin(second, ImageSource::UploadedFile, Some(file_preview("b.png")))
            .unwrap();
        assert!(screen.result().is_none());
        assert!(screen.error().is_none());
        assert_eq!(screen.preview().unwrap().name, "b.png");
    }

    #[test]
    fn test_begin_clears_previous_error() {
        let mut screen = InspectionScreen::new();
        let first = SubmissionId::new();
        screen.begin(first, ImageSource::CameraCapture, None).unwrap();
        screen.fail(first, "Network error").unwrap();
        assert_eq!(screen.error(), Some("Network error"));

        screen
            .begin(SubmissionId::new(), ImageSource::CameraCapture, None)
            .unwrap();
        assert!(screen.error().is_none());
    }

    #[test]
    fn test_rejects_second_begin_while_pending() {
        let mut screen = InspectionScreen::new();
        let id = SubmissionId::new();
        screen.begin(id, ImageSource::UploadedFile, None).unwrap();
        assert_eq!(
            screen.begin(SubmissionId::new(), ImageSource::UploadedFile, None),
            Err(InspectionDomainError::SubmissionInFlight { submission_id: id })
        );
    }

    #[test]
    fn test_settlement_requires_matching_submission() {
        let mut screen = InspectionScreen::new();
        let id = SubmissionId::new();
        let other = SubmissionId::new();
        assert!(screen.fail(id, "x").is_err());

        screen.begin(id, ImageSource::UploadedFile, None).unwrap();
        assert_eq!(
            screen.succeed(other, result_with_image(None)),
            Err(InspectionDomainError::NotPending { submission_id: other })
        );
        assert!(screen.is_pending());
    }

    #[test]
    fn test_server_capture_preview_follows_image_url() {
        let mut screen = InspectionScreen::new();
        let id = SubmissionId::new();
        screen.begin(id, ImageSource::ServerCamera, None).unwrap();
        screen
            .succeed(id, result_with_image(Some("/images/cam_01.jpg")))
            .unwrap();

        let preview = screen.preview().unwrap();
        assert_eq!(preview.name, "CCTV Capture");
        assert_eq!(preview.handle, PreviewHandle::Remote("/images/cam_01.jpg".to_string()));
    }
}
