//! In-Memory Screen State Implementation
//!
//! 状态放在 watch 通道里，渲染端订阅变化。

use tokio::sync::watch;

use crate::application::ports::ScreenStatePort;
use crate::domain::inspection::{
    ActivePreview, ImageSource, InspectionDomainError, InspectionResult, InspectionScreen,
    SubmissionId,
};

/// 内存检验界面状态
pub struct InMemoryScreenState {
    tx: watch::Sender<InspectionScreen>,
}

impl InMemoryScreenState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(InspectionScreen::new());
        Self { tx }
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<InspectionScreen> {
        self.tx.subscribe()
    }

    fn transition(
        &self,
        f: impl FnOnce(&mut InspectionScreen) -> Result<(), InspectionDomainError>,
    ) -> Result<(), InspectionDomainError> {
        let mut outcome = Ok(());
        self.tx.send_if_modified(|screen| {
            outcome = f(screen);
            outcome.is_ok()
        });
        outcome
    }
}

impl Default for InMemoryScreenState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenStatePort for InMemoryScreenState {
    fn begin(
        &self,
        submission_id: SubmissionId,
        source: ImageSource,
        preview: Option<ActivePreview>,
    ) -> Result<(), InspectionDomainError> {
        self.transition(|screen| screen.begin(submission_id, source, preview))?;
        tracing::debug!(submission_id = %submission_id, source = source.label(), "Screen pending");
        Ok(())
    }

    fn succeed(
        &self,
        submission_id: SubmissionId,
        result: InspectionResult,
    ) -> Result<(), InspectionDomainError> {
        self.transition(|screen| screen.succeed(submission_id, result))?;
        tracing::debug!(submission_id = %submission_id, "Screen succeeded");
        Ok(())
    }

    fn fail(&self, submission_id: SubmissionId, reason: String) -> Result<(), InspectionDomainError> {
        self.transition(|screen| screen.fail(submission_id, reason))?;
        tracing::debug!(submission_id = %submission_id, "Screen failed");
        Ok(())
    }

    fn snapshot(&self) -> InspectionScreen {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inspection::RequestState;

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let state = InMemoryScreenState::new();
        let mut rx = state.subscribe();
        let id = SubmissionId::new();

        state.begin(id, ImageSource::ServerCamera, None).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_pending());

        state.fail(id, "Camera not ready".to_string()).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().state(),
            &RequestState::Failed("Camera not ready".to_string())
        );
    }

    #[test]
    fn test_rejected_transition_does_not_notify() {
        let state = InMemoryScreenState::new();
        let rx = state.subscribe();
        let id = SubmissionId::new();
        state.begin(id, ImageSource::UploadedFile, None).unwrap();
        assert!(rx.has_changed().unwrap());

        let mut rx = state.subscribe();
        rx.mark_unchanged();
        let err = state.begin(SubmissionId::new(), ImageSource::UploadedFile, None);
        assert!(matches!(err, Err(InspectionDomainError::SubmissionInFlight { .. })));
        assert!(!rx.has_changed().unwrap());
        assert!(state.fail(SubmissionId::new(), "late".to_string()).is_err());
        assert!(state.snapshot().is_pending());
    }
}
