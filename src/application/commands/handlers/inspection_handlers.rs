//! Inspection Command Handlers
//!
//! 提交流程:
//! 1. `begin`（同步）：获取单飞锁，已被占用则丢弃本次触发；抓拍；
//!    进入 Pending（清除旧结果，记录预览）
//! 2. `finish`（异步）：读取文件 / 调用检验服务
//! 3. 结算状态并释放锁（PendingSubmission 保证每条退出路径都会结算）

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::commands::{SubmitInspectionCommand, SubmitOutcome};
use crate::application::error::ApplicationError;
use crate::application::ports::{InspectionServicePort, MediaSourcePort, ScreenStatePort};
use crate::domain::inspection::{
    ActivePreview, ImagePayload, ImageSource, InspectionResult, PreviewHandle, ReportedVerdict,
    SubmissionGuard, SubmissionId, SubmissionPermit, UploadPolicy,
};
use crate::infrastructure::events::EventPublisher;

/// 抓拍没有产生图像时的失败原因
const NO_FRAME_REASON: &str = "Camera frame unavailable";
/// 提交在结算前被中止时的失败原因
const ABORTED_REASON: &str = "Submission aborted";

/// 在途提交
///
/// 持有锁直到结算；若未结算就被丢弃（任务被取消或 panic），
/// Drop 时把状态置为 Failed 并释放锁。
struct PendingSubmission {
    submission_id: SubmissionId,
    screen: Arc<dyn ScreenStatePort>,
    permit: Option<SubmissionPermit>,
}

impl PendingSubmission {
    fn settle(mut self, outcome: Result<InspectionResult, String>) -> SubmitOutcome {
        let permit = self.permit.take();
        let submission_id = self.submission_id;
        let settled = match outcome {
            Ok(result) => self
                .screen
                .succeed(submission_id, result)
                .map(|_| SubmitOutcome::Succeeded { submission_id }),
            Err(reason) => self
                .screen
                .fail(submission_id, reason.clone())
                .map(|_| SubmitOutcome::Failed {
                    submission_id,
                    reason,
                }),
        };
        drop(permit);
        settled.unwrap_or_else(|e| {
            tracing::error!(submission_id = %submission_id, error = %e, "Failed to settle submission");
            SubmitOutcome::Failed {
                submission_id,
                reason: e.to_string(),
            }
        })
    }
}

impl Drop for PendingSubmission {
    fn drop(&mut self) {
        if let Some(permit) = self.permit.take() {
            tracing::warn!(submission_id = %self.submission_id, "Submission dropped before settlement");
            let _ = self.screen.fail(self.submission_id, ABORTED_REASON.to_string());
            drop(permit);
        }
    }
}

/// 待执行的网络阶段
enum SubmissionWork {
    Upload(PathBuf),
    /// 同步阶段抓到的帧；None 表示没有可用画面
    Frame(Option<ImagePayload>),
    ServerCapture,
}

/// 已进入 Pending、尚未结算的提交
pub struct StartedSubmission {
    pending: PendingSubmission,
    work: SubmissionWork,
}

impl StartedSubmission {
    pub fn submission_id(&self) -> SubmissionId {
        self.pending.submission_id
    }
}

/// SubmitInspection Handler - 单飞提交
pub struct SubmitInspectionHandler {
    guard: Arc<SubmissionGuard>,
    screen: Arc<dyn ScreenStatePort>,
    inspection: Arc<dyn InspectionServicePort>,
    media: Arc<dyn MediaSourcePort>,
    upload_policy: UploadPolicy,
    events: Arc<EventPublisher>,
}

impl SubmitInspectionHandler {
    pub fn new(
        guard: Arc<SubmissionGuard>,
        screen: Arc<dyn ScreenStatePort>,
        inspection: Arc<dyn InspectionServicePort>,
        media: Arc<dyn MediaSourcePort>,
        upload_policy: UploadPolicy,
        events: Arc<EventPublisher>,
    ) -> Self {
        Self {
            guard,
            screen,
            inspection,
            media,
            upload_policy,
            events,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitInspectionCommand,
    ) -> Result<SubmitOutcome, ApplicationError> {
        match self.begin(cmd)? {
            Some(started) => Ok(self.finish(started).await),
            None => Ok(SubmitOutcome::Dropped),
        }
    }

    /// 同步阶段：获取锁、抓拍、进入 Pending
    ///
    /// 锁被占用时返回 None（本次触发被丢弃）。返回的提交必须交给
    /// `finish` 结算；直接丢弃时按中止处理并释放锁。
    pub fn begin(
        &self,
        cmd: SubmitInspectionCommand,
    ) -> Result<Option<StartedSubmission>, ApplicationError> {
        let source = cmd.source();

        let Some(permit) = self.guard.try_acquire() else {
            tracing::debug!(source = %source, "Submission already in flight, trigger dropped");
            self.events.publish_submission_dropped(source);
            return Ok(None);
        };
        let submission_id = permit.submission_id();

        let (preview, work) = match cmd {
            SubmitInspectionCommand::Upload { path } => {
                (Some(upload_preview(&path)), SubmissionWork::Upload(path))
            }
            SubmitInspectionCommand::CameraCapture => {
                let payload = self.media.capture_frame();
                (
                    payload.as_ref().map(ImagePayload::to_active_preview),
                    SubmissionWork::Frame(payload),
                )
            }
            SubmitInspectionCommand::ServerCapture => (None, SubmissionWork::ServerCapture),
        };

        self.screen.begin(submission_id, source, preview)?;
        let pending = PendingSubmission {
            submission_id,
            screen: Arc::clone(&self.screen),
            permit: Some(permit),
        };

        tracing::info!(submission_id = %submission_id, source = %source, "Submission started");
        self.events.publish_submission_started(submission_id, source);

        Ok(Some(StartedSubmission { pending, work }))
    }

    /// 异步阶段：读取文件 / 调用检验服务，然后结算并释放锁
    pub async fn finish(&self, started: StartedSubmission) -> SubmitOutcome {
        let StartedSubmission { pending, work } = started;
        let submission_id = pending.submission_id;

        let outcome = match work {
            SubmissionWork::Upload(path) => match self.load_upload(&path).await {
                Ok(payload) => self.inspect(&payload).await,
                Err(reason) => Err(reason),
            },
            SubmissionWork::Frame(Some(payload)) => self.inspect(&payload).await,
            SubmissionWork::Frame(None) => Err(NO_FRAME_REASON.to_string()),
            SubmissionWork::ServerCapture => self
                .inspection
                .inspect_server_capture()
                .await
                .map_err(|e| e.to_string()),
        };

        let verdict = outcome.as_ref().ok().map(|result| match result.verdict() {
            ReportedVerdict::Known(verdict) => verdict.as_str().to_string(),
            ReportedVerdict::Unrecognized(raw) => raw.clone(),
        });

        let settled = pending.settle(outcome);
        match (&settled, verdict) {
            (SubmitOutcome::Succeeded { .. }, Some(verdict)) => {
                tracing::info!(submission_id = %submission_id, verdict = %verdict, "Submission succeeded");
                self.events.publish_submission_succeeded(submission_id, &verdict);
            }
            (SubmitOutcome::Failed { reason, .. }, _) => {
                tracing::warn!(submission_id = %submission_id, reason = %reason, "Submission failed");
                self.events.publish_submission_failed(submission_id, reason);
            }
            _ => {}
        }

        settled
    }

    async fn inspect(&self, payload: &ImagePayload) -> Result<InspectionResult, String> {
        tracing::debug!(
            file_name = %payload.file_name(),
            bytes = payload.len(),
            "Posting image to inspection service"
        );
        self.inspection
            .inspect(payload)
            .await
            .map_err(|e| e.to_string())
    }

    /// 读取并校验上传文件
    async fn load_upload(&self, path: &Path) -> Result<ImagePayload, String> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        if !metadata.is_file() {
            return Err(format!("Not a file: {}", path.display()));
        }
        self.upload_policy
            .check(path, metadata.len())
            .map_err(|e| e.to_string())?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        ImagePayload::from_upload(path, bytes).map_err(|e| e.to_string())
    }
}

fn upload_preview(path: &Path) -> ActivePreview {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    ActivePreview {
        name,
        source: ImageSource::UploadedFile,
        handle: PreviewHandle::File(path.to_path_buf()),
    }
}
