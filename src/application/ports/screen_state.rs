//! Screen State Port - 检验界面状态存储

use crate::domain::inspection::{
    ActivePreview, ImageSource, InspectionDomainError, InspectionResult, InspectionScreen,
    SubmissionId,
};

/// 检验界面状态
///
/// 所有转换都是同步的，由 InspectionScreen 聚合保证不变量
pub trait ScreenStatePort: Send + Sync {
    /// 进入 Pending（清除旧结果与错误，记录预览）
    fn begin(
        &self,
        submission_id: SubmissionId,
        source: ImageSource,
        preview: Option<ActivePreview>,
    ) -> Result<(), InspectionDomainError>;

    fn succeed(
        &self,
        submission_id: SubmissionId,
        result: InspectionResult,
    ) -> Result<(), InspectionDomainError>;

    fn fail(&self, submission_id: SubmissionId, reason: String)
        -> Result<(), InspectionDomainError>;

    /// 当前状态快照
    fn snapshot(&self) -> InspectionScreen;
}
