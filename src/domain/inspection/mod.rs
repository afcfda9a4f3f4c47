//! Inspection Context - 检验限界上下文
//!
//! 职责:
//! - 图像载荷与预览
//! - 检验结果（按重量或按数量两种形态）
//! - 请求状态机与单飞提交锁

mod errors;
mod guard;
mod request_state;
mod result;
mod value_objects;

pub use errors::InspectionDomainError;
pub use guard::{SubmissionGuard, SubmissionPermit};
pub use request_state::{InspectionScreen, RequestState};
pub use result::{Breakdown, InspectionResult, ResultImages};
pub use value_objects::{
    content_type_for, ActivePreview, CategoryMeasure, ImagePayload, ImageSource,
    MeasurementKind, Percentage, PreviewHandle, RatioScale, ReportedVerdict, SubmissionId,
    UploadPolicy, Verdict,
};
