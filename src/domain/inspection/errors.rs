//! Inspection Context - Errors

use thiserror::Error;

use super::SubmissionId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InspectionDomainError {
    #[error("unrecognized verdict: {0:?}")]
    UnrecognizedVerdict(String),

    #[error("invalid measurement: {0}")]
    InvalidMeasurement(String),

    #[error("response mixes weight-based and count-based measurements")]
    MixedMeasurementKinds,

    #[error("response carries neither total_weight nor total_count")]
    MissingTotal,

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("image is {size} bytes, maximum is {max} bytes")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("image is empty")]
    EmptyPayload,

    #[error("submission {submission_id} is still pending")]
    SubmissionInFlight { submission_id: SubmissionId },

    #[error("submission {submission_id} is not the pending submission")]
    NotPending { submission_id: SubmissionId },
}
