//! History Context - Errors

use thiserror::Error;

use super::RecordId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryDomainError {
    #[error("unknown history range: {0:?} (expected day, week, month or year)")]
    InvalidRange(String),

    #[error("invalid history date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("history record {0} is not in the current result set")]
    UnknownRecord(RecordId),
}
