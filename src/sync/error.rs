use crate::document::DocumentError;
use sea_orm::DbErr;
use thiserror::Error;

/// Failures that abort a whole step. Per-record problems never surface here;
/// they are recorded in the step's [`StepReport`](super::report::StepReport).
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Relational store error: {0}")]
    Relational(#[from] DbErr),

    #[error("Document store error: {0}")]
    Document(#[from] DocumentError),

    #[error("Invalid maintenance window: {0}")]
    InvalidWindow(String),
}
