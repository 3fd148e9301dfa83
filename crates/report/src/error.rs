//! Report use case errors

use loanstats_store::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}
