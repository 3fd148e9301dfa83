//! Store errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Aggregate overflow: {0}")]
    Overflow(String),

    #[error("Corrupt aggregate record: {0}")]
    Corrupt(String),

    #[error("Invalid table name: {0}")]
    InvalidTable(String),
}
