//! Ingestion errors

use loanstats_report::ReportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to decode message {message_id}: {source}")]
    Decode {
        message_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Queue closed")]
    QueueClosed,

    #[error("Message source error: {0}")]
    Source(String),
}
