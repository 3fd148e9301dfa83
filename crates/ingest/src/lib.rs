//! Loanstats Ingest - queue messages to aggregate deltas
//!
//! - `MessageSource`: the transport seam (receive / ack / nack)
//! - `MemoryQueue`: in-process source with redelivery and dead letters
//! - `EventProcessor`: decode one payload and apply its amount
//! - `IngestWorkers`: a pool of tasks draining a source
//!
//! Retries belong to the transport: a failed message is nacked and the
//! source decides whether to redeliver it.

pub mod error;
pub mod event;
pub mod processor;
pub mod queue;
pub mod worker;

pub use error::IngestError;
pub use event::ApprovalEvent;
pub use processor::EventProcessor;
pub use queue::{MemoryQueue, Message, MessageSource};
pub use worker::{IngestSummary, IngestWorkers};
