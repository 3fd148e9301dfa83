//! Worker pool draining a message source

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::processor::EventProcessor;
use crate::queue::{Message, MessageSource};

/// Pause after a failed `receive` before asking the source again
const RECEIVE_BACKOFF: Duration = Duration::from_millis(500);

/// Outcome counts across all workers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub acked: u64,
    pub nacked: u64,
}

impl IngestSummary {
    fn merge(self, other: IngestSummary) -> IngestSummary {
        IngestSummary {
            acked: self.acked + other.acked,
            nacked: self.nacked + other.nacked,
        }
    }
}

/// Handles to a running pool of ingestion workers.
///
/// Workers share nothing but the source and the processor; each message is
/// handled end-to-end by one worker.
pub struct IngestWorkers {
    handles: Vec<JoinHandle<IngestSummary>>,
}

impl IngestWorkers {
    /// Spawn `count` workers, each receiving up to `batch_size` messages at a time
    pub fn spawn(
        count: usize,
        batch_size: usize,
        source: Arc<dyn MessageSource>,
        processor: EventProcessor,
    ) -> Self {
        let handles = (0..count.max(1))
            .map(|worker_id| {
                let source = Arc::clone(&source);
                let processor = processor.clone();
                tokio::spawn(run_worker(worker_id, batch_size, source, processor))
            })
            .collect();

        tracing::info!(workers = count.max(1), batch_size, "ingest workers started");
        Self { handles }
    }

    /// Wait for every worker to finish (the source reported closed and drained)
    pub async fn join(self) -> IngestSummary {
        let mut summary = IngestSummary::default();
        for handle in self.handles {
            match handle.await {
                Ok(worker_summary) => summary = summary.merge(worker_summary),
                Err(e) => tracing::error!(error = %e, "ingest worker terminated abnormally"),
            }
        }
        summary
    }
}

async fn run_worker(
    worker_id: usize,
    batch_size: usize,
    source: Arc<dyn MessageSource>,
    processor: EventProcessor,
) -> IngestSummary {
    let mut summary = IngestSummary::default();

    loop {
        let batch = match source.receive(batch_size).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(worker_id, error = %e, "receive failed");
                tokio::time::sleep(RECEIVE_BACKOFF).await;
                continue;
            }
        };

        if batch.is_empty() {
            break;
        }

        for message in batch {
            let processed = process_isolated(&processor, message.clone()).await;

            let settled = if processed {
                source.ack(&message).await
            } else {
                source.nack(&message).await
            };

            match settled {
                Ok(()) if processed => summary.acked += 1,
                Ok(()) => summary.nacked += 1,
                Err(e) => {
                    tracing::warn!(worker_id, message_id = %message.id, error = %e, "failed to settle message")
                }
            }
        }
    }

    tracing::debug!(worker_id, acked = summary.acked, nacked = summary.nacked, "ingest worker stopped");
    summary
}

/// Run the processor on its own task so a panic fails the message
/// instead of killing the worker with the message still in flight.
async fn process_isolated(processor: &EventProcessor, message: Message) -> bool {
    let processor = processor.clone();
    let message_id = message.id.clone();

    match tokio::spawn(async move { processor.process(&message).await }).await {
        Ok(result) => result.is_ok(),
        Err(e) => {
            tracing::error!(message_id = %message_id, error = %e, "message processing panicked");
            false
        }
    }
}
