//! EventProcessor - one message in, one aggregate delta out

use loanstats_report::ReportAggregator;

use crate::error::IngestError;
use crate::event::ApprovalEvent;
use crate::queue::Message;

/// Decodes a message and applies its approved amount.
///
/// Every decoded event is applied whatever its `status`.
#[derive(Clone)]
pub struct EventProcessor {
    aggregator: ReportAggregator,
}

impl EventProcessor {
    pub fn new(aggregator: ReportAggregator) -> Self {
        Self { aggregator }
    }

    /// Process one message. An `Err` means the message must be nacked.
    pub async fn process(&self, message: &Message) -> Result<(), IngestError> {
        match self.apply(message).await {
            Ok(()) => {
                tracing::info!(message_id = %message.id, "report saved");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    message_id = %message.id,
                    receive_count = message.receive_count,
                    error = %e,
                    "failed to process message"
                );
                Err(e)
            }
        }
    }

    async fn apply(&self, message: &Message) -> Result<(), IngestError> {
        let event: ApprovalEvent =
            serde_json::from_str(&message.body).map_err(|source| IngestError::Decode {
                message_id: message.id.clone(),
                source,
            })?;

        tracing::info!(
            message_id = %message.id,
            status = event.status.as_deref().unwrap_or("<none>"),
            approved_amount = ?event.approved_amount,
            "payload received"
        );

        self.aggregator.apply(event.approved_amount).await?;
        Ok(())
    }
}
