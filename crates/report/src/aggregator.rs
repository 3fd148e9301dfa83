//! ReportAggregator - applies one approved amount to the aggregate

use loanstats_store::AggregateStore;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::error::ReportError;

/// Forwards validated deltas to the store, one persisted delta per call
#[derive(Clone)]
pub struct ReportAggregator {
    store: Arc<dyn AggregateStore>,
}

impl ReportAggregator {
    pub fn new(store: Arc<dyn AggregateStore>) -> Self {
        Self { store }
    }

    /// Apply an approved amount.
    ///
    /// A missing amount is a validation error; anything else goes to the
    /// store as-is, including zero and negative values.
    pub async fn apply(&self, amount: Option<Decimal>) -> Result<(), ReportError> {
        let amount = amount.ok_or_else(|| {
            ReportError::Validation("approvedAmount must not be null".to_string())
        })?;

        self.store.apply_delta(amount).await?;
        tracing::debug!(metric_id = %self.store.metric_id(), %amount, "aggregate updated");
        Ok(())
    }
}
