//! In-process aggregate backend
//!
//! Records live in a sharded concurrent map. A delta is applied while the
//! entry's shard lock is held, which is this backend's atomic upsert.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use loanstats_core::{Aggregate, MetricId};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::StorageError;
use crate::store::AggregateStore;

/// In-memory aggregate store, for local runs and tests
pub struct MemoryAggregateStore {
    metric_id: MetricId,
    records: DashMap<String, Aggregate>,
    unavailable: AtomicBool,
}

impl MemoryAggregateStore {
    /// Create an empty store for the given key
    pub fn new(metric_id: MetricId) -> Self {
        Self {
            metric_id,
            records: DashMap::new(),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulate a backend outage: every call fails while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "memory backend marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryAggregateStore {
    fn default() -> Self {
        Self::new(MetricId::default())
    }
}

#[async_trait]
impl AggregateStore for MemoryAggregateStore {
    fn metric_id(&self) -> &MetricId {
        &self.metric_id
    }

    async fn apply_delta(&self, amount: Decimal) -> Result<(), StorageError> {
        self.check_available()?;

        let now = Utc::now();
        match self.records.entry(self.metric_id.as_str().to_string()) {
            Entry::Occupied(mut entry) => entry
                .get_mut()
                .apply(amount, now)
                .map_err(|e| StorageError::Overflow(e.to_string()))?,
            Entry::Vacant(entry) => {
                let created = Aggregate::empty(self.metric_id.clone(), now)
                    .with_delta(amount, now)
                    .map_err(|e| StorageError::Overflow(e.to_string()))?;
                entry.insert(created);
            }
        }

        tracing::trace!(metric_id = %self.metric_id, %amount, "delta applied");
        Ok(())
    }

    async fn get(&self) -> Result<Option<Aggregate>, StorageError> {
        self.check_available()?;

        Ok(self
            .records
            .get(self.metric_id.as_str())
            .map(|entry| entry.value().clone()))
    }
}
