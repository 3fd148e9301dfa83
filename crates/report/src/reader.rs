//! ReportReader - fetches the current aggregate

use loanstats_core::Aggregate;
use loanstats_store::AggregateStore;
use std::sync::Arc;

use crate::error::ReportError;

/// Reads the aggregate straight from the store, no caching
#[derive(Clone)]
pub struct ReportReader {
    store: Arc<dyn AggregateStore>,
}

impl ReportReader {
    pub fn new(store: Arc<dyn AggregateStore>) -> Self {
        Self { store }
    }

    /// `Ok(None)` means nothing has been aggregated yet, which is not an error
    pub async fn fetch(&self) -> Result<Option<Aggregate>, ReportError> {
        let aggregate = self.store.get().await?;

        if let Some(ref agg) = aggregate {
            if &agg.metric_id != self.store.metric_id() {
                return Err(ReportError::Internal(format!(
                    "store returned metric '{}' while configured for '{}'",
                    agg.metric_id,
                    self.store.metric_id()
                )));
            }
        }

        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use loanstats_core::MetricId;
    use loanstats_store::{MemoryAggregateStore, StorageError};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_absent_is_distinct_from_zero() {
        let store = Arc::new(MemoryAggregateStore::default());
        let reader = ReportReader::new(store.clone());

        assert!(reader.fetch().await.unwrap().is_none());

        store.apply_delta(Decimal::ZERO).await.unwrap();
        let agg = reader.fetch().await.unwrap().unwrap();
        assert_eq!(agg.count, 1);
        assert_eq!(agg.total_amount_cents, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_reads_are_not_cached() {
        let store = Arc::new(MemoryAggregateStore::default());
        let reader = ReportReader::new(store.clone());

        store.apply_delta(dec!(10)).await.unwrap();
        assert_eq!(reader.fetch().await.unwrap().unwrap().count, 1);

        store.apply_delta(dec!(10)).await.unwrap();
        assert_eq!(reader.fetch().await.unwrap().unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let store = Arc::new(MemoryAggregateStore::default());
        store.set_unavailable(true);
        let reader = ReportReader::new(store);

        assert!(matches!(reader.fetch().await, Err(ReportError::Storage(_))));
    }

    /// Answers for a key other than the one it claims to hold
    struct ForeignRecordStore {
        metric_id: MetricId,
    }

    #[async_trait]
    impl AggregateStore for ForeignRecordStore {
        fn metric_id(&self) -> &MetricId {
            &self.metric_id
        }

        async fn apply_delta(&self, _amount: Decimal) -> Result<(), StorageError> {
            Ok(())
        }

        async fn get(&self) -> Result<Option<Aggregate>, StorageError> {
            let other = MetricId::new("loan-rejections").unwrap();
            Ok(Some(Aggregate::empty(other, Utc::now())))
        }
    }

    #[tokio::test]
    async fn test_foreign_record_is_internal_error() {
        let reader = ReportReader::new(Arc::new(ForeignRecordStore {
            metric_id: MetricId::default(),
        }));

        assert!(matches!(reader.fetch().await, Err(ReportError::Internal(_))));
    }
}
