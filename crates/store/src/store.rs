//! AggregateStore trait

use async_trait::async_trait;
use loanstats_core::{Aggregate, MetricId};
use rust_decimal::Decimal;

use crate::error::StorageError;

/// Durable home of the aggregate record.
///
/// Implementations must be safe under arbitrary concurrent calls against the
/// same key. The delta is applied by the backend itself, never as a
/// read-modify-write issued by the caller.
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Key the aggregate is stored under
    fn metric_id(&self) -> &MetricId;

    /// Atomically apply `count += 1; total += amount; updated_at = now`,
    /// creating the record at zero first if it is absent.
    ///
    /// Not idempotent: applying the same delta twice counts it twice.
    async fn apply_delta(&self, amount: Decimal) -> Result<(), StorageError>;

    /// Strongly-consistent read of the record.
    ///
    /// Returns `None` if no delta has ever been applied.
    async fn get(&self) -> Result<Option<Aggregate>, StorageError>;
}
