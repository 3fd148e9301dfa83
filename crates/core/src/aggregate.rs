//! Aggregate - running count and total of approved loan amounts
//!
//! Exactly one aggregate exists per metric key. It is created implicitly by
//! the first applied delta and only ever mutated by the store's atomic
//! upsert.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metric::MetricId;

/// Errors that can occur when applying a delta
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Total overflow: {total} + {amount} is out of range")]
    TotalOverflow { total: Decimal, amount: Decimal },

    #[error("Count overflow")]
    CountOverflow,
}

/// Snapshot of the aggregate record as read from the store.
///
/// # Example
/// ```
/// use loanstats_core::{Aggregate, MetricId};
/// use rust_decimal::Decimal;
///
/// let agg = Aggregate::empty(MetricId::default(), chrono::Utc::now());
/// let agg = agg.with_delta(Decimal::new(15000, 2), chrono::Utc::now()).unwrap();
/// assert_eq!(agg.count, 1);
/// assert_eq!(agg.total_amount_cents, Decimal::new(150, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    /// Fixed record key
    pub metric_id: MetricId,
    /// Number of deltas ever applied
    pub count: u64,
    /// Sum of all applied deltas
    pub total_amount_cents: Decimal,
    /// Wall-clock time of the last applied delta
    pub updated_at: DateTime<Utc>,
}

impl Aggregate {
    /// Zero-valued aggregate, the state a backend starts from when the key is absent
    pub fn empty(metric_id: MetricId, now: DateTime<Utc>) -> Self {
        Self {
            metric_id,
            count: 0,
            total_amount_cents: Decimal::ZERO,
            updated_at: now,
        }
    }

    /// Apply one delta in place: `count += 1`, `total += amount`, `updated_at = now`.
    ///
    /// Only backends call this, inside their own atomic section. On overflow
    /// the record is left untouched.
    pub fn apply(&mut self, amount: Decimal, now: DateTime<Utc>) -> Result<(), AggregateError> {
        let total = self.total_amount_cents.checked_add(amount).ok_or(
            AggregateError::TotalOverflow {
                total: self.total_amount_cents,
                amount,
            },
        )?;
        let count = self.count.checked_add(1).ok_or(AggregateError::CountOverflow)?;

        self.count = count;
        self.total_amount_cents = total;
        self.updated_at = now;
        Ok(())
    }

    /// By-value form of [`Aggregate::apply`]
    pub fn with_delta(mut self, amount: Decimal, now: DateTime<Utc>) -> Result<Self, AggregateError> {
        self.apply(amount, now)?;
        Ok(self)
    }
}
