//! PostgreSQL aggregate backend
//!
//! One row per metric key. A delta is a single `INSERT ... ON CONFLICT DO
//! UPDATE` statement, so the increment and the accumulate happen inside the
//! database under the row lock.
//!
//! NUMERIC is wider than `Decimal`, so the update is guarded: a sum outside
//! `Decimal`'s range matches no row and surfaces as `StorageError::Overflow`
//! instead of being stored and breaking every later read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loanstats_core::{Aggregate, MetricId};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::error::StorageError;
use crate::store::AggregateStore;

/// Connection settings for [`PgAggregateStore::connect`]
#[derive(Debug, Clone)]
pub struct PgStoreOptions {
    pub url: String,
    pub table: String,
    pub metric_id: MetricId,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

/// PostgreSQL-backed aggregate store
pub struct PgAggregateStore {
    pool: PgPool,
    table: String,
    metric_id: MetricId,
}

impl PgAggregateStore {
    /// Wrap an existing pool
    pub fn new(
        pool: PgPool,
        table: impl Into<String>,
        metric_id: MetricId,
    ) -> Result<Self, StorageError> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self {
            pool,
            table,
            metric_id,
        })
    }

    /// Connect, then create the table if it does not exist
    pub async fn connect(options: PgStoreOptions) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect(&options.url)
            .await?;

        let store = Self::new(pool, options.table, options.metric_id)?;
        store.init().await?;

        tracing::info!(table = %store.table, metric_id = %store.metric_id, "postgres aggregate store ready");
        Ok(store)
    }

    /// Initialize the schema
    pub async fn init(&self) -> Result<(), StorageError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                metric_id TEXT PRIMARY KEY,
                count BIGINT NOT NULL DEFAULT 0,
                total_amount_cents NUMERIC NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            )
            "#,
            self.table
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

}

#[async_trait]
impl AggregateStore for PgAggregateStore {
    fn metric_id(&self) -> &MetricId {
        &self.metric_id
    }

    async fn apply_delta(&self, amount: Decimal) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(&format!(
            r#"
            INSERT INTO {table} (metric_id, count, total_amount_cents, updated_at)
            VALUES ($1, 1, $2, $3)
            ON CONFLICT (metric_id) DO UPDATE SET
                count = COALESCE({table}.count, 0) + 1,
                total_amount_cents = COALESCE({table}.total_amount_cents, 0) + EXCLUDED.total_amount_cents,
                updated_at = EXCLUDED.updated_at
            WHERE ABS(COALESCE({table}.total_amount_cents, 0) + EXCLUDED.total_amount_cents) <= $4
            "#,
            table = self.table
        ))
        .bind(self.metric_id.as_str())
        .bind(amount)
        .bind(&now)
        .bind(Decimal::MAX)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Overflow(format!(
                "adding {} to '{}' leaves the decimal range",
                amount, self.metric_id
            )));
        }

        Ok(())
    }

    async fn get(&self) -> Result<Option<Aggregate>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT metric_id, count, total_amount_cents, updated_at FROM {} WHERE metric_id = $1",
            self.table
        ))
        .bind(self.metric_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let count: i64 = row.try_get("count")?;
        let count = u64::try_from(count)
            .map_err(|_| StorageError::Corrupt(format!("negative count {}", count)))?;
        let total_amount_cents: Decimal = row.try_get("total_amount_cents")?;
        let updated_at: String = row.try_get("updated_at")?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map_err(|e| StorageError::Corrupt(format!("updated_at '{}': {}", updated_at, e)))?
            .with_timezone(&Utc);

        Ok(Some(Aggregate {
            metric_id: self.metric_id.clone(),
            count,
            total_amount_cents,
            updated_at,
        }))
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass
pub fn validate_table_name(table: &str) -> Result<(), StorageError> {
    let mut chars = table.chars();
    let valid_start = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest && table.len() <= 63 {
        Ok(())
    } else {
        Err(StorageError::InvalidTable(table.to_string()))
    }
}
