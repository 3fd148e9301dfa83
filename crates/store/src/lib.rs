//! Loanstats Store - the single durable aggregate record
//!
//! Every backend applies a delta as ONE backend-side atomic operation.
//! Callers never read the record to compute the next value.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::StorageError;
pub use memory::MemoryAggregateStore;
pub use postgres::{PgAggregateStore, PgStoreOptions};
pub use store::AggregateStore;
