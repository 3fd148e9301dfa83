//! Loanstats Core - Domain types
//!
//! This crate contains the types shared by every other crate:
//! - `Aggregate`: the single running approval metric
//! - `MetricId`: the fixed key the aggregate is stored under

pub mod aggregate;
pub mod metric;

pub use aggregate::{Aggregate, AggregateError};
pub use metric::{MetricId, MetricIdError};
