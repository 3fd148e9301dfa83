//! Loanstats Report - use cases over the aggregate store
//!
//! - `ReportAggregator`: validates a delta and forwards it to the store
//! - `ReportReader`: fetches the current aggregate

pub mod aggregator;
pub mod error;
pub mod reader;

pub use aggregator::ReportAggregator;
pub use error::ReportError;
pub use reader::ReportReader;
