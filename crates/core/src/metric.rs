//! MetricId - the fixed key the aggregate lives under

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when building a metric id
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricIdError {
    #[error("Metric id cannot be empty")]
    Empty,
}

/// Key of the single aggregate record.
///
/// Fixed per deployment; the store never writes under any other key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MetricId(String);

impl MetricId {
    /// Default key used when none is configured
    pub const DEFAULT: &'static str = "loan-approvals";

    /// Create a metric id, rejecting blank values
    pub fn new(value: impl Into<String>) -> Result<Self, MetricIdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(MetricIdError::Empty);
        }
        Ok(Self(value))
    }

    /// Borrow the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MetricId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MetricId {
    type Error = MetricIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MetricId> for String {
    fn from(id: MetricId) -> Self {
        id.0
    }
}
