//! Configuration types

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Aggregate store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Bearer-token configuration
    #[serde(default)]
    pub security: SecurityConfig,

    /// Ingestion worker configuration
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            log_level: default_log_level(),
        }
    }
}

/// Which backend holds the aggregate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process map, lost on restart
    #[default]
    Memory,
    /// PostgreSQL table
    Postgres,
}

/// Aggregate store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: StoreBackend,

    /// Database URL, required for postgres
    #[serde(default)]
    pub url: Option<String>,

    /// Table holding the aggregate row
    #[serde(default = "default_table")]
    pub table: String,

    /// Fixed key of the aggregate record
    #[serde(default = "default_metric_id")]
    pub metric_id: String,

    /// Maximum pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: None,
            table: default_table(),
            metric_id: default_metric_id(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

/// Bearer-token configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Shared HMAC secret
    #[serde(default)]
    pub secret: String,

    /// Expected `iss` claim; unset or blank disables the check
    #[serde(default)]
    pub issuer: Option<String>,

    /// Lifetime of tokens minted by the `token` command
    #[serde(default = "default_expiration")]
    pub expiration_secs: u64,

    /// Clock skew tolerated on `exp`
    #[serde(default)]
    pub leeway_secs: u64,

    /// Allow anonymous reads of the report
    #[serde(default)]
    pub public_reports: bool,

    /// Roles allowed to read the report; empty means any authenticated caller
    #[serde(default)]
    pub required_roles: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: None,
            expiration_secs: default_expiration(),
            leeway_secs: 0,
            public_reports: false,
            required_roles: Vec::new(),
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("expiration_secs", &self.expiration_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("public_reports", &self.public_reports)
            .field("required_roles", &self.required_roles)
            .finish()
    }
}

/// Ingestion worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Concurrent workers draining the queue
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Messages fetched per receive
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Deliveries before a failing message is dead-lettered
    #[serde(default = "default_max_receive_count")]
    pub max_receive_count: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            batch_size: default_batch_size(),
            max_receive_count: default_max_receive_count(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_table() -> String {
    "loan_reports".to_string()
}

fn default_metric_id() -> String {
    "loan-approvals".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_expiration() -> u64 {
    3600
}

fn default_workers() -> usize {
    4
}

fn default_batch_size() -> usize {
    10
}

fn default_max_receive_count() -> u32 {
    5
}
