//! Loanstats Config - Configuration management
//!
//! A TOML file is parsed, environment overrides are applied, then the
//! result is validated once at startup.

#![warn(missing_docs)]

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader};
pub use types::{
    AppConfig, IngestConfig, SecurityConfig, ServerConfig, StoreBackend, StoreConfig,
};
