//! Configuration loader
//!
//! Parse TOML, apply `LOANSTATS_*` environment overrides, then validate.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::{AppConfig, StoreBackend};

/// Override for `server.listen`
pub const ENV_LISTEN: &str = "LOANSTATS_LISTEN";
/// Override for `store.url`; also switches the backend to postgres
pub const ENV_DATABASE_URL: &str = "LOANSTATS_DATABASE_URL";
/// Override for `security.secret`
pub const ENV_JWT_SECRET: &str = "LOANSTATS_JWT_SECRET";
/// Override for `security.issuer`
pub const ENV_JWT_ISSUER: &str = "LOANSTATS_JWT_ISSUER";

/// Shortest accepted HMAC secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found
    #[error("config file not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Environment override could not be parsed
    #[error("invalid value for {key}: {value}")]
    InvalidEnv {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },

    /// Validation error
    #[error("validation error: {0}")]
    Validation(String),
}

/// Loads, overrides and validates [`AppConfig`]
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from file, with environment overrides
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let mut loader = Self::load_str(&content)?;
        loader.config_path = Some(path.to_path_buf());

        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(loader)
    }

    /// Like [`ConfigLoader::load_file`], but a missing file means defaults
    pub fn load_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if path.exists() {
            Self::load_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::from_config(AppConfig::default())
        }
    }

    /// Load configuration from string, with environment overrides
    pub fn load_str(content: &str) -> Result<Self, ConfigError> {
        Self::load_str_with_env(content, |key| std::env::var(key).ok())
    }

    /// Load configuration from string, reading overrides through `lookup`
    pub fn load_str_with_env<F>(content: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config: AppConfig = toml::from_str(content)?;
        Self::build(config, lookup)
    }

    /// Wrap an in-memory configuration, with environment overrides
    pub fn from_config(config: AppConfig) -> Result<Self, ConfigError> {
        Self::build(config, |key| std::env::var(key).ok())
    }

    fn build<F>(mut config: AppConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::apply_overrides(&mut config, lookup)?;
        Self::validate(&config)?;

        Ok(Self {
            config,
            config_path: None,
        })
    }

    /// Current configuration
    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    /// Take the configuration out of the loader
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// File the configuration came from, if any
    pub fn path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_LISTEN) {
            config.server.listen = value.parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_LISTEN,
                value,
            })?;
        }

        if let Some(url) = lookup(ENV_DATABASE_URL) {
            config.store.backend = StoreBackend::Postgres;
            config.store.url = Some(url);
        }

        if let Some(secret) = lookup(ENV_JWT_SECRET) {
            config.security.secret = secret;
        }

        if let Some(issuer) = lookup(ENV_JWT_ISSUER) {
            config.security.issuer = Some(issuer);
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
        let secret_len = config.security.secret.len();
        if secret_len < MIN_SECRET_LEN {
            return Err(ConfigError::Validation(format!(
                "security.secret must be at least {} bytes, got {}",
                MIN_SECRET_LEN, secret_len
            )));
        }

        if config.store.backend == StoreBackend::Postgres
            && config.store.url.as_deref().map_or(true, |url| url.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "store.url is required for the postgres backend".to_string(),
            ));
        }

        if !is_plain_identifier(&config.store.table) {
            return Err(ConfigError::Validation(format!(
                "store.table '{}' is not a plain identifier",
                config.store.table
            )));
        }

        if config.store.metric_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store.metric_id must not be empty".to_string(),
            ));
        }

        if config.store.max_connections == 0 {
            return Err(ConfigError::Validation(
                "store.max_connections must be at least 1".to_string(),
            ));
        }

        if config.ingest.workers == 0 {
            return Err(ConfigError::Validation(
                "ingest.workers must be at least 1".to_string(),
            ));
        }

        if config.ingest.batch_size == 0 {
            return Err(ConfigError::Validation(
                "ingest.batch_size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');

    valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && name.len() <= 63
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const SECRET: &str = "QnE1T2lXbVRhV3RzR2VOUXlHaFZ2d2dyU2p2a1R2TnM=";

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn minimal() -> String {
        format!("[security]\nsecret = \"{}\"\n", SECRET)
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let loader = ConfigLoader::load_str_with_env(&minimal(), no_env).unwrap();
        let config = loader.get();

        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.table, "loan_reports");
        assert_eq!(config.store.metric_id, "loan-approvals");
        assert_eq!(config.store.max_connections, 5);
        assert_eq!(config.security.expiration_secs, 3600);
        assert!(!config.security.public_reports);
        assert!(config.security.required_roles.is_empty());
        assert_eq!(config.ingest.workers, 4);
        assert_eq!(config.ingest.batch_size, 10);
        assert_eq!(config.ingest.max_receive_count, 5);
    }

    #[test]
    fn test_load_full_document() {
        let toml = format!(
            r#"
            [server]
            listen = "127.0.0.1:9000"
            log_level = "debug"

            [store]
            backend = "postgres"
            url = "postgres://localhost/loans"
            table = "reports"

            [security]
            secret = "{}"
            issuer = "autenticacion-service"
            public_reports = true
            required_roles = ["ADMIN", "ASESOR"]

            [ingest]
            workers = 2
            "#,
            SECRET
        );

        let config = ConfigLoader::load_str_with_env(&toml, no_env)
            .unwrap()
            .into_config();

        assert_eq!(config.server.listen.port(), 9000);
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(config.store.url.as_deref(), Some("postgres://localhost/loans"));
        assert_eq!(config.store.table, "reports");
        assert_eq!(config.security.issuer.as_deref(), Some("autenticacion-service"));
        assert!(config.security.public_reports);
        assert_eq!(config.security.required_roles, vec!["ADMIN", "ASESOR"]);
        assert_eq!(config.ingest.workers, 2);
        assert_eq!(config.ingest.batch_size, 10);
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = ConfigLoader::load_str_with_env("[security]\nsecret = \"short\"\n", no_env);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_postgres_requires_url() {
        let toml = format!("{}\n[store]\nbackend = \"postgres\"\n", minimal());
        let result = ConfigLoader::load_str_with_env(&toml, no_env);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_invalid_table_rejected() {
        let toml = format!("{}\n[store]\ntable = \"reports; DROP TABLE x\"\n", minimal());
        let result = ConfigLoader::load_str_with_env(&toml, no_env);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let toml = format!("{}\n[ingest]\nworkers = 0\n", minimal());
        let result = ConfigLoader::load_str_with_env(&toml, no_env);
        assert!(matches!(result, Err(ConfigError::Validation(_))));

        let toml = format!("{}\n[ingest]\nbatch_size = 0\n", minimal());
        let result = ConfigLoader::load_str_with_env(&toml, no_env);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let toml = format!("{}\n[store]\nbackend = \"dynamo\"\n", minimal());
        let result = ConfigLoader::load_str_with_env(&toml, no_env);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_LISTEN, "127.0.0.1:7070"),
            (ENV_DATABASE_URL, "postgres://db/loans"),
            (ENV_JWT_SECRET, SECRET),
            (ENV_JWT_ISSUER, "autenticacion-service"),
        ]
        .into_iter()
        .collect();

        let config = ConfigLoader::load_str_with_env("", |key| env.get(key).map(|v| v.to_string()))
            .unwrap()
            .into_config();

        assert_eq!(config.server.listen.port(), 7070);
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(config.store.url.as_deref(), Some("postgres://db/loans"));
        assert_eq!(config.security.secret, SECRET);
        assert_eq!(config.security.issuer.as_deref(), Some("autenticacion-service"));
    }

    #[test]
    fn test_bad_listen_override() {
        let result = ConfigLoader::load_str_with_env(&minimal(), |key| {
            (key == ENV_LISTEN).then(|| "not-an-address".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv { key: ENV_LISTEN, .. })
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", minimal()).unwrap();

        let loader = ConfigLoader::load_file(file.path()).unwrap();
        assert_eq!(loader.path(), Some(file.path()));
        assert_eq!(loader.get().security.secret, SECRET);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(
            ConfigLoader::load_file(&path),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let config = ConfigLoader::load_str_with_env(&minimal(), no_env)
            .unwrap()
            .into_config();
        let rendered = format!("{:?}", config.security);
        assert!(!rendered.contains(SECRET));
    }
}
