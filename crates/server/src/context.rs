//! Application context - wires everything together
//!
//! Built once at startup: store, use cases, authenticator. Everything
//! downstream receives its collaborators through constructors.

use loanstats_api::{AccessPolicy, AppState};
use loanstats_auth::{AuthConfigError, JwtSettings, TokenAuthenticator, TokenIssuer};
use loanstats_config::{AppConfig, StoreBackend};
use loanstats_core::MetricId;
use loanstats_ingest::{EventProcessor, IngestWorkers, MessageSource};
use loanstats_report::{ReportAggregator, ReportReader};
use loanstats_store::{AggregateStore, MemoryAggregateStore, PgAggregateStore, PgStoreOptions};
use std::sync::Arc;
use std::time::Duration;

/// Application context - wires together all components
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn AggregateStore>,
    pub aggregator: ReportAggregator,
    pub reader: ReportReader,
    pub authenticator: Arc<TokenAuthenticator>,
    settings: JwtSettings,
}

impl AppContext {
    /// Create a new application context, connecting the configured backend
    pub async fn new(config: AppConfig) -> Result<Self, anyhow::Error> {
        let metric_id = MetricId::new(config.store.metric_id.clone())?;

        let store: Arc<dyn AggregateStore> = match config.store.backend {
            StoreBackend::Memory => {
                tracing::info!(metric_id = %metric_id, "using in-memory aggregate store");
                Arc::new(MemoryAggregateStore::new(metric_id))
            }
            StoreBackend::Postgres => {
                let url = config
                    .store
                    .url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("store.url is required for postgres"))?;
                let options = PgStoreOptions {
                    url,
                    table: config.store.table.clone(),
                    metric_id,
                    max_connections: config.store.max_connections,
                    acquire_timeout: Duration::from_secs(config.store.acquire_timeout_secs),
                };
                Arc::new(PgAggregateStore::connect(options).await?)
            }
        };

        Self::with_store(config, store)
    }

    /// Create a context around an existing store
    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn AggregateStore>,
    ) -> Result<Self, anyhow::Error> {
        let settings = jwt_settings(&config)?;

        Ok(Self {
            aggregator: ReportAggregator::new(Arc::clone(&store)),
            reader: ReportReader::new(Arc::clone(&store)),
            authenticator: Arc::new(TokenAuthenticator::new(&settings)),
            store,
            settings,
            config,
        })
    }

    /// Router state for the HTTP API
    pub fn app_state(&self) -> AppState {
        let policy = AccessPolicy::new(
            self.config.security.public_reports,
            self.config.security.required_roles.clone(),
        );
        AppState::new(self.reader.clone(), Arc::clone(&self.authenticator), policy)
    }

    /// Token minter sharing the authenticator's secret and issuer
    pub fn token_issuer(&self) -> TokenIssuer {
        TokenIssuer::new(&self.settings)
    }

    /// Start the configured number of ingest workers over `source`
    pub fn spawn_workers(&self, source: Arc<dyn MessageSource>) -> IngestWorkers {
        IngestWorkers::spawn(
            self.config.ingest.workers,
            self.config.ingest.batch_size,
            source,
            EventProcessor::new(self.aggregator.clone()),
        )
    }
}

/// Translate the security section into verifier settings
pub fn jwt_settings(config: &AppConfig) -> Result<JwtSettings, AuthConfigError> {
    let security = &config.security;
    Ok(JwtSettings::new(security.secret.clone())?
        .with_issuer(security.issuer.clone())
        .with_expiration_secs(security.expiration_secs)
        .with_leeway_secs(security.leeway_secs))
}
