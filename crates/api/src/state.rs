//! Application state

use loanstats_auth::TokenAuthenticator;
use loanstats_report::ReportReader;
use std::sync::Arc;

use crate::auth::AccessPolicy;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub reader: ReportReader,
    pub authenticator: Arc<TokenAuthenticator>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(
        reader: ReportReader,
        authenticator: Arc<TokenAuthenticator>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            reader,
            authenticator,
            policy: Arc::new(policy),
        }
    }
}
