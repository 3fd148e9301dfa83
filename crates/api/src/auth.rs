//! Bearer authentication and report access policy
//!
//! `authenticate` runs on every request and attaches a [`Principal`] when the
//! `Authorization` header carries a valid token. It never rejects; that is
//! left to `require_report_access` on the protected routes.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use loanstats_auth::Principal;

use crate::state::AppState;

/// Who may read the report
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    /// Anonymous reads allowed
    pub public_reports: bool,
    /// Empty means any authenticated principal
    pub required_roles: Vec<String>,
}

/// Outcome of checking one request against the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Unauthenticated,
    Forbidden,
}

impl AccessPolicy {
    pub fn new(public_reports: bool, required_roles: Vec<String>) -> Self {
        Self {
            public_reports,
            required_roles,
        }
    }

    pub fn decide(&self, principal: Option<&Principal>) -> AccessDecision {
        if self.public_reports {
            return AccessDecision::Allow;
        }

        match principal {
            None => AccessDecision::Unauthenticated,
            Some(_) if self.required_roles.is_empty() => AccessDecision::Allow,
            Some(p) if p.has_any_role(&self.required_roles) => AccessDecision::Allow,
            Some(_) => AccessDecision::Forbidden,
        }
    }
}

/// Attach the request's principal, if any
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if let Some(principal) = state.authenticator.authenticate_header(header) {
        req.extensions_mut().insert(principal);
    }

    next.run(req).await
}

/// Reject requests the access policy does not allow, with an empty body
pub async fn require_report_access(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let principal = req.extensions().get::<Principal>();

    match state.policy.decide(principal) {
        AccessDecision::Allow => next.run(req).await,
        AccessDecision::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
        AccessDecision::Forbidden => {
            tracing::debug!(
                subject = principal.map(Principal::subject),
                "principal lacks a required role"
            );
            StatusCode::FORBIDDEN.into_response()
        }
    }
}
