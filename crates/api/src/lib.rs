//! Loanstats API - HTTP read side
//!
//! - `GET /health`: liveness, always public
//! - `GET /api/v1/reports`: the current aggregate, guarded by [`AccessPolicy`]

pub mod auth;
pub mod envelope;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::{AccessDecision, AccessPolicy};
pub use envelope::ApiResponse;
pub use routes::{create_router, REPORTS_PATH};
pub use state::AppState;
