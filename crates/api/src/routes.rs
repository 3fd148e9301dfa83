//! API Routes

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers;
use crate::state::AppState;

pub const REPORTS_PATH: &str = "/api/v1/reports";

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let reports = Router::new()
        .route(REPORTS_PATH, get(handlers::get_report))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_report_access,
        ));

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .merge(reports)
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), auth::authenticate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
