//! API Handlers

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use loanstats_core::Aggregate;

use crate::envelope::ApiResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().timestamp()
    }))
}

/// Current loan-approval aggregate
pub async fn get_report(State(state): State<AppState>, uri: Uri) -> Response {
    match state.reader.fetch().await {
        Ok(Some(aggregate)) => (
            StatusCode::OK,
            ApiResponse::ok("Report retrieved", aggregate, uri.path()),
        )
            .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "report read failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::<Aggregate>::fail("Internal error", e.to_string(), uri.path()),
            )
                .into_response()
        }
    }
}
