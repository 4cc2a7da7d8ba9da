mod dashboard;
mod groups;
mod health;
mod study;
mod words;

use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::response::{not_found_route, AppError};
use crate::state::AppState;

pub(crate) const INVALID_BODY: &str = "Invalid request body";

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest("/api/dashboard", dashboard::router())
        .nest("/api/words", words::router())
        .nest("/api/groups", groups::router())
        .nest("/api/study_sessions", study::sessions_router())
        .nest("/api/study_activities", study::activities_router())
        .fallback(fallback_handler)
        .with_state(state)
}

/// Parses a path segment as an integer id, rejecting it with `message` otherwise.
pub(crate) fn parse_id(raw: &str, message: &'static str) -> Result<i64, AppError> {
    raw.trim().parse::<i64>().map_err(|_| AppError::BadRequest(message))
}

async fn fallback_handler() -> Response {
    not_found_route().into_response()
}
