pub mod config;
pub mod db;
pub mod logging;
pub mod middleware;
pub mod pagination;
pub mod response;
pub mod routes;
pub mod seed;
pub mod state;

use axum::body::Body;
use axum::http::Request;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::{log_requests, ClockRequestId};
use crate::state::AppState;

/// The full application: routes plus the request id, CORS, tracing and
/// request logging layers.
pub fn build_app(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(axum::middleware::from_fn(log_requests))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(ClockRequestId))
}
