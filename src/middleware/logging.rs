use std::time::Instant;

use axum::body::{Body, HttpBody};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tower_http::request_id::RequestId;

use crate::response::AppError;

/// Largest request body accepted, and largest response body buffered for the
/// log line. Matches axum's default extractor limit.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Bodies longer than this are cut in the log line.
const MAX_LOGGED_BODY: usize = 2048;

/// Logged in place of a response body that is not buffered.
const STREAMED_BODY: &str = "<streamed>";

/// Emits one `api` event per request with method, path, status, latency,
/// request id and both bodies. The request body is buffered and handed back
/// to the inner service untouched; bodies over [`MAX_BODY_BYTES`] are
/// answered with 413 before reaching a handler. Responses without a known
/// size at or under that limit are passed through unread.
pub async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-")
        .to_string();

    let (parts, body) = req.into_parts();
    let request_body = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.is::<LengthLimitError>() => {
            tracing::warn!(%method, %path, request_id = %request_id, limit = MAX_BODY_BYTES, "request body too large");
            return AppError::PayloadTooLarge("Request body too large").into_response();
        }
        Err(err) => {
            tracing::warn!(%method, %path, request_id = %request_id, error = %err, "failed to read request body");
            return AppError::BadRequest("Invalid request body").into_response();
        }
    };
    let req = Request::from_parts(parts, Body::from(request_body.clone()));

    let response = next.run(req).await;

    let (parts, body) = response.into_parts();
    let status = parts.status.as_u16();
    let buffered = HttpBody::size_hint(&body)
        .upper()
        .is_some_and(|upper| upper <= MAX_BODY_BYTES as u64);

    let (response_body, body) = if buffered {
        match body.collect().await {
            Ok(collected) => {
                let bytes = collected.to_bytes();
                (loggable(&bytes), Body::from(bytes))
            }
            Err(err) => {
                tracing::error!(%method, %path, request_id = %request_id, error = %err, "failed to read response body");
                (String::new(), Body::empty())
            }
        }
    } else {
        (STREAMED_BODY.to_string(), body)
    };
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

    tracing::info!(
        target: "api",
        %method,
        %path,
        status,
        latency_ms,
        request_id = %request_id,
        request = %loggable(&request_body),
        response = %response_body,
        "request completed"
    );

    Response::from_parts(parts, body)
}

fn loggable(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= MAX_LOGGED_BODY {
        return text.into_owned();
    }
    let mut end = MAX_LOGGED_BODY;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
