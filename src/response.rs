use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const NOT_FOUND_MESSAGE: &str = "Not found";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Every way a request can fail. Handlers return it and the `IntoResponse`
/// impl below is the single place that maps failures onto HTTP statuses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    PayloadTooLarge(&'static str),
    #[error(transparent)]
    Store(StoreError),
    /// A store failure whose text is written to the response body.
    #[error(transparent)]
    StoreExposed(StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(_) | Self::StoreExposed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A query that expected a row and found none is a missing resource, not a
/// store failure.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        if err.is_row_not_found() {
            return Self::NotFound(NOT_FOUND_MESSAGE);
        }
        Self::Store(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(message)
            | Self::NotFound(message)
            | Self::PayloadTooLarge(message) => message.to_string(),
            Self::Store(err) => {
                tracing::error!(error = %err, "store operation failed");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            Self::StoreExposed(err) => {
                tracing::error!(error = %err, "store operation failed");
                err.to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub fn not_found_route() -> AppError {
    AppError::NotFound(NOT_FOUND_MESSAGE)
}
