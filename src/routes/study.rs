use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::operations::{
    create_study_session, get_study_activity, get_study_session, list_study_activity_sessions,
    list_study_session_words, list_study_sessions,
};
use crate::pagination::{PageRequest, Paginated};
use crate::response::AppError;
use crate::routes::{parse_id, words, INVALID_BODY};
use crate::state::AppState;

const INVALID_SESSION_ID: &str = "Invalid session ID";
const INVALID_ACTIVITY_ID: &str = "Invalid activity ID";

pub fn sessions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/:id", get(show_session))
        .route("/:id/words", get(session_words))
        .route("/:id/words/:word_id/review", post(words::add_review))
}

pub fn activities_router() -> Router<AppState> {
    Router::new()
        .route("/:id", get(show_activity))
        .route("/:id/study_sessions", get(activity_sessions))
}

#[derive(Debug, Deserialize)]
struct CreateSessionRequest {
    group_id: i64,
    study_activity_id: i64,
}

async fn list_sessions(
    State(state): State<AppState>,
    page: PageRequest,
) -> Result<impl IntoResponse, AppError> {
    let (sessions, total) = list_study_sessions(state.db(), page).await?;
    Ok(Json(Paginated::new(sessions, page, total)))
}

async fn show_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_SESSION_ID)?;

    let session = get_study_session(state.db(), id)
        .await?
        .ok_or(AppError::NotFound("Study session not found"))?;

    Ok(Json(session))
}

async fn session_words(
    State(state): State<AppState>,
    Path(id): Path<String>,
    page: PageRequest,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_SESSION_ID)?;
    let (words, total) = list_study_session_words(state.db(), id, page).await?;
    Ok(Json(Paginated::new(words, page, total)))
}

async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected study session body");
        AppError::BadRequest(INVALID_BODY)
    })?;
    if request.group_id < 1 || request.study_activity_id < 1 {
        return Err(AppError::BadRequest(INVALID_BODY));
    }

    let session =
        create_study_session(state.db(), request.group_id, request.study_activity_id).await?;

    tracing::info!(
        session_id = session.id,
        group_id = session.group_id,
        study_activity_id = session.study_activity_id,
        "study session created"
    );

    Ok((StatusCode::CREATED, Json(session)))
}

async fn show_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_ACTIVITY_ID)?;

    let activity = get_study_activity(state.db(), id)
        .await?
        .ok_or(AppError::NotFound("Study activity not found"))?;

    Ok(Json(activity))
}

async fn activity_sessions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    page: PageRequest,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_ACTIVITY_ID)?;
    let (sessions, total) = list_study_activity_sessions(state.db(), id, page).await?;
    Ok(Json(Paginated::new(sessions, page, total)))
}
