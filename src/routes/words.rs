use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::operations::{
    add_word_review, get_word, list_word_groups, list_words, GroupRef, WordWithStats,
};
use crate::pagination::{PageRequest, Paginated};
use crate::response::AppError;
use crate::routes::{parse_id, INVALID_BODY};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/:id", get(show))
}

#[derive(Serialize)]
struct WordDetail {
    #[serde(flatten)]
    word: WordWithStats,
    groups: Vec<GroupRef>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReviewRequest {
    correct: bool,
}

#[derive(Serialize)]
struct ReviewResponse {
    success: bool,
    word_id: i64,
    study_session_id: i64,
    correct: bool,
}

async fn list(
    State(state): State<AppState>,
    page: PageRequest,
) -> Result<impl IntoResponse, AppError> {
    let (words, total) = list_words(state.db(), page)
        .await
        .map_err(|err| state.detailed_store_error(err))?;

    Ok(Json(Paginated::new(words, page, total)))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "Invalid word ID")?;

    let word = get_word(state.db(), id)
        .await
        .map_err(|err| state.detailed_store_error(err))?
        .ok_or(AppError::NotFound("Word not found"))?;

    let groups = list_word_groups(state.db(), id)
        .await
        .map_err(|err| state.detailed_store_error(err))?;

    Ok(Json(WordDetail { word, groups }))
}

/// `POST /api/study_sessions/:id/words/:word_id/review`
pub(super) async fn add_review(
    State(state): State<AppState>,
    Path((session_id, word_id)): Path<(String, String)>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let word_id = parse_id(&word_id, "Invalid word ID")?;
    let session_id = parse_id(&session_id, "Invalid session ID")?;
    let Json(review) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected review body");
        AppError::BadRequest(INVALID_BODY)
    })?;

    add_word_review(state.db(), word_id, session_id, review.correct)
        .await
        .map_err(|err| state.detailed_store_error(err))?;

    tracing::debug!(word_id, session_id, correct = review.correct, "word review recorded");

    Ok(Json(ReviewResponse {
        success: true,
        word_id,
        study_session_id: session_id,
        correct: review.correct,
    }))
}
