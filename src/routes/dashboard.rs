use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::operations::{get_last_study_session, get_quick_stats, get_study_progress};
use crate::response::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/last_study_session", get(last_study_session))
        .route("/study_progress", get(study_progress))
        .route("/quick-stats", get(quick_stats))
}

async fn last_study_session(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let session = get_last_study_session(state.db())
        .await
        .map_err(|err| state.detailed_store_error(err))?
        .ok_or(AppError::NotFound("No study sessions found"))?;

    Ok(Json(session))
}

async fn study_progress(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let progress = get_study_progress(state.db())
        .await
        .map_err(|err| state.detailed_store_error(err))?;

    Ok(Json(progress))
}

async fn quick_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = get_quick_stats(state.db())
        .await
        .map_err(|err| state.detailed_store_error(err))?;

    Ok(Json(stats))
}
