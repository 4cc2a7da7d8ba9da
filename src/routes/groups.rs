use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::operations::{get_group, list_group_words, list_groups};
use crate::pagination::{PageRequest, Paginated};
use crate::response::AppError;
use crate::routes::parse_id;
use crate::state::AppState;

const INVALID_GROUP_ID: &str = "Invalid group ID";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/:id", get(show))
        .route("/:id/words", get(words))
}

async fn list(
    State(state): State<AppState>,
    page: PageRequest,
) -> Result<impl IntoResponse, AppError> {
    let (groups, total) = list_groups(state.db(), page)
        .await
        .map_err(|err| state.detailed_store_error(err))?;

    Ok(Json(Paginated::new(groups, page, total)))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_GROUP_ID)?;

    let group = get_group(state.db(), id)
        .await
        .map_err(|err| state.detailed_store_error(err))?
        .ok_or(AppError::NotFound("Group not found"))?;

    Ok(Json(group))
}

// An unknown group yields an empty page, not a 404.
async fn words(
    State(state): State<AppState>,
    Path(id): Path<String>,
    page: PageRequest,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_GROUP_ID)?;

    let (words, total) = list_group_words(state.db(), id, page)
        .await
        .map_err(|err| state.detailed_store_error(err))?;

    Ok(Json(Paginated::new(words, page, total)))
}
