use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{repo, repo_types::PostView, services::parse_post_id};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/:id", get(get_post))
}

#[instrument(skip(state))]
pub async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<PostView>>> {
    Ok(Json(repo::list_public(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostView>> {
    let id = parse_post_id(&id)?;
    let post = repo::get_public(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Post"))?;
    Ok(Json(post))
}
