use axum::{
    extract::{Query, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{LeaderboardQuery, UpdateProfileRequest},
    repo,
    repo_types::{LeaderboardEntry, UserStats},
    services::validate_profile,
};
use crate::{
    auth::{dto::UserProfile, extractors::AuthUser},
    error::{AppError, AppJson, AppResult},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/stats", get(stats))
        .route("/user/profile", put(update_profile))
        .route("/users/leaderboard", get(leaderboard))
}

#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<UserStats>> {
    let stats = repo::stats(&state.db, user.id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(stats))
}

#[instrument(skip(state))]
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(q): Query<LeaderboardQuery>,
) -> AppResult<Json<Vec<LeaderboardEntry>>> {
    Ok(Json(repo::leaderboard(&state.db, q.clamped_limit()).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(mut payload): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    validate_profile(&mut payload)?;
    let updated = repo::update_profile(&state.db, user.id, &payload)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    info!(user_id = %user.id, "profile updated");
    Ok(Json(updated.into()))
}
