use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::SubmitResultRequest,
    repo,
    repo_types::{Quiz, QuizResult},
    services::{normalize_questions, parse_quiz_id, submit_result},
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppJson, AppResult},
    state::AppState,
};

pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/quizzes", get(list_quizzes))
        .route("/quizzes/featured", get(featured_quiz))
        .route("/quizzes/:id", get(get_quiz))
        .route("/quiz-results", post(create_result))
}

#[instrument(skip(state))]
pub async fn list_quizzes(State(state): State<AppState>) -> AppResult<Json<Vec<Quiz>>> {
    let quizzes = repo::list(&state.db).await?;
    Ok(Json(quizzes.into_iter().map(normalize_questions).collect()))
}

#[instrument(skip(state))]
pub async fn featured_quiz(State(state): State<AppState>) -> AppResult<Json<Option<Quiz>>> {
    Ok(Json(repo::featured(&state.db).await?.map(normalize_questions)))
}

#[instrument(skip(state))]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Quiz>> {
    let id = parse_quiz_id(&id)?;
    let quiz = repo::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Quiz"))?;
    Ok(Json(normalize_questions(quiz)))
}

#[instrument(skip(state, payload))]
pub async fn create_result(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<SubmitResultRequest>,
) -> AppResult<Json<QuizResult>> {
    Ok(Json(submit_result(&state, user.id, payload).await?))
}
