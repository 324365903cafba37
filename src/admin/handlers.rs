use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AdminStats, CleanupReport, PageQuery},
    repo,
    services::{check_not_self, parse_message_id, parse_user_id, validate_user_update},
};
use crate::{
    auth::{dto::MessageResponse, extractors::AdminUser, repo_types::User},
    chat,
    error::{AppError, AppJson, AppResult},
    posts::{
        self,
        dto::{CreatePostRequest, PostFilter, UpdatePostRequest},
        repo_types::{Post, PostView},
        services::{parse_post_id, validate_new_post, validate_post_update},
    },
    quizzes::{
        self,
        dto::{CreateQuizRequest, UpdateQuizRequest},
        repo_types::Quiz,
        services::{normalize_questions, parse_quiz_id, validate_new_quiz, validate_quiz_update},
    },
    state::AppState,
    users::{self, repo::AdminUserUpdate},
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(stats))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", put(update_user).delete(delete_user))
        .route("/admin/quizzes", get(list_quizzes).post(create_quiz))
        .route("/admin/quizzes/:id", put(update_quiz).delete(delete_quiz))
        .route("/admin/posts", get(list_posts).post(create_post))
        .route("/admin/posts/:id", put(update_post).delete(delete_post))
        .route("/admin/chat/messages/:id", delete(delete_message))
        .route("/admin/maintenance/cleanup", post(cleanup))
}

#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>, _admin: AdminUser) -> AppResult<Json<AdminStats>> {
    Ok(Json(repo::totals(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Vec<User>>> {
    let (limit, offset) = page.bounds();
    Ok(Json(users::repo::list_paginated(&state.db, limit, offset).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    AppJson(mut payload): AppJson<AdminUserUpdate>,
) -> AppResult<Json<User>> {
    let id = parse_user_id(&id)?;
    validate_user_update(&mut payload)?;
    let user = users::repo::admin_update(&state.db, id, &payload)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    info!(admin_id = %admin.id, user_id = %id, "user updated by admin");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_user_id(&id)?;
    check_not_self(admin.id, id)?;
    if !users::repo::delete(&state.db, id).await? {
        return Err(AppError::NotFound("User"));
    }
    warn!(admin_id = %admin.id, user_id = %id, "user deleted");
    Ok(Json(MessageResponse::new("User deleted")))
}

#[instrument(skip(state))]
pub async fn list_quizzes(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<Quiz>>> {
    let quizzes = quizzes::repo::list(&state.db).await?;
    Ok(Json(quizzes.into_iter().map(normalize_questions).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_quiz(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(mut payload): AppJson<CreateQuizRequest>,
) -> AppResult<Json<Quiz>> {
    validate_new_quiz(&mut payload)?;
    let quiz = quizzes::repo::create(&state.db, admin.id, &payload).await?;
    info!(admin_id = %admin.id, quiz_id = quiz.id, "quiz created");
    Ok(Json(normalize_questions(quiz)))
}

#[instrument(skip(state, payload))]
pub async fn update_quiz(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    AppJson(mut payload): AppJson<UpdateQuizRequest>,
) -> AppResult<Json<Quiz>> {
    let id = parse_quiz_id(&id)?;
    validate_quiz_update(&mut payload)?;
    let quiz = quizzes::repo::update(&state.db, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Quiz"))?;
    Ok(Json(normalize_questions(quiz)))
}

#[instrument(skip(state))]
pub async fn delete_quiz(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_quiz_id(&id)?;
    if !quizzes::repo::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Quiz"));
    }
    Ok(Json(MessageResponse::new("Quiz deleted")))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(filter): Query<PostFilter>,
) -> AppResult<Json<Vec<PostView>>> {
    Ok(Json(posts::repo::list_all(&state.db, filter.published).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(mut payload): AppJson<CreatePostRequest>,
) -> AppResult<Json<Post>> {
    validate_new_post(&mut payload)?;
    let post = posts::repo::create(&state.db, admin.id, &payload).await?;
    info!(admin_id = %admin.id, post_id = post.id, "post created");
    Ok(Json(post))
}

#[instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    AppJson(mut payload): AppJson<UpdatePostRequest>,
) -> AppResult<Json<Post>> {
    let id = parse_post_id(&id)?;
    validate_post_update(&mut payload)?;
    let post = posts::repo::update(&state.db, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Post"))?;
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_post_id(&id)?;
    if !posts::repo::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Post"));
    }
    Ok(Json(MessageResponse::new("Post deleted")))
}

#[instrument(skip(state))]
pub async fn delete_message(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_message_id(&id)?;
    if !chat::repo::delete_message(&state.db, id).await? {
        return Err(AppError::NotFound("Message"));
    }
    info!(admin_id = %admin.id, message_id = id, "chat message removed");
    Ok(Json(MessageResponse::new("Message deleted")))
}

#[instrument(skip(state))]
pub async fn cleanup(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> AppResult<Json<CleanupReport>> {
    let report = CleanupReport {
        expired_sessions: state.sessions.purge_expired().await?,
        orphaned_results: quizzes::repo::delete_orphaned_results(&state.db).await?,
    };
    info!(
        admin_id = %admin.id,
        expired_sessions = report.expired_sessions,
        orphaned_results = report.orphaned_results,
        "maintenance cleanup finished"
    );
    Ok(Json(report))
}
