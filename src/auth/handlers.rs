use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::{error, info, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UserProfile},
        extractors::AuthUser,
        services,
        session::{with_session, without_session, SESSION_COOKIE},
    },
    error::{AppError, AppJson, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/user", get(current_user))
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(SignedCookieJar, Json<AuthResponse>)> {
    let issued = services::register(&state, payload).await?;
    let jar = with_session(jar, issued.session.id, &state.config.session);
    Ok((
        jar,
        Json(AuthResponse {
            user: issued.user.into(),
            token: issued.token,
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<(SignedCookieJar, Json<AuthResponse>)> {
    let issued = services::login(&state, payload).await?;
    let jar = with_session(jar, issued.session.id, &state.config.session);
    Ok((
        jar,
        Json(AuthResponse {
            user: issued.user.into(),
            token: issued.token,
        }),
    ))
}

/// Destroys the session, if any. Bearer tokens stay valid until they expire.
#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Json<MessageResponse>)> {
    if let Some(sid) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(sid.value()).await.map_err(|e| {
            error!(error = %e, "session destroy failed");
            AppError::Internal(e)
        })?;
        info!("session destroyed");
    }
    Ok((
        without_session(jar),
        Json(MessageResponse::new("Logged out")),
    ))
}

#[instrument(skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<UserProfile>> {
    let found = state
        .users
        .find_by_id(user.id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(found.into()))
}
