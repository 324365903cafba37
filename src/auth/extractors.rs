use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::SignedCookieJar;
use time::{Duration, OffsetDateTime};
use tracing::{error, warn};
use uuid::Uuid;

use super::{
    resolver::{resolve_identity, Credential},
    session::{SessionRecord, SESSION_COOKIE},
};
use crate::{error::AppError, state::AppState};

/// Identity resolved from the session cookie or a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let session = load_session(parts, state).await;
        let authorization = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let (user, via) = resolve_identity(
            session.as_ref(),
            authorization,
            &state.tokens,
            state.users.as_ref(),
        )
        .await?;

        // sliding expiry
        if let (Credential::Session, Some(s)) = (via, &session) {
            let expires_at =
                OffsetDateTime::now_utc() + Duration::days(state.config.session.ttl_days);
            if let Err(e) = state.sessions.touch(&s.id, expires_at).await {
                warn!(error = %e, user_id = %user.id, "session touch failed");
            }
        }

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Reads the signed session cookie and loads its record, if any.
pub(crate) async fn load_session(parts: &Parts, state: &AppState) -> Option<SessionRecord> {
    let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
    let sid = jar.get(SESSION_COOKIE)?;
    match state.sessions.load(sid.value()).await {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "session load failed");
            None
        }
    }
}

/// An [`AuthUser`] whose account carries the administrator flag.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        match state.users.find_by_id(user.id).await? {
            Some(u) if u.is_admin => Ok(AdminUser(user)),
            Some(_) => {
                warn!(user_id = %user.id, "admin route denied");
                Err(AppError::Forbidden)
            }
            None => Err(AppError::Unauthenticated),
        }
    }
}
