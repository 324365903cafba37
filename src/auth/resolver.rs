//! Decides which identity, if any, a request is acting as.
//!
//! The session cookie is consulted first and the bearer token second, so a
//! browser session always wins over a stale cached token. Either credential
//! only nominates an identity: the user must still exist in the directory,
//! and every rejection looks the same to the client.

use time::OffsetDateTime;
use tracing::{debug, error};
use uuid::Uuid;

use super::{
    extractors::AuthUser, jwt::TokenCodec, repo::UserDirectory, session::SessionRecord,
};
use crate::error::AppError;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    Session,
    Bearer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub user_id: Uuid,
    pub via: Credential,
}

/// Picks the identity a request claims, without touching storage.
///
/// An expired session is never reused as a fallback when the token fails.
pub fn candidate_identity(
    session: Option<&SessionRecord>,
    authorization: Option<&str>,
    tokens: &TokenCodec,
    now: OffsetDateTime,
) -> Option<Candidate> {
    if let Some(s) = session.filter(|s| s.is_live(now)) {
        return Some(Candidate {
            user_id: s.user.id,
            via: Credential::Session,
        });
    }

    let token = authorization.and_then(|h| h.strip_prefix(BEARER_PREFIX))?;
    match tokens.verify(token) {
        Ok(claims) => Some(Candidate {
            user_id: claims.sub,
            via: Credential::Bearer,
        }),
        Err(_) => {
            debug!("bearer token discarded");
            None
        }
    }
}

/// Full resolution: candidate selection followed by the existence check.
pub async fn resolve_identity(
    session: Option<&SessionRecord>,
    authorization: Option<&str>,
    tokens: &TokenCodec,
    users: &dyn UserDirectory,
) -> Result<(AuthUser, Credential), AppError> {
    let candidate = candidate_identity(session, authorization, tokens, OffsetDateTime::now_utc())
        .ok_or(AppError::Unauthenticated)?;

    let user = match users.find_by_id(candidate.user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            debug!(user_id = %candidate.user_id, "credential references a missing user");
            return Err(AppError::Unauthenticated);
        }
        Err(e) => {
            error!(error = %e, user_id = %candidate.user_id, "user lookup failed during auth");
            return Err(AppError::Unauthenticated);
        }
    };

    Ok((
        AuthUser {
            id: user.id,
            email: user.email,
        },
        candidate.via,
    ))
}
