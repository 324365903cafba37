use lazy_static::lazy_static;
use regex::Regex;
use time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{LoginRequest, RegisterRequest},
    password::{hash_password, hash_password_blocking, verify_password_blocking},
    repo_types::{NewUser, User},
    session::{SessionRecord, SessionUser},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

lazy_static! {
    /// Verified against on unknown emails so both login failures cost one argon2 run.
    static ref DUMMY_HASH: String = hash_password("quizhub-unknown-account").unwrap_or_default();
}

/// Trims fields in place and reports the first problem found.
pub(crate) fn validate_registration(req: &mut RegisterRequest) -> AppResult<()> {
    req.email = req.email.trim().to_string();
    req.first_name = req.first_name.trim().to_string();
    req.last_name = req.last_name.trim().to_string();

    if !is_valid_email(&req.email) {
        return Err(AppError::validation("Invalid email"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if req.first_name.is_empty() {
        return Err(AppError::validation("First name is required"));
    }
    if req.last_name.is_empty() {
        return Err(AppError::validation("Last name is required"));
    }
    Ok(())
}

pub(crate) fn validate_login(req: &mut LoginRequest) -> AppResult<()> {
    req.email = req.email.trim().to_string();
    if !is_valid_email(&req.email) {
        return Err(AppError::validation("Invalid email"));
    }
    if req.password.is_empty() {
        return Err(AppError::validation("Password is required"));
    }
    Ok(())
}

/// What a successful register or login hands back to the handler.
#[derive(Debug)]
pub struct IssuedCredentials {
    pub user: User,
    pub token: String,
    pub session: SessionRecord,
}

pub async fn register(state: &AppState, mut req: RegisterRequest) -> AppResult<IssuedCredentials> {
    validate_registration(&mut req)?;

    if state.users.find_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(AppError::DuplicateIdentity);
    }

    let password_hash = hash_password_blocking(req.password).await?;
    let is_admin = req.email == state.config.admin_email;
    let created = state
        .users
        .create(NewUser {
            id: Uuid::new_v4(),
            email: req.email.clone(),
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            is_admin,
        })
        .await?;

    let Some(user) = created else {
        // lost a race with a concurrent registration
        warn!(email = %req.email, "email already registered");
        return Err(AppError::DuplicateIdentity);
    };

    info!(user_id = %user.id, is_admin, "user registered");
    issue_credentials(state, user).await
}

pub async fn login(state: &AppState, mut req: LoginRequest) -> AppResult<IssuedCredentials> {
    validate_login(&mut req)?;

    let Some(user) = state.users.find_by_email(&req.email).await? else {
        let _ = verify_password_blocking(req.password, DUMMY_HASH.clone()).await;
        warn!("login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password_blocking(req.password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    issue_credentials(state, user).await
}

async fn issue_credentials(state: &AppState, user: User) -> AppResult<IssuedCredentials> {
    let token = state.tokens.issue(user.id, &user.email)?;
    let session = state
        .sessions
        .create(
            SessionUser {
                id: user.id,
                email: user.email.clone(),
            },
            Duration::days(state.config.session.ttl_days),
        )
        .await?;
    Ok(IssuedCredentials {
        user,
        token,
        session,
    })
}
