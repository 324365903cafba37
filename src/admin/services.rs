use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    users::repo::AdminUserUpdate,
};

pub(crate) fn parse_user_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::validation("Invalid user ID"))
}

pub(crate) fn parse_message_id(raw: &str) -> AppResult<i32> {
    raw.parse::<i32>()
        .map_err(|_| AppError::validation("Invalid message ID"))
}

pub(crate) fn validate_user_update(update: &mut AdminUserUpdate) -> AppResult<()> {
    for (name, label) in [
        (&mut update.first_name, "First name"),
        (&mut update.last_name, "Last name"),
    ] {
        if let Some(value) = name {
            *value = value.trim().to_string();
            if value.is_empty() {
                return Err(AppError::Validation(format!("{label} cannot be empty")));
            }
        }
    }
    if update.xp.is_some_and(|xp| xp < 0) {
        return Err(AppError::validation("XP cannot be negative"));
    }
    Ok(())
}

/// An admin may delete anyone but themself.
pub(crate) fn check_not_self(actor: Uuid, target: Uuid) -> AppResult<()> {
    if actor == target {
        return Err(AppError::validation("You cannot delete your own account"));
    }
    Ok(())
}
