use crate::error::{AppError, AppResult};

use super::dto::UpdateProfileRequest;

pub const XP_PER_LEVEL: i32 = 100;

/// Level is derived from xp and never stored independently of it.
pub fn level_for_xp(xp: i32) -> i32 {
    xp.max(0) / XP_PER_LEVEL + 1
}

/// Trims provided fields and rejects blank names.
pub(crate) fn validate_profile(req: &mut UpdateProfileRequest) -> AppResult<()> {
    for (field, value) in [
        ("First name", &mut req.first_name),
        ("Last name", &mut req.last_name),
    ] {
        if let Some(v) = value {
            *v = v.trim().to_string();
            if v.is_empty() {
                return Err(AppError::validation(format!("{field} cannot be empty")));
            }
        }
    }
    if let Some(url) = &mut req.profile_image_url {
        *url = url.trim().to_string();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_follows_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(250), 3);
        assert_eq!(level_for_xp(1000), 11);
    }

    #[test]
    fn level_never_below_one() {
        assert_eq!(level_for_xp(-40), 1);
    }

    #[test]
    fn profile_rejects_blank_names() {
        let mut req = UpdateProfileRequest {
            first_name: Some("  ".into()),
            ..Default::default()
        };
        let err = validate_profile(&mut req).unwrap_err();
        assert_eq!(err.to_string(), "First name cannot be empty");
    }

    #[test]
    fn profile_trims_fields() {
        let mut req = UpdateProfileRequest {
            first_name: Some(" Ada ".into()),
            profile_image_url: Some(" https://img/x.png ".into()),
            ..Default::default()
        };
        validate_profile(&mut req).unwrap();
        assert_eq!(req.first_name.as_deref(), Some("Ada"));
        assert_eq!(req.profile_image_url.as_deref(), Some("https://img/x.png"));
        assert!(req.bio.is_none());
    }
}
