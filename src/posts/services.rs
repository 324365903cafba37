use super::dto::{CreatePostRequest, UpdatePostRequest};
use crate::error::{AppError, AppResult};

pub(crate) fn parse_post_id(raw: &str) -> AppResult<i32> {
    raw.parse::<i32>()
        .map_err(|_| AppError::validation("Invalid post ID"))
}

pub(crate) fn validate_new_post(req: &mut CreatePostRequest) -> AppResult<()> {
    req.title = req.title.trim().to_string();
    if req.title.is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    if req.content.trim().is_empty() {
        return Err(AppError::validation("Content is required"));
    }
    req.post_type = req.post_type.trim().to_string();
    if req.post_type.is_empty() {
        return Err(AppError::validation("Post type is required"));
    }
    Ok(())
}

pub(crate) fn validate_post_update(req: &mut UpdatePostRequest) -> AppResult<()> {
    if let Some(title) = &mut req.title {
        *title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::validation("Title cannot be empty"));
        }
    }
    if req.content.as_ref().is_some_and(|c| c.trim().is_empty()) {
        return Err(AppError::validation("Content cannot be empty"));
    }
    if let Some(kind) = &mut req.post_type {
        *kind = kind.trim().to_string();
        if kind.is_empty() {
            return Err(AppError::validation("Post type cannot be empty"));
        }
    }
    Ok(())
}
