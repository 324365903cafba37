use anyhow::Context;
use serde::Deserialize;
use sqlx::{PgExecutor, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{
    dto::UpdateProfileRequest,
    repo_types::{LeaderboardEntry, UserStats},
    services::level_for_xp,
};
use crate::auth::repo_types::{User, USER_COLUMNS};

/// Changes an admin may make to any account.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: Option<bool>,
    pub xp: Option<i32>,
}

pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    profile: &UpdateProfileRequest,
) -> anyhow::Result<Option<User>> {
    let sql = format!(
        r#"
        UPDATE users
           SET first_name = COALESCE($2, first_name),
               last_name = COALESCE($3, last_name),
               bio = COALESCE($4, bio),
               profile_image_url = COALESCE($5, profile_image_url),
               updated_at = NOW()
         WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.bio)
        .bind(&profile.profile_image_url)
        .fetch_optional(db)
        .await
        .context("update profile")?;
    Ok(user)
}

/// Adds xp and recomputes the level in a single statement, so concurrent
/// awards to the same user cannot overwrite each other.
pub async fn award_xp(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
    amount: i32,
) -> anyhow::Result<Option<User>> {
    let sql = format!(
        r#"
        UPDATE users
           SET xp = xp + $2,
               level = (xp + $2) / {per_level} + 1,
               updated_at = NOW()
         WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#,
        per_level = super::services::XP_PER_LEVEL,
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .bind(amount)
        .fetch_optional(db)
        .await
        .context("award xp")?;
    if let Some(u) = &user {
        debug_assert_eq!(u.level, level_for_xp(u.xp));
        info!(user_id = %u.id, xp = u.xp, level = u.level, "xp awarded");
    }
    Ok(user)
}

pub async fn stats(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserStats>> {
    let stats = sqlx::query_as::<_, UserStats>(
        r#"
        SELECT (SELECT COUNT(*) FROM quiz_results r WHERE r.user_id = u.id) AS total_quizzes,
               u.xp AS total_xp,
               (SELECT COUNT(*) + 1 FROM users o WHERE o.xp > u.xp) AS rank,
               u.level
          FROM users u
         WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("user stats")?;
    Ok(stats)
}

pub async fn leaderboard(db: &PgPool, limit: i64) -> anyhow::Result<Vec<LeaderboardEntry>> {
    let rows = sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT id, first_name, last_name, email AS username, profile_image_url,
               xp, level, is_admin
          FROM users
         ORDER BY xp DESC, level DESC
         LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
    .context("leaderboard")?;
    Ok(rows)
}

pub async fn list_paginated(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<User>> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
    );
    let rows = sqlx::query_as::<_, User>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list users")?;
    Ok(rows)
}

pub async fn admin_update(
    db: &PgPool,
    user_id: Uuid,
    update: &AdminUserUpdate,
) -> anyhow::Result<Option<User>> {
    let sql = format!(
        r#"
        UPDATE users
           SET first_name = COALESCE($2, first_name),
               last_name = COALESCE($3, last_name),
               is_admin = COALESCE($4, is_admin),
               xp = COALESCE($5, xp),
               level = COALESCE($6, level),
               updated_at = NOW()
         WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(update.is_admin)
        .bind(update.xp)
        .bind(update.xp.map(level_for_xp))
        .fetch_optional(db)
        .await
        .context("admin update user")?;
    Ok(user)
}

pub async fn delete(db: &PgPool, user_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(db)
        .await
        .context("delete user")?;
    Ok(res.rows_affected() > 0)
}

/// Promotes the configured admin email when no administrator exists yet.
pub async fn ensure_admin_user(db: &PgPool, admin_email: &str) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        UPDATE users
           SET is_admin = TRUE, updated_at = NOW()
         WHERE email = $1
           AND NOT EXISTS (SELECT 1 FROM users WHERE is_admin)
        "#,
    )
    .bind(admin_email)
    .execute(db)
    .await
    .context("ensure admin user")?;
    Ok(res.rows_affected() > 0)
}
