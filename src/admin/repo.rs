use anyhow::Context;
use sqlx::PgPool;

use super::dto::AdminStats;

pub async fn totals(db: &PgPool) -> anyhow::Result<AdminStats> {
    let stats = sqlx::query_as::<_, AdminStats>(
        r#"
        SELECT (SELECT COUNT(*) FROM users) AS total_users,
               (SELECT COUNT(*) FROM quizzes) AS total_quizzes,
               (SELECT COUNT(*) FROM chat_messages) AS total_messages,
               (SELECT COUNT(*) FROM admin_posts) AS total_posts
        "#,
    )
    .fetch_one(db)
    .await
    .context("admin totals")?;
    Ok(stats)
}
