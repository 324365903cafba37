use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{ChatMessage, ChatMessageRow};

/// Latest `limit` messages of a room, oldest first.
pub async fn recent_messages(
    db: &PgPool,
    room_id: i32,
    limit: i64,
) -> anyhow::Result<Vec<ChatMessageRow>> {
    let mut rows = sqlx::query_as::<_, ChatMessageRow>(
        r#"
        SELECT m.id, m.message AS content, m.user_id,
               u.first_name AS user_first_name,
               u.last_name AS user_last_name,
               u.profile_image_url AS user_profile_image_url,
               u.is_admin,
               m.created_at
          FROM chat_messages m
          LEFT JOIN users u ON u.id = m.user_id
         WHERE m.room_id = $1
         ORDER BY m.created_at DESC, m.id DESC
         LIMIT $2
        "#,
    )
    .bind(room_id)
    .bind(limit)
    .fetch_all(db)
    .await
    .context("list chat messages")?;
    rows.reverse();
    Ok(rows)
}

pub async fn insert_message(
    db: &PgPool,
    room_id: i32,
    user_id: Uuid,
    message: &str,
) -> anyhow::Result<ChatMessage> {
    let row = sqlx::query_as::<_, ChatMessage>(
        r#"
        INSERT INTO chat_messages (room_id, user_id, message, message_type)
        VALUES ($1, $2, $3, 'text')
        RETURNING id, room_id, user_id, message, message_type, created_at
        "#,
    )
    .bind(room_id)
    .bind(user_id)
    .bind(message)
    .fetch_one(db)
    .await
    .context("insert chat message")?;
    Ok(row)
}

pub async fn delete_message(db: &PgPool, id: i32) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM chat_messages WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete chat message")?;
    Ok(res.rows_affected() > 0)
}
