use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    dto::{CreatePostRequest, UpdatePostRequest},
    repo_types::{Post, PostView, POST_COLUMNS, POST_VIEW_SELECT},
};

/// Published posts visible to everyone, newest first.
pub async fn list_public(db: &PgPool) -> anyhow::Result<Vec<PostView>> {
    let sql = format!(
        "{POST_VIEW_SELECT} WHERE p.is_published AND NOT p.admin_only ORDER BY p.created_at DESC"
    );
    let rows = sqlx::query_as::<_, PostView>(&sql)
        .fetch_all(db)
        .await
        .context("list public posts")?;
    Ok(rows)
}

/// A single post, only if [`PostView::is_public`] holds for it.
pub async fn get_public(db: &PgPool, id: i32) -> anyhow::Result<Option<PostView>> {
    let sql = format!("{POST_VIEW_SELECT} WHERE p.id = $1 AND p.is_published AND NOT p.admin_only");
    let row = sqlx::query_as::<_, PostView>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("get public post")?;
    Ok(row.filter(PostView::is_public))
}

pub async fn list_all(db: &PgPool, published: Option<bool>) -> anyhow::Result<Vec<PostView>> {
    let sql = format!(
        "{POST_VIEW_SELECT} WHERE ($1::BOOLEAN IS NULL OR p.is_published = $1) \
         ORDER BY p.created_at DESC"
    );
    let rows = sqlx::query_as::<_, PostView>(&sql)
        .bind(published)
        .fetch_all(db)
        .await
        .context("list posts")?;
    Ok(rows)
}

pub async fn create(
    db: &PgPool,
    author_id: Uuid,
    post: &CreatePostRequest,
) -> anyhow::Result<Post> {
    let sql = format!(
        r#"
        INSERT INTO admin_posts (title, content, post_type, is_published, admin_only,
                                 author_id, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {POST_COLUMNS}
        "#
    );
    let created = sqlx::query_as::<_, Post>(&sql)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.post_type)
        .bind(post.is_published)
        .bind(post.admin_only)
        .bind(author_id)
        .bind(&post.image_url)
        .fetch_one(db)
        .await
        .context("insert post")?;
    Ok(created)
}

pub async fn update(
    db: &PgPool,
    id: i32,
    post: &UpdatePostRequest,
) -> anyhow::Result<Option<Post>> {
    let sql = format!(
        r#"
        UPDATE admin_posts
           SET title = COALESCE($2, title),
               content = COALESCE($3, content),
               post_type = COALESCE($4, post_type),
               is_published = COALESCE($5, is_published),
               admin_only = COALESCE($6, admin_only),
               image_url = COALESCE($7, image_url),
               updated_at = NOW()
         WHERE id = $1
        RETURNING {POST_COLUMNS}
        "#
    );
    let updated = sqlx::query_as::<_, Post>(&sql)
        .bind(id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.post_type)
        .bind(post.is_published)
        .bind(post.admin_only)
        .bind(&post.image_url)
        .fetch_optional(db)
        .await
        .context("update post")?;
    Ok(updated)
}

pub async fn delete(db: &PgPool, id: i32) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM admin_posts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete post")?;
    Ok(res.rows_affected() > 0)
}
