use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub post_type: String,
    pub is_published: bool,
    pub admin_only: bool,
    pub author_id: Option<Uuid>,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A post joined with whatever is left of its author.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: Post,
    pub author_name: Option<String>,
    pub author_last_name: Option<String>,
    pub author_profile_image_url: Option<String>,
}

impl PostView {
    /// Visible without an admin account: published and not admin-only.
    pub fn is_public(&self) -> bool {
        self.post.is_published && !self.post.admin_only
    }
}

pub(crate) const POST_COLUMNS: &str = "id, title, content, post_type, is_published, admin_only, \
     author_id, image_url, created_at, updated_at";

pub(crate) const POST_VIEW_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.post_type, p.is_published, p.admin_only,
           p.author_id, p.image_url, p.created_at, p.updated_at,
           u.first_name AS author_name,
           u.last_name AS author_last_name,
           u.profile_image_url AS author_profile_image_url
      FROM admin_posts p
      LEFT JOIN users u ON u.id = p.author_id
"#;
