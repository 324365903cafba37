use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default = "default_post_type")]
    pub post_type: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub admin_only: bool,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    pub is_published: Option<bool>,
    pub admin_only: Option<bool>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostFilter {
    pub published: Option<bool>,
}

fn default_post_type() -> String {
    "announcement".into()
}
