/// Data models for post-service
///
/// - `User`: an account created on first OAuth login
/// - `Post`: a text+media feed item with its liked-by set
/// - `PostView` / `FeedPage`: listing shapes returned by the feed
///
/// JSON field names are camelCase to match the web frontend.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Identity provider subject (Google account id)
    pub external_id: String,
    pub display_name: Option<String>,
    pub emails: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile returned by the identity provider after a code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    pub external_id: String,
    pub display_name: Option<String>,
    pub emails: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub text: Option<String>,
    pub file_url: String,
    /// Always equal to `liked_by.len()`
    pub likes: i32,
    /// Users who liked the post, without duplicates
    pub liked_by: Vec<Uuid>,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.liked_by.contains(&user_id)
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == Some(user_id)
    }
}

/// Validated input for a post insert.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: Option<String>,
    pub file_url: String,
    pub author_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: Uuid,
    pub display_name: Option<String>,
}

/// A post as listed in the feed, optionally joined with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub posts: Vec<PostView>,
    pub total_pages: i64,
    pub current_page: i64,
}
