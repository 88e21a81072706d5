/// Post service - handles post creation, retrieval, and deletion
use crate::config::PolicyConfig;
use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::metrics::POST_EVENTS_TOTAL;
use crate::middleware::permissions::check_post_deletion;
use crate::models::{NewPost, Post};
use crate::services::media::{resolve_media, MediaInput};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn PostStore>,
    policy: PolicyConfig,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>, policy: PolicyConfig) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Create a new post
    ///
    /// Media is mandatory; text is trimmed and required only when the policy says so.
    pub async fn create_post(
        &self,
        text: Option<&str>,
        media: &MediaInput,
        author_id: Option<Uuid>,
    ) -> Result<Post> {
        let file_url = resolve_media(media)?;

        let text = text.map(str::trim).filter(|t| !t.is_empty());
        if self.policy.text_required && text.is_none() {
            return Err(AppError::Validation("Text is required".to_string()));
        }
        if let Some(t) = text {
            if t.chars().count() > self.policy.max_text_length {
                return Err(AppError::Validation(format!(
                    "Text must be at most {} characters",
                    self.policy.max_text_length
                )));
            }
        }

        let post = self
            .store
            .insert(NewPost {
                text: text.map(str::to_string),
                file_url,
                author_id,
            })
            .await?;

        POST_EVENTS_TOTAL.with_label_values(&["created"]).inc();
        tracing::info!(post_id = %post.id, author_id = ?author_id, "post created");

        Ok(post)
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.store
            .find_by_id(post_id)
            .await?
            .ok_or(AppError::PostNotFound)
    }

    /// Permanently delete a post. Only its author may do so.
    pub async fn delete_post(&self, post_id: Uuid, requester_id: Uuid) -> Result<()> {
        let post = self.get_post(post_id).await?;
        check_post_deletion(requester_id, &post)?;

        if !self.store.delete(post_id).await? {
            // Removed concurrently between the lookup and the delete
            return Err(AppError::PostNotFound);
        }

        POST_EVENTS_TOTAL.with_label_values(&["deleted"]).inc();
        tracing::info!(%post_id, %requester_id, "post deleted");

        Ok(())
    }
}
