/// Like service - toggles a user's membership in a post's liked-by set
///
/// The counter and the set are changed together by one conditional store
/// mutation, so `likes == liked_by.len()` holds under concurrent requests.
use crate::db::{MembershipChange, PostStore};
use crate::error::{AppError, Result};
use crate::metrics::LIKE_OPERATIONS_TOTAL;
use crate::models::Post;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct LikeService {
    store: Arc<dyn PostStore>,
}

impl LikeService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    /// Like a post. Fails with `AlreadyLiked` without mutating when the user is a member.
    pub async fn like(&self, post_id: Uuid, user_id: Uuid) -> Result<Post> {
        let change = self.store.add_like(post_id, user_id).await?;
        Self::finish("like", post_id, user_id, change, AppError::AlreadyLiked)
    }

    /// Remove a like. Fails with `NotLiked` without mutating when the user is not a member.
    pub async fn dislike(&self, post_id: Uuid, user_id: Uuid) -> Result<Post> {
        let change = self.store.remove_like(post_id, user_id).await?;
        Self::finish("dislike", post_id, user_id, change, AppError::NotLiked)
    }

    /// Whether the user currently likes the post
    pub async fn liked_status(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let post = self
            .store
            .find_by_id(post_id)
            .await?
            .ok_or(AppError::PostNotFound)?;

        Ok(post.is_liked_by(user_id))
    }

    fn finish(
        operation: &'static str,
        post_id: Uuid,
        user_id: Uuid,
        change: MembershipChange,
        unchanged: AppError,
    ) -> Result<Post> {
        match change {
            MembershipChange::Applied(post) => {
                LIKE_OPERATIONS_TOTAL
                    .with_label_values(&[operation, "applied"])
                    .inc();
                tracing::debug!(%post_id, %user_id, likes = post.likes, operation, "like state changed");
                Ok(post)
            }
            MembershipChange::Unchanged => {
                LIKE_OPERATIONS_TOTAL
                    .with_label_values(&[operation, "rejected"])
                    .inc();
                Err(unchanged)
            }
            MembershipChange::PostMissing => {
                LIKE_OPERATIONS_TOTAL
                    .with_label_values(&[operation, "not_found"])
                    .inc();
                Err(AppError::PostNotFound)
            }
        }
    }
}
