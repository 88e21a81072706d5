/// Authorization module for post-service
///
/// Provides ownership-based permission checks for posts.
/// Users can only remove content they authored.
use crate::error::AppError;
use crate::models::Post;
use uuid::Uuid;

/// Result type for permission checks
pub type PermissionResult = Result<(), AppError>;

/// Check if a user owns a post
pub fn check_post_ownership(user_id: Uuid, post: &Post) -> PermissionResult {
    if post.is_authored_by(user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to modify this post".to_string(),
        ))
    }
}

/// Verify user has access to delete a post
/// Only the author can delete their own posts; anonymous posts have no author
pub fn check_post_deletion(user_id: Uuid, post: &Post) -> PermissionResult {
    check_post_ownership(user_id, post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post_by(author_id: Option<Uuid>) -> Post {
        Post {
            id: Uuid::new_v4(),
            text: None,
            file_url: "https://example.com/a.png".to_string(),
            likes: 0,
            liked_by: vec![],
            author_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_author_may_delete() {
        let author = Uuid::new_v4();
        assert!(check_post_deletion(author, &post_by(Some(author))).is_ok());
    }

    #[test]
    fn test_other_user_forbidden() {
        let result = check_post_deletion(Uuid::new_v4(), &post_by(Some(Uuid::new_v4())));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_anonymous_post_cannot_be_deleted() {
        let result = check_post_deletion(Uuid::new_v4(), &post_by(None));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
