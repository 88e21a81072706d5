/// Business logic layer for post-service
///
/// - Posts: creation with media resolution, lookup and author-only delete
/// - Likes: the like/dislike engine over a post's liked-by set
/// - Feed: newest-first pagination
/// - Identity: OAuth login, user upsert and session resolution
pub mod feed;
pub mod identity;
pub mod likes;
pub mod media;
pub mod oauth;
pub mod posts;
pub mod session;

pub use feed::FeedService;
pub use identity::{IdentityService, LoginOutcome, LoginStart};
pub use likes::LikeService;
pub use media::{resolve_media, MediaInput, UploadedFile};
pub use oauth::{GoogleIdentityProvider, IdentityProvider};
pub use posts::PostService;
pub use session::{SessionManager, OAUTH_STATE_COOKIE, SESSION_COOKIE};
