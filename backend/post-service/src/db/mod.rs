/// Database access layer
///
/// Stores are exposed as traits so services can run against PostgreSQL in
/// production and the in-memory store in tests and local runs.
pub mod memory;
pub mod post_repo;
pub mod user_repo;

pub use memory::InMemoryStore;
pub use post_repo::PgPostStore;
pub use user_repo::PgUserStore;

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::models::{NewPost, Post, PostView, ProviderProfile, User};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

/// Outcome of a conditional liked-by mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    /// The set and counter were updated; carries the new post state
    Applied(Post),
    /// The post exists but the condition did not hold (already / not a member)
    Unchanged,
    /// No post with that id
    PostMissing,
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, new_post: NewPost) -> Result<Post>;

    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Newest-first slice `[skip, skip + limit)`, optionally joined with authors
    async fn find_page(&self, skip: i64, limit: i64, with_author: bool) -> Result<Vec<PostView>>;

    async fn count(&self) -> Result<i64>;

    /// Hard delete. Returns false when nothing was removed.
    async fn delete(&self, post_id: Uuid) -> Result<bool>;

    /// Add `user_id` to the liked-by set and increment the counter, only if absent.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<MembershipChange>;

    /// Remove `user_id` from the liked-by set and decrement the counter, only if present.
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<MembershipChange>;

    async fn health_check(&self) -> Result<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>>;

    /// Create the user on first sight of `external_id`, otherwise return the
    /// existing record untouched. The flag is true when a user was created.
    async fn find_or_create(&self, profile: &ProviderProfile) -> Result<(User, bool)>;
}

/// Create a PostgreSQL connection pool and verify it with a probe query
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    match tokio::time::timeout(Duration::from_secs(5), sqlx::query("SELECT 1").execute(&pool)).await
    {
        Ok(Ok(_)) => {
            info!(
                max_connections = config.max_connections,
                "Database pool created and verified successfully"
            );
            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Database connection verification failed");
            Err(e.into())
        }
        Err(_) => {
            error!("Database connection verification timeout");
            Err(sqlx::Error::PoolTimedOut.into())
        }
    }
}

/// Apply embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}
