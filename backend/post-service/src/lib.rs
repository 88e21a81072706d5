/// Post Service Library
///
/// Backend for a small social feed: Google sign-in, posts with an image or
/// video attachment, likes and a paginated newest-first feed.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Users, posts and feed shapes
/// - `services`: Business logic layer
/// - `db`: Store traits with PostgreSQL and in-memory implementations
/// - `middleware`: Session authentication and ownership checks
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use config::{MediaConfig, SessionConfig};
use db::{PostStore, UserStore};
use services::{
    FeedService, IdentityProvider, IdentityService, LikeService, PostService, SessionManager,
};
use std::sync::Arc;

/// Shared handler state, built once at startup and cloned into each worker.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub likes: LikeService,
    pub feed: FeedService,
    pub identity: IdentityService,
    pub post_store: Arc<dyn PostStore>,
    pub session: SessionConfig,
    pub media: MediaConfig,
}

impl AppState {
    pub fn new(
        post_store: Arc<dyn PostStore>,
        user_store: Arc<dyn UserStore>,
        provider: Arc<dyn IdentityProvider>,
        config: &Config,
    ) -> Self {
        let sessions = SessionManager::new(&config.session);

        Self {
            posts: PostService::new(post_store.clone(), config.policy.clone()),
            likes: LikeService::new(post_store.clone()),
            feed: FeedService::new(post_store.clone(), config.feed.clone()),
            identity: IdentityService::new(user_store, sessions, provider),
            post_store,
            session: config.session.clone(),
            media: config.media.clone(),
        }
    }
}
