//! User store that fails every call with a database error.
use async_trait::async_trait;
use post_service::db::UserStore;
use post_service::error::{AppError, Result};
use post_service::models::{ProviderProfile, User};
use uuid::Uuid;

pub struct UnavailableUserStore;

fn connection_lost() -> AppError {
    AppError::Database("connection reset by peer".to_string())
}

#[async_trait]
impl UserStore for UnavailableUserStore {
    async fn find_by_id(&self, _user_id: Uuid) -> Result<Option<User>> {
        Err(connection_lost())
    }

    async fn find_by_external_id(&self, _external_id: &str) -> Result<Option<User>> {
        Err(connection_lost())
    }

    async fn find_or_create(&self, _profile: &ProviderProfile) -> Result<(User, bool)> {
        Err(connection_lost())
    }
}
