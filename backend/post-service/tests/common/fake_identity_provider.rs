//! Identity provider double: authorization codes of the form `code-<subject>`
//! resolve to a profile for `<subject>`; anything else fails like a rejected grant.
use async_trait::async_trait;
use post_service::error::{AppError, Result};
use post_service::models::ProviderProfile;
use post_service::services::IdentityProvider;

pub struct FakeIdentityProvider;

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<String> {
        Ok(format!("https://idp.test/auth?state={}", state))
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile> {
        match code.strip_prefix("code-") {
            Some(subject) if !subject.is_empty() => Ok(super::profile(subject)),
            _ => Err(AppError::OAuth("invalid_grant".to_string())),
        }
    }
}
