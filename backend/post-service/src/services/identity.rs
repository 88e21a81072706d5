/// Identity service - OAuth login, user upsert and session resolution
use crate::db::UserStore;
use crate::error::{AppError, Result};
use crate::metrics::LOGINS_TOTAL;
use crate::models::{ProviderProfile, User};
use crate::services::oauth::IdentityProvider;
use crate::services::session::SessionManager;
use std::sync::Arc;
use tracing::{info, warn};

/// Authorization redirect handed to the browser
#[derive(Debug)]
pub struct LoginStart {
    pub url: String,
    pub state: String,
}

/// Result of a completed OAuth callback
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub is_new_user: bool,
    pub session_token: String,
}

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserStore>,
    sessions: SessionManager,
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: SessionManager,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            users,
            sessions,
            provider,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Generate the provider authorization URL with a fresh state token
    pub fn start_login(&self) -> Result<LoginStart> {
        let state = self.sessions.issue_state()?;
        let url = self.provider.authorization_url(&state)?;
        Ok(LoginStart { url, state })
    }

    /// Complete the OAuth flow after the provider redirects back
    ///
    /// `expected_state` is the value stored in the browser before the redirect.
    pub async fn complete_login(
        &self,
        code: &str,
        returned_state: &str,
        expected_state: Option<&str>,
    ) -> Result<LoginOutcome> {
        let outcome = async {
            self.sessions.verify_state(returned_state, expected_state)?;
            let profile = self.provider.exchange_code(code).await?;
            let (user, is_new_user) = self.login(&profile).await?;
            let session_token = self.sessions.issue_session(user.id)?;

            Ok(LoginOutcome {
                user,
                is_new_user,
                session_token,
            })
        }
        .await;

        if let Err(e) = &outcome {
            LOGINS_TOTAL.with_label_values(&["failed"]).inc();
            warn!(error = %e, "OAuth login failed");
        }

        outcome
    }

    /// Create-or-fetch the user for a provider profile.
    ///
    /// Returning users keep their stored display name and emails.
    pub async fn login(&self, profile: &ProviderProfile) -> Result<(User, bool)> {
        if profile.external_id.trim().is_empty() {
            return Err(AppError::OAuth(
                "Identity provider returned an empty subject".to_string(),
            ));
        }

        let (user, is_new_user) = self.users.find_or_create(profile).await?;

        if is_new_user {
            LOGINS_TOTAL.with_label_values(&["new_user"]).inc();
            info!(user_id = %user.id, "New user created via OAuth");
        } else {
            LOGINS_TOTAL.with_label_values(&["returning"]).inc();
            info!(user_id = %user.id, "Returning user signed in");
        }

        Ok((user, is_new_user))
    }

    /// Resolve a session token to a stored user
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let user_id = self.sessions.verify_session(token)?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthenticated)
    }
}
