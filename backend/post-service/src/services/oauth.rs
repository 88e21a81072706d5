/// OAuth 2.0 identity provider client
///
/// Only the authorization-code flow is used: the browser is redirected to the
/// provider, and the returned code is exchanged server-side for a profile.
use crate::config::OAuthConfig;
use crate::error::{AppError, Result};
use crate::models::ProviderProfile;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider login page the browser should be sent to
    fn authorization_url(&self, state: &str) -> Result<String>;

    /// Exchange an authorization code for the caller's profile
    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile>;
}

#[derive(Clone)]
pub struct GoogleIdentityProvider {
    client_id: Option<String>,
    client_secret: Option<String>,
    callback_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(config: &OAuthConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            callback_url: config.callback_url.clone(),
            http,
        })
    }

    fn client_id(&self) -> Result<&str> {
        self.client_id
            .as_deref()
            .ok_or_else(|| AppError::OAuth("Google client ID not configured".to_string()))
    }

    fn client_secret(&self) -> Result<&str> {
        self.client_secret
            .as_deref()
            .ok_or_else(|| AppError::OAuth("Google client secret not configured".to_string()))
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<String> {
        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope=openid%20profile%20email&state={}",
            GOOGLE_AUTH_URL,
            urlencoding::encode(self.client_id()?),
            urlencoding::encode(&self.callback_url),
            urlencoding::encode(state)
        ))
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile> {
        let client_id = self.client_id()?;
        let client_secret = self.client_secret()?;

        let token_response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", self.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<GoogleTokenResponse>()
            .await?;

        let user_info = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token_response.access_token)
            .send()
            .await?
            .error_for_status()?
            .json::<GoogleUserInfo>()
            .await?;

        Ok(user_info.into())
    }
}

impl From<GoogleUserInfo> for ProviderProfile {
    fn from(info: GoogleUserInfo) -> Self {
        ProviderProfile {
            external_id: info.id,
            display_name: info.name,
            emails: info.email.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(client_id: Option<&str>) -> GoogleIdentityProvider {
        GoogleIdentityProvider::new(&OAuthConfig {
            google_client_id: client_id.map(str::to_string),
            google_client_secret: Some("secret".to_string()),
            callback_url: "http://localhost:5000/api/auth/google/callback".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_authorization_url() {
        let url = provider(Some("client-123")).authorization_url("abc").unwrap();
        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Fapi%2Fauth%2Fgoogle%2Fcallback"
        ));
        assert!(url.contains("state=abc"));
    }

    #[test]
    fn test_missing_client_id() {
        assert!(matches!(
            provider(None).authorization_url("abc"),
            Err(AppError::OAuth(_))
        ));
    }

    #[test]
    fn test_user_info_to_profile() {
        let info: GoogleUserInfo = serde_json::from_str(
            r#"{"id":"1234","email":"ada@example.com","verified_email":true,"name":"Ada"}"#,
        )
        .unwrap();
        let profile = ProviderProfile::from(info);
        assert_eq!(profile.external_id, "1234");
        assert_eq!(profile.display_name.as_deref(), Some("Ada"));
        assert_eq!(profile.emails, vec!["ada@example.com".to_string()]);
    }
}
