//! Shared fixtures for post-service integration tests
#![allow(dead_code)]

pub mod fake_identity_provider;
pub mod unavailable_user_store;

use fake_identity_provider::FakeIdentityProvider;
use post_service::config::{
    AppConfig, Config, CorsConfig, DatabaseConfig, FeedConfig, MediaConfig, OAuthConfig,
    PolicyConfig, SessionConfig, StoreBackend,
};
use post_service::db::InMemoryStore;
use post_service::models::{ProviderProfile, User};
use post_service::AppState;
use std::sync::Arc;
use unavailable_user_store::UnavailableUserStore;
use uuid::Uuid;

pub const FRONTEND_URL: &str = "http://localhost:3000";
pub const FAILURE_URL: &str = "http://localhost:3000/login?error=oauth";
pub const BOUNDARY: &str = "----post-service-test-boundary";

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            json_logs: false,
        },
        cors: CorsConfig {
            allowed_origins: FRONTEND_URL.to_string(),
        },
        database: DatabaseConfig {
            backend: StoreBackend::Memory,
            url: String::new(),
            max_connections: 1,
        },
        oauth: OAuthConfig {
            google_client_id: Some("test-client".to_string()),
            google_client_secret: Some("test-secret".to_string()),
            callback_url: "http://localhost:5000/api/auth/google/callback".to_string(),
        },
        session: SessionConfig {
            secret: "integration-test-secret-integration-test".to_string(),
            ttl_secs: 3600,
            cookie_secure: false,
            frontend_url: FRONTEND_URL.to_string(),
            failure_url: FAILURE_URL.to_string(),
        },
        policy: PolicyConfig::default(),
        feed: FeedConfig::default(),
        media: MediaConfig {
            max_upload_bytes: 1024,
        },
    }
}

/// App state over a fresh in-memory store. The store handle is returned for assertions.
pub fn test_state(config: &Config) -> (AppState, InMemoryStore) {
    let store = InMemoryStore::new();
    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(FakeIdentityProvider),
        config,
    );
    (state, store)
}

/// App state whose user lookups all fail, plus a validly signed session for a
/// user the store cannot be asked about.
pub fn unavailable_users_state(config: &Config) -> (AppState, InMemoryStore, String) {
    let store = InMemoryStore::new();
    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(UnavailableUserStore),
        Arc::new(FakeIdentityProvider),
        config,
    );
    let token = state
        .identity
        .sessions()
        .issue_session(Uuid::new_v4())
        .expect("issue session");
    (state, store, token)
}

pub fn profile(external_id: &str) -> ProviderProfile {
    ProviderProfile {
        external_id: external_id.to_string(),
        display_name: Some(format!("User {}", external_id)),
        emails: vec![format!("{}@example.com", external_id)],
    }
}

/// Sign a user in directly and return their session token.
pub async fn session_for(state: &AppState, external_id: &str) -> (User, String) {
    let (user, _) = state
        .identity
        .login(&profile(external_id))
        .await
        .expect("login");
    let token = state
        .identity
        .sessions()
        .issue_session(user.id)
        .expect("issue session");
    (user, token)
}

/// Minimal multipart/form-data encoder for post submissions
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// `(content-type header, body)`
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        (
            format!("multipart/form-data; boundary={}", BOUNDARY),
            self.body,
        )
    }
}

/// Build the full application around `$state` and initialise it as a test service.
macro_rules! init_app {
    ($state:expr) => {{
        let state = $state;
        let session_auth =
            post_service::middleware::SessionAuthMiddleware::new(state.identity.clone());
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(state))
                .wrap(session_auth)
                .configure(post_service::handlers::configure),
        )
        .await
    }};
}
