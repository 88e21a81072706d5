/// Configuration management for Post Service
///
/// This module handles loading and managing configuration from environment variables.
/// A `.env` file is honoured in development via `dotenvy`.
use serde::{Deserialize, Serialize};

const DEV_SESSION_SECRET: &str = "dev-session-secret-change-me";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Persistence configuration
    pub database: DatabaseConfig,
    /// Identity provider (Google OAuth2) configuration
    pub oauth: OAuthConfig,
    /// Session token and cookie settings
    pub session: SessionConfig,
    /// Access and content policy flags
    pub policy: PolicyConfig,
    /// Feed pagination defaults
    pub feed: FeedConfig,
    /// Media upload limits
    pub media: MediaConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Emit JSON log lines instead of human-readable output
    pub json_logs: bool,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Which store implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    /// Redirect URI registered with the provider
    pub callback_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HMAC secret for session and OAuth state tokens
    pub secret: String,
    pub ttl_secs: i64,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
    /// Where the browser lands after login/logout
    pub frontend_url: String,
    /// Where the browser lands after a failed login
    pub failure_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Reject anonymous post creation
    pub require_auth_for_posting: bool,
    /// Reject posts with empty text
    pub text_required: bool,
    pub max_text_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub max_upload_bytes: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            require_auth_for_posting: true,
            text_required: true,
            max_text_length: 2000,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_page_size: 6,
            max_page_size: 100,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => StoreBackend::Postgres,
            "memory" if !production => StoreBackend::Memory,
            "memory" => return Err("STORE_BACKEND=memory is not allowed in production".to_string()),
            other => return Err(format!("Unknown STORE_BACKEND '{}'", other)),
        };

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("POST_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("POST_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(5000),
                json_logs: std::env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => frontend_url.clone(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                backend,
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/ljdw".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            oauth: {
                let google_client_id = non_empty_var("GOOGLE_CLIENT_ID");
                let google_client_secret = non_empty_var("GOOGLE_CLIENT_SECRET");
                if production && (google_client_id.is_none() || google_client_secret.is_none()) {
                    return Err(
                        "GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET must be set in production"
                            .to_string(),
                    );
                }

                OAuthConfig {
                    google_client_id,
                    google_client_secret,
                    callback_url: std::env::var("CALLBACK_URL").unwrap_or_else(|_| {
                        "http://localhost:5000/api/auth/google/callback".to_string()
                    }),
                }
            },
            session: {
                let secret = match non_empty_var("SESSION_SECRET") {
                    Some(secret) => secret,
                    None if production => {
                        return Err("SESSION_SECRET must be set in production".to_string())
                    }
                    None => DEV_SESSION_SECRET.to_string(),
                };
                if production && (secret == DEV_SESSION_SECRET || secret.len() < 32) {
                    return Err(
                        "SESSION_SECRET must be a non-default value of at least 32 bytes in production"
                            .to_string(),
                    );
                }

                SessionConfig {
                    secret,
                    ttl_secs: parse_env_or_default("SESSION_TTL_SECS", 7 * 24 * 3600)?,
                    cookie_secure: parse_env_or_default("SESSION_COOKIE_SECURE", production)?,
                    failure_url: std::env::var("FRONTEND_FAILURE_URL")
                        .unwrap_or_else(|_| frontend_url.clone()),
                    frontend_url,
                }
            },
            policy: PolicyConfig {
                require_auth_for_posting: parse_env_or_default("REQUIRE_AUTH_FOR_POSTING", true)?,
                text_required: parse_env_or_default("POST_TEXT_REQUIRED", true)?,
                max_text_length: parse_env_or_default("POST_MAX_TEXT_LENGTH", 2000)?,
            },
            feed: {
                let default_page_size: i64 = parse_env_or_default("FEED_DEFAULT_PAGE_SIZE", 6)?;
                let max_page_size: i64 = parse_env_or_default("FEED_MAX_PAGE_SIZE", 100)?;
                if default_page_size < 1 || max_page_size < default_page_size {
                    return Err(format!(
                        "Invalid feed page sizes: default={} max={}",
                        default_page_size, max_page_size
                    ));
                }
                FeedConfig {
                    default_page_size,
                    max_page_size,
                }
            },
            media: MediaConfig {
                max_upload_bytes: parse_env_or_default("MEDIA_MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
