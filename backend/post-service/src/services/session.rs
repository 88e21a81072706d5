/// Session tokens
///
/// Sessions and OAuth `state` values are HS256 JWTs signed with the configured
/// session secret. Keys are built once at startup and shared through `web::Data`.
use crate::config::SessionConfig;
use crate::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

const OAUTH_STATE_TTL_SECS: i64 = 600; // 10 minutes
const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TokenKind {
    Session,
    OauthState,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id for sessions, random nonce for OAuth state
    sub: String,
    iat: i64,
    exp: i64,
    kind: TokenKind,
}

#[derive(Clone)]
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl SessionManager {
    pub fn new(config: &SessionConfig) -> Self {
        Self::from_secret(config.secret.as_bytes(), config.ttl_secs)
    }

    pub fn from_secret(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Issue a session token for an authenticated user
    pub fn issue_session(&self, user_id: Uuid) -> Result<String> {
        self.sign(user_id.to_string(), self.ttl_secs, TokenKind::Session)
    }

    /// Resolve a session token to the user id it was issued for
    pub fn verify_session(&self, token: &str) -> Result<Uuid> {
        let claims = self
            .verify(token, TokenKind::Session)
            .ok_or(AppError::Unauthenticated)?;

        Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthenticated)
    }

    /// Issue a short-lived OAuth `state` value
    pub fn issue_state(&self) -> Result<String> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        self.sign(nonce, OAUTH_STATE_TTL_SECS, TokenKind::OauthState)
    }

    /// Check a `state` echoed back by the provider against the one we handed out
    pub fn verify_state(&self, returned: &str, expected: Option<&str>) -> Result<()> {
        match expected {
            Some(expected) if expected == returned => {}
            _ => return Err(AppError::OAuth("OAuth state mismatch".to_string())),
        }

        self.verify(returned, TokenKind::OauthState)
            .map(|_| ())
            .ok_or_else(|| AppError::OAuth("Invalid or expired OAuth state".to_string()))
    }

    fn sign(&self, sub: String, ttl_secs: i64, kind: TokenKind) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            kind,
        };

        Ok(encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)?)
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Option<Claims> {
        let validation = Validation::new(JWT_ALGORITHM);
        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) if data.claims.kind == kind => Some(data.claims),
            Ok(_) => {
                tracing::debug!("token kind mismatch");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "token rejected");
                None
            }
        }
    }
}
