/// Auth handlers - Google OAuth redirect flow, session status and logout
///
/// The callback never answers with an error body: failures redirect the browser to
/// the configured failure URL and no user is created.
use crate::config::SessionConfig;
use crate::error::{AppError, Result};
use crate::middleware::{AuthenticatedUser, OptionalUser};
use crate::models::User;
use crate::services::{OAUTH_STATE_COOKIE, SESSION_COOKIE};
use crate::AppState;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

const OAUTH_STATE_MAX_AGE_SECS: i64 = 600;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user denies consent
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Redirect the browser to the provider's consent page
pub async fn google_login(state: web::Data<AppState>) -> Result<HttpResponse> {
    let start = state.identity.start_login()?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, start.url))
        .cookie(build_cookie(
            OAUTH_STATE_COOKIE,
            start.state,
            OAUTH_STATE_MAX_AGE_SECS,
            &state.session,
        ))
        .finish())
}

/// Provider redirect target: verify state, exchange the code and open a session
pub async fn google_callback(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
) -> HttpResponse {
    let expected_state = req
        .cookie(OAUTH_STATE_COOKIE)
        .map(|c| c.value().to_string());

    let outcome = match (query.code.as_deref(), query.state.as_deref()) {
        (Some(code), Some(returned_state)) => {
            state
                .identity
                .complete_login(code, returned_state, expected_state.as_deref())
                .await
        }
        _ => {
            let reason = query
                .error
                .clone()
                .unwrap_or_else(|| "missing code or state".to_string());
            tracing::warn!(reason = %reason, "OAuth callback rejected");
            Err(AppError::OAuth(reason))
        }
    };

    match outcome {
        Ok(outcome) => HttpResponse::Found()
            .insert_header((header::LOCATION, state.session.frontend_url.clone()))
            .cookie(build_cookie(
                SESSION_COOKIE,
                outcome.session_token,
                state.session.ttl_secs,
                &state.session,
            ))
            .cookie(removal_cookie(OAUTH_STATE_COOKIE))
            .finish(),
        Err(_) => HttpResponse::Found()
            .insert_header((header::LOCATION, state.session.failure_url.clone()))
            .cookie(removal_cookie(OAUTH_STATE_COOKIE))
            .finish(),
    }
}

/// Report whether the caller has a valid session
pub async fn auth_status(user: OptionalUser) -> HttpResponse {
    HttpResponse::Ok().json(AuthStatus {
        authenticated: user.0.is_some(),
        user: user.0,
    })
}

/// End the session and send the browser back to the frontend
pub async fn logout(state: web::Data<AppState>, user: AuthenticatedUser) -> HttpResponse {
    tracing::info!(user_id = %user.0.id, "user logged out");

    HttpResponse::Found()
        .insert_header((header::LOCATION, state.session.frontend_url.clone()))
        .cookie(removal_cookie(SESSION_COOKIE))
        .finish()
}

fn build_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    config: &SessionConfig,
) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path("/").http_only(true).finish();
    cookie.make_removal();
    cookie
}
