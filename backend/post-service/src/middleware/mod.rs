/// HTTP middleware utilities for post-service
///
/// `SessionAuthMiddleware` resolves the caller from the session cookie (or a
/// Bearer header) and stores it in request extensions. A missing or invalid
/// credential leaves the request anonymous; handlers opt into authentication
/// through the `AuthenticatedUser` extractor, which short-circuits with 401.
/// A store failure while resolving a valid credential fails the request.
pub mod permissions;

pub use permissions::*;

use crate::error::AppError;
use crate::models::User;
use crate::services::{IdentityService, SESSION_COOKIE};
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

// =====================================================================
// Session authentication
// =====================================================================

/// Caller resolved from a valid session, stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Actix middleware that attaches the session user, if any, to the request.
#[derive(Clone)]
pub struct SessionAuthMiddleware {
    identity: IdentityService,
}

impl SessionAuthMiddleware {
    pub fn new(identity: IdentityService) -> Self {
        Self { identity }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddlewareService {
            service: Rc::new(service),
            identity: self.identity.clone(),
        }))
    }
}

pub struct SessionAuthMiddlewareService<S> {
    service: Rc<S>,
    identity: IdentityService,
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let identity = self.identity.clone();

        Box::pin(async move {
            if let Some(token) = session_token(&req) {
                match identity.authenticate(&token).await {
                    Ok(user) => {
                        req.extensions_mut().insert(CurrentUser(user));
                    }
                    Err(AppError::Unauthenticated) => {
                        tracing::debug!(path = %req.path(), "ignoring invalid session credential");
                    }
                    Err(e) => {
                        tracing::warn!(path = %req.path(), "session lookup failed");
                        return Ok(req.error_response(e).map_into_right_body());
                    }
                }
            }

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Session token from the `session` cookie, falling back to `Authorization: Bearer`.
fn session_token(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

// =====================================================================
// Extractors
// =====================================================================

/// Requires an authenticated caller; rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .map(|current| AuthenticatedUser(current.0.clone()))
                .ok_or(AppError::Unauthenticated),
        )
    }
}

/// The caller when a valid session is present.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl FromRequest for OptionalUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(OptionalUser(
            req.extensions()
                .get::<CurrentUser>()
                .map(|current| current.0.clone()),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{InMemoryStore, UserStore};
    use crate::models::ProviderProfile;
    use crate::services::{IdentityProvider, SessionManager};
    use actix_web::cookie::Cookie;
    use actix_web::{test, web, App, HttpResponse};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoProvider;

    #[async_trait]
    impl IdentityProvider for NoProvider {
        fn authorization_url(&self, _state: &str) -> crate::error::Result<String> {
            Err(AppError::OAuth("not configured".to_string()))
        }

        async fn exchange_code(&self, _code: &str) -> crate::error::Result<ProviderProfile> {
            Err(AppError::OAuth("not configured".to_string()))
        }
    }

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.0.external_id)
    }

    async fn setup() -> (IdentityService, String) {
        let store = Arc::new(InMemoryStore::new());
        let (user, _) = store
            .find_or_create(&ProviderProfile {
                external_id: "google-7".to_string(),
                display_name: None,
                emails: vec![],
            })
            .await
            .unwrap();

        let identity = IdentityService::new(
            store,
            SessionManager::from_secret(b"middleware-test-secret-middleware", 3600),
            Arc::new(NoProvider),
        );
        let token = identity.sessions().issue_session(user.id).unwrap();
        (identity, token)
    }

    #[actix_web::test]
    async fn test_cookie_and_bearer_credentials() {
        let (identity, token) = setup().await;
        let app = test::init_service(
            App::new()
                .wrap(SessionAuthMiddleware::new(identity))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .cookie(Cookie::new(SESSION_COOKIE, token.clone()))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "google-7");

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_missing_or_invalid_credential_is_401() {
        let (identity, _token) = setup().await;
        let app = test::init_service(
            App::new()
                .wrap(SessionAuthMiddleware::new(identity))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let req = test::TestRequest::get()
            .uri("/me")
            .cookie(Cookie::new(SESSION_COOKIE, "garbage"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}
