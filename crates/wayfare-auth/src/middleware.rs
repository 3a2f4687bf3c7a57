//! Axum middleware applying pipeline decisions at the transport boundary.
//!
//! The pipeline itself is a pure decision function; this module owns the
//! side effects. For each request it extracts the auth cookies, builds a
//! request-scoped identity provider, runs the pipeline, and applies the
//! resulting decision:
//!
//! - planned cookies are mirrored into the in-flight request's `Cookie`
//!   header (so same-request downstream consumers see fresh tokens) and
//!   appended as `Set-Cookie` response headers (so the client persists
//!   them);
//! - redirects short-circuit the handler;
//! - cache-control headers are attached to auth-sensitive responses.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware, routing::get};
//! use wayfare_auth::middleware::{AuthState, session_middleware};
//!
//! let state = AuthState::new(config, provider_factory);
//! let app: Router = Router::new()
//!     .route("/trips", get(list_trips))
//!     .layer(middleware::from_fn_with_state(state, session_middleware));
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use time::OffsetDateTime;

use crate::config::{AuthConfig, CookieConfig};
use crate::cookies;
use crate::pipeline::{PipelineDecision, SessionPipeline};
use crate::provider::ProviderFactory;
use crate::session::Session;

/// State required by the session middleware.
#[derive(Clone)]
pub struct AuthState {
    pipeline: Arc<SessionPipeline>,
    providers: Arc<dyn ProviderFactory>,
}

impl AuthState {
    /// Creates the middleware state from configuration and a provider
    /// factory.
    #[must_use]
    pub fn new(config: AuthConfig, providers: Arc<dyn ProviderFactory>) -> Self {
        Self {
            pipeline: Arc::new(SessionPipeline::new(config)),
            providers,
        }
    }

    /// The underlying pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &SessionPipeline {
        &self.pipeline
    }
}

/// The validated session for the current request.
///
/// Inserted into request extensions by the middleware when the pipeline
/// admits a session; handlers extract it directly.
///
/// # Example
///
/// ```ignore
/// async fn list_trips(CurrentSession(session): CurrentSession) -> String {
///     format!("trips for {}", session.user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Arc<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Session lifecycle middleware. Runs the pipeline on every inbound
/// request and applies its decision.
pub async fn session_middleware(
    State(state): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let now = OffsetDateTime::now_utc().unix_timestamp();

    let cookie_config = &state.pipeline.config().cookies;
    let (access_token, refresh_token) = extract_auth_tokens(req.headers(), cookie_config);
    let provider = state
        .providers
        .for_request(access_token.as_deref(), refresh_token.as_deref());

    let decision = state.pipeline.run(provider.as_ref(), &path, now).await;
    apply_decision(decision, req, next).await
}

/// Applies a pipeline decision to the live request and response.
///
/// Each cookie is applied independently; a failure applying one is logged
/// and never blocks the rest, and a failure rewriting the request header
/// degrades to continuing with the original request (fail-open).
async fn apply_decision(decision: PipelineDecision, mut req: Request, next: Next) -> Response {
    let rendered = cookies::render_batch(&decision.cookies);

    if !rendered.is_empty() {
        merge_request_cookies(req.headers_mut(), &rendered);
    }

    if let Some(session) = decision.session {
        req.extensions_mut().insert(CurrentSession(Arc::new(session)));
    }

    if let Some(delay) = decision.delay {
        tokio::time::sleep(delay).await;
    }

    let mut response = match &decision.redirect {
        Some(target) => Redirect::temporary(target).into_response(),
        None => next.run(req).await,
    };

    for cookie in &rendered {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => {
                tracing::warn!(
                    cookie = %cookie.name(),
                    error = %e,
                    "failed to apply Set-Cookie header"
                );
            }
        }
    }

    for (name, value) in decision.headers {
        response.headers_mut().insert(name, value);
    }

    response
}

/// Extracts the access/refresh token pair from the request's cookies.
fn extract_auth_tokens(
    headers: &HeaderMap,
    config: &CookieConfig,
) -> (Option<String>, Option<String>) {
    let access_name = config.access_token_cookie();
    let refresh_name = config.refresh_token_cookie();
    let mut access = None;
    let mut refresh = None;

    if let Some(cookie_header) = headers.get(header::COOKIE).and_then(|h| h.to_str().ok()) {
        for part in cookie_header.split(';') {
            if let Some((name, value)) = part.trim().split_once('=') {
                let (name, value) = (name.trim(), value.trim());
                if value.is_empty() {
                    continue;
                }
                if name == access_name {
                    access = Some(value.to_string());
                } else if name == refresh_name {
                    refresh = Some(value.to_string());
                }
            }
        }
    }

    (access, refresh)
}

/// Mirrors rendered cookies into the in-flight request's `Cookie` header,
/// replacing values for names that already exist.
fn merge_request_cookies(headers: &mut HeaderMap, rendered: &[cookie::Cookie<'static>]) {
    let mut pairs: Vec<(String, String)> = Vec::new();
    if let Some(existing) = headers.get(header::COOKIE).and_then(|h| h.to_str().ok()) {
        for part in existing.split(';') {
            if let Some((name, value)) = part.trim().split_once('=') {
                pairs.push((name.trim().to_string(), value.trim().to_string()));
            }
        }
    }

    for cookie in rendered {
        match pairs.iter_mut().find(|(name, _)| name == cookie.name()) {
            Some(pair) => pair.1 = cookie.value().to_string(),
            None => pairs.push((cookie.name().to_string(), cookie.value().to_string())),
        }
    }

    let joined = pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ");

    match HeaderValue::from_str(&joined) {
        Ok(value) => {
            headers.insert(header::COOKIE, value);
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to rewrite request cookie header");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::CookieInstruction;
    use crate::error::AuthError;
    use crate::provider::{IdentityProvider, ProviderResponse};
    use crate::session::{AUTHENTICATED_AUDIENCE, SessionUser};
    use async_trait::async_trait;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    fn live_session(expires_at: i64) -> Session {
        Session {
            user: SessionUser {
                id: "user-1".to_string(),
                email: "ada@example.com".to_string(),
                aud: AUTHENTICATED_AUDIENCE.to_string(),
                role: "traveler".to_string(),
            },
            expires_at,
            access_token: "at-1".to_string(),
            refresh_token: "rt-1".to_string(),
        }
    }

    fn now() -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }

    struct StaticProvider {
        session: Option<Session>,
        cookies: Vec<CookieInstruction>,
    }

    #[async_trait]
    impl IdentityProvider for StaticProvider {
        async fn get_session(&self) -> Result<ProviderResponse, AuthError> {
            Ok(ProviderResponse {
                session: self.session.clone(),
                cookies: self.cookies.clone(),
            })
        }

        async fn refresh_session(&self) -> Result<ProviderResponse, AuthError> {
            Err(AuthError::identity_provider("refresh not configured"))
        }
    }

    struct FixedFactory(Arc<StaticProvider>);

    impl ProviderFactory for FixedFactory {
        fn for_request(
            &self,
            _access_token: Option<&str>,
            _refresh_token: Option<&str>,
        ) -> Arc<dyn IdentityProvider> {
            self.0.clone()
        }
    }

    fn app(provider: StaticProvider) -> Router {
        let state = AuthState::new(
            AuthConfig::default(),
            Arc::new(FixedFactory(Arc::new(provider))),
        );

        async fn trips(CurrentSession(session): CurrentSession) -> String {
            session.user.email.clone()
        }

        async fn login() -> &'static str {
            "login form"
        }

        Router::new()
            .route("/trips", get(trips))
            .route("/login", get(login))
            .layer(middleware::from_fn_with_state(state, session_middleware))
    }

    fn get_request(path: &str) -> Request {
        axum::http::Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_protected_path_without_session_redirects() {
        let app = app(StaticProvider {
            session: None,
            cookies: Vec::new(),
        });

        let response = app.oneshot(get_request("/trips")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "no-store, no-cache, must-revalidate, proxy-revalidate"
        );
        assert_eq!(response.headers()[header::PRAGMA], "no-cache");
        assert_eq!(response.headers()[header::EXPIRES], "0");
    }

    #[tokio::test]
    async fn test_protected_path_with_session_reaches_handler() {
        let app = app(StaticProvider {
            session: Some(live_session(now() + 7200)),
            cookies: Vec::new(),
        });

        let response = app.oneshot(get_request("/trips")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        assert_eq!(&body[..], b"ada@example.com");
    }

    #[tokio::test]
    async fn test_login_with_session_redirects_home() {
        let app = app(StaticProvider {
            session: Some(live_session(now() + 7200)),
            cookies: Vec::new(),
        });

        let response = app.oneshot(get_request("/login")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/trips");
    }

    #[tokio::test]
    async fn test_login_without_session_shows_form() {
        let app = app(StaticProvider {
            session: None,
            cookies: Vec::new(),
        });

        let response = app.oneshot(get_request("/login")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_provider_cookies_set_on_response() {
        let app = app(StaticProvider {
            session: Some(live_session(now() + 7200)),
            cookies: vec![
                CookieInstruction::new("wf-auth-access-token", "at-1"),
                CookieInstruction::new("wf-auth-refresh-token", "rt-1"),
            ],
        });

        let response = app.oneshot(get_request("/trips")).await.unwrap();
        let set_cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        assert_eq!(set_cookies.len(), 2);
        assert!(set_cookies[0].contains("wf-auth-access-token=at-1"));
        assert!(set_cookies[0].contains("HttpOnly"));
        assert!(set_cookies[1].contains("wf-auth-refresh-token=rt-1"));
    }

    #[tokio::test]
    async fn test_request_cookie_header_mirrors_fresh_tokens() {
        let state = AuthState::new(
            AuthConfig::default(),
            Arc::new(FixedFactory(Arc::new(StaticProvider {
                session: Some(live_session(now() + 7200)),
                cookies: vec![CookieInstruction::new("wf-auth-access-token", "at-new")],
            }))),
        );

        // Handler echoes the Cookie header it received.
        async fn echo_cookies(headers: HeaderMap) -> String {
            headers
                .get(header::COOKIE)
                .and_then(|h| h.to_str().ok())
                .unwrap_or_default()
                .to_string()
        }

        let app = Router::new()
            .route("/trips", get(echo_cookies))
            .layer(middleware::from_fn_with_state(state, session_middleware));

        let request = axum::http::Request::builder()
            .uri("/trips")
            .header(header::COOKIE, "wf-auth-access-token=at-old; theme=dark")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let body = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        let echoed = String::from_utf8(body.to_vec()).unwrap();

        assert!(echoed.contains("wf-auth-access-token=at-new"));
        assert!(echoed.contains("theme=dark"));
        assert!(!echoed.contains("at-old"));
    }

    #[tokio::test]
    async fn test_extract_auth_tokens() {
        let config = CookieConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static(
                "theme=dark; wf-auth-access-token=at-1; wf-auth-refresh-token=rt-1",
            ),
        );

        let (access, refresh) = extract_auth_tokens(&headers, &config);
        assert_eq!(access.as_deref(), Some("at-1"));
        assert_eq!(refresh.as_deref(), Some("rt-1"));
    }

    #[tokio::test]
    async fn test_extract_auth_tokens_ignores_empty_values() {
        let config = CookieConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("wf-auth-access-token="),
        );

        let (access, refresh) = extract_auth_tokens(&headers, &config);
        assert!(access.is_none());
        assert!(refresh.is_none());
    }
}
