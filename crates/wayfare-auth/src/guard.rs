//! Route classification and admission decisions.
//!
//! Paths are classified once per request by prefix match against the
//! configured protected and auth-flow lists; everything else is neutral.
//! The classification combines with session validity into the admission
//! decision: pass through, redirect to login, or redirect to the
//! authenticated landing page.

use axum::http::{HeaderName, HeaderValue, header};

use crate::config::RouteConfig;

/// Classification of a request path. Computed once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Requires a valid session.
    Protected,
    /// Part of the login/signup flow.
    AuthFlow,
    /// Matches neither list; always passes through.
    Neutral,
}

impl RouteClass {
    /// Returns `true` for classifications whose responses must never be
    /// cached.
    #[must_use]
    pub fn is_auth_sensitive(self) -> bool {
        matches!(self, Self::Protected | Self::AuthFlow)
    }
}

/// Admission decision for a classified request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Let the request continue to its handler.
    Continue,
    /// Redirect to the given path.
    RedirectTo(String),
}

/// Classifies a path by prefix match.
#[must_use]
pub fn classify(path: &str, routes: &RouteConfig) -> RouteClass {
    if routes.protected_prefixes.iter().any(|p| path.starts_with(p)) {
        RouteClass::Protected
    } else if routes.auth_flow_prefixes.iter().any(|p| path.starts_with(p)) {
        RouteClass::AuthFlow
    } else {
        RouteClass::Neutral
    }
}

/// Combines classification and session validity into a decision.
///
/// | Classification | Session valid? | Decision            |
/// |----------------|----------------|---------------------|
/// | Protected      | no             | redirect to login   |
/// | Protected      | yes            | continue            |
/// | AuthFlow       | yes            | redirect home       |
/// | AuthFlow       | no             | continue            |
/// | Neutral        | either         | continue            |
#[must_use]
pub fn decide(class: RouteClass, session_valid: bool, routes: &RouteConfig) -> RouteDecision {
    match (class, session_valid) {
        (RouteClass::Protected, false) => RouteDecision::RedirectTo(routes.login_path.clone()),
        (RouteClass::AuthFlow, true) => RouteDecision::RedirectTo(routes.home_path.clone()),
        _ => RouteDecision::Continue,
    }
}

/// Cache-control headers attached to every auth-sensitive response.
#[must_use]
pub fn cache_headers() -> Vec<(HeaderName, HeaderValue)> {
    vec![
        (
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"),
        ),
        (header::PRAGMA, HeaderValue::from_static("no-cache")),
        (header::EXPIRES, HeaderValue::from_static("0")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes() -> RouteConfig {
        RouteConfig::default()
    }

    #[test]
    fn test_classification_by_prefix() {
        let routes = routes();
        assert_eq!(classify("/trips/42", &routes), RouteClass::Protected);
        assert_eq!(classify("/chat", &routes), RouteClass::Protected);
        assert_eq!(classify("/profile/settings", &routes), RouteClass::Protected);
        assert_eq!(classify("/login", &routes), RouteClass::AuthFlow);
        assert_eq!(classify("/signup", &routes), RouteClass::AuthFlow);
        assert_eq!(classify("/", &routes), RouteClass::Neutral);
        assert_eq!(classify("/about", &routes), RouteClass::Neutral);
    }

    #[test]
    fn test_protected_without_session_redirects_to_login() {
        let routes = routes();
        let class = classify("/trips/42", &routes);
        assert_eq!(
            decide(class, false, &routes),
            RouteDecision::RedirectTo("/login".to_string())
        );
    }

    #[test]
    fn test_protected_with_session_continues() {
        let routes = routes();
        assert_eq!(
            decide(RouteClass::Protected, true, &routes),
            RouteDecision::Continue
        );
    }

    #[test]
    fn test_auth_flow_with_session_redirects_home() {
        let routes = routes();
        let class = classify("/login", &routes);
        assert_eq!(
            decide(class, true, &routes),
            RouteDecision::RedirectTo("/trips".to_string())
        );
    }

    #[test]
    fn test_auth_flow_without_session_continues() {
        let routes = routes();
        assert_eq!(
            decide(RouteClass::AuthFlow, false, &routes),
            RouteDecision::Continue
        );
    }

    #[test]
    fn test_neutral_always_continues() {
        let routes = routes();
        assert_eq!(
            decide(RouteClass::Neutral, true, &routes),
            RouteDecision::Continue
        );
        assert_eq!(
            decide(RouteClass::Neutral, false, &routes),
            RouteDecision::Continue
        );
    }

    #[test]
    fn test_auth_sensitive_classes() {
        assert!(RouteClass::Protected.is_auth_sensitive());
        assert!(RouteClass::AuthFlow.is_auth_sensitive());
        assert!(!RouteClass::Neutral.is_auth_sensitive());
    }

    #[test]
    fn test_cache_headers() {
        let headers = cache_headers();
        assert_eq!(headers.len(), 3);
        assert_eq!(
            headers[0].1,
            "no-store, no-cache, must-revalidate, proxy-revalidate"
        );
        assert_eq!(headers[1].1, "no-cache");
        assert_eq!(headers[2].1, "0");
    }
}
