//! Session lifecycle configuration.
//!
//! This module provides configuration types for the session middleware:
//! route classification lists, cookie policy, and refresh timing constants.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth.routes]
//! protected_prefixes = ["/trips", "/chat", "/profile"]
//! auth_flow_prefixes = ["/login", "/signup"]
//!
//! [auth.cookies]
//! prefix = "wf-auth"
//! domain = "app.wayfare.example"
//!
//! [auth.refresh]
//! threshold = "1h"
//! attempt_timeout = "2s"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root session lifecycle configuration.
///
/// Contains all policy knobs for the session middleware, organized into
/// logical subsections: route classification, cookie policy, and refresh
/// behavior.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Route classification configuration.
    pub routes: RouteConfig,

    /// Cookie policy configuration.
    pub cookies: CookieConfig,

    /// Proactive refresh configuration.
    pub refresh: RefreshConfig,
}

/// Route classification configuration.
///
/// Paths are classified by prefix match against two lists; anything matching
/// neither list is neutral and always passes through.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Path prefixes that require a valid session.
    pub protected_prefixes: Vec<String>,

    /// Path prefixes that belong to the login/signup flow.
    pub auth_flow_prefixes: Vec<String>,

    /// Where unauthenticated requests to protected paths are redirected.
    pub login_path: String,

    /// Where authenticated requests to auth-flow paths are redirected.
    pub home_path: String,

    /// Delay before redirecting away from an auth-flow path, giving the
    /// client time to persist freshly set cookies.
    #[serde(with = "humantime_serde")]
    pub propagation_delay: Duration,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: vec![
                "/trips".to_string(),
                "/chat".to_string(),
                "/profile".to_string(),
            ],
            auth_flow_prefixes: vec!["/login".to_string(), "/signup".to_string()],
            login_path: "/login".to_string(),
            home_path: "/trips".to_string(),
            propagation_delay: Duration::from_millis(100),
        }
    }
}

/// Cookie policy configuration.
///
/// All auth cookies share the configured prefix. The minimum pair for a
/// session to be considered cookie-backed is the access-token cookie and the
/// refresh-token cookie.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Common prefix for all auth cookies.
    pub prefix: String,

    /// Cookie domain. None scopes cookies to the request host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Whether cookies require HTTPS.
    pub secure: bool,

    /// SameSite attribute: "strict", "lax", or "none".
    pub same_site: String,

    /// Cookie path.
    pub path: String,

    /// Lifetime used when the session's remaining lifetime is unusable
    /// (clock skew, corrupted data, already expired).
    #[serde(with = "humantime_serde")]
    pub default_lifetime: Duration,

    /// Upper bound on cookie lifetime derived from a session.
    #[serde(with = "humantime_serde")]
    pub max_lifetime: Duration,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            prefix: "wf-auth".to_string(),
            domain: None,
            secure: true,
            same_site: "lax".to_string(),
            path: "/".to_string(),
            default_lifetime: Duration::from_secs(7 * 24 * 3600),
            max_lifetime: Duration::from_secs(30 * 24 * 3600),
        }
    }
}

impl CookieConfig {
    /// Name of the access-token cookie.
    #[must_use]
    pub fn access_token_cookie(&self) -> String {
        format!("{}-access-token", self.prefix)
    }

    /// Name of the refresh-token cookie.
    #[must_use]
    pub fn refresh_token_cookie(&self) -> String {
        format!("{}-refresh-token", self.prefix)
    }
}

/// Proactive refresh configuration.
///
/// A session is refreshed before hard expiry so users are not forced
/// through a visible re-login. The refresh call is bounded by a per-attempt
/// timeout and a small number of retries with linear backoff.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Remaining lifetime below which a refresh is attempted.
    #[serde(with = "humantime_serde")]
    pub threshold: Duration,

    /// Number of retries after the initial attempt.
    pub max_retries: u32,

    /// Per-attempt timeout for the provider's refresh call.
    #[serde(with = "humantime_serde")]
    pub attempt_timeout: Duration,

    /// Base backoff; retry `k` waits `k * base_backoff`.
    #[serde(with = "humantime_serde")]
    pub base_backoff: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs(3600),
            max_retries: 2,
            attempt_timeout: Duration::from_secs(2),
            base_backoff: Duration::from_secs(1),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - a path prefix or redirect target does not start with `/`
    /// - the cookie prefix is empty or the SameSite value is unknown
    /// - a refresh timeout or lifetime bound is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        for prefix in self
            .routes
            .protected_prefixes
            .iter()
            .chain(&self.routes.auth_flow_prefixes)
        {
            if !prefix.starts_with('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "path prefix '{prefix}' must start with '/'"
                )));
            }
        }

        if !self.routes.login_path.starts_with('/') {
            return Err(ConfigError::InvalidValue(
                "login_path must start with '/'".to_string(),
            ));
        }

        if !self.routes.home_path.starts_with('/') {
            return Err(ConfigError::InvalidValue(
                "home_path must start with '/'".to_string(),
            ));
        }

        if self.cookies.prefix.is_empty() {
            return Err(ConfigError::InvalidValue(
                "cookie prefix cannot be empty".to_string(),
            ));
        }

        match self.cookies.same_site.as_str() {
            "strict" | "lax" | "none" => {}
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid same_site: '{other}'. Must be strict, lax, or none"
                )));
            }
        }

        if self.cookies.max_lifetime.is_zero() || self.cookies.default_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "cookie lifetimes must be > 0".to_string(),
            ));
        }

        if self.cookies.default_lifetime > self.cookies.max_lifetime {
            return Err(ConfigError::InvalidValue(
                "default_lifetime cannot exceed max_lifetime".to_string(),
            ));
        }

        if self.refresh.attempt_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "refresh attempt_timeout must be > 0".to_string(),
            ));
        }

        if self.refresh.threshold.is_zero() {
            return Err(ConfigError::InvalidValue(
                "refresh threshold must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AuthConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_policy_constants() {
        let refresh = RefreshConfig::default();
        assert_eq!(refresh.threshold, Duration::from_secs(3600));
        assert_eq!(refresh.max_retries, 2);
        assert_eq!(refresh.attempt_timeout, Duration::from_secs(2));
        assert_eq!(refresh.base_backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_cookie_names_share_prefix() {
        let cookies = CookieConfig::default();
        assert_eq!(cookies.access_token_cookie(), "wf-auth-access-token");
        assert_eq!(cookies.refresh_token_cookie(), "wf-auth-refresh-token");
    }

    #[test]
    fn test_invalid_prefix_fails_validation() {
        let mut config = AuthConfig::default();
        config.routes.protected_prefixes.push("trips".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("trips"));
    }

    #[test]
    fn test_invalid_same_site_fails_validation() {
        let mut config = AuthConfig::default();
        config.cookies.same_site = "sideways".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("same_site"));
    }

    #[test]
    fn test_zero_attempt_timeout_fails_validation() {
        let mut config = AuthConfig::default();
        config.refresh.attempt_timeout = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("attempt_timeout"));
    }

    #[test]
    fn test_default_lifetime_bounded_by_max() {
        let mut config = AuthConfig::default();
        config.cookies.max_lifetime = Duration::from_secs(3600);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_lifetime"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = AuthConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AuthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.cookies.prefix, config.cookies.prefix);
        assert_eq!(parsed.refresh.max_retries, config.refresh.max_retries);
        assert_eq!(
            parsed.routes.protected_prefixes,
            config.routes.protected_prefixes
        );
    }

    #[test]
    fn test_toml_durations_parse() {
        let toml = r#"
            [refresh]
            threshold = "30m"
            attempt_timeout = "2s"
        "#;
        let config: AuthConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.refresh.threshold, Duration::from_secs(1800));
        assert_eq!(config.refresh.attempt_timeout, Duration::from_secs(2));
    }
}
