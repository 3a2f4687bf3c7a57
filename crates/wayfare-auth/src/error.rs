//! Session lifecycle error types.
//!
//! This module defines all error types that can occur while validating,
//! refreshing, or synchronizing a session. None of these errors propagate to
//! the end user: the pipeline handles every kind locally and degrades to a
//! safe admission decision (fail-open).

use std::fmt;

/// Errors that can occur during session lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A session field is missing or has an invalid value.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of which field failed validation.
        message: String,
    },

    /// The session is past its `expires_at` timestamp.
    #[error("Session expired")]
    Expired,

    /// A refresh attempt failed: network failure, timeout, or a
    /// non-monotonic refresh result.
    #[error("Refresh error: {message}")]
    Refresh {
        /// Description of why the refresh was not accepted.
        message: String,
    },

    /// A single cookie could not be built or applied.
    #[error("Cookie write error for '{name}': {message}")]
    CookieWrite {
        /// Name of the cookie that failed.
        name: String,
        /// Description of the failure.
        message: String,
    },

    /// The identity provider returned an error or an unusable response.
    #[error("Identity provider error: {message}")]
    IdentityProvider {
        /// Description of the provider error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new `Refresh` error.
    #[must_use]
    pub fn refresh(message: impl Into<String>) -> Self {
        Self::Refresh {
            message: message.into(),
        }
    }

    /// Creates a new `CookieWrite` error.
    #[must_use]
    pub fn cookie_write(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CookieWrite {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a new `IdentityProvider` error.
    #[must_use]
    pub fn identity_provider(message: impl Into<String>) -> Self {
        Self::IdentityProvider {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this error relates to the session itself rather
    /// than to infrastructure (provider, configuration, internals).
    #[must_use]
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Expired | Self::Refresh { .. }
        )
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Expired => ErrorCategory::Expiry,
            Self::Refresh { .. } => ErrorCategory::Refresh,
            Self::CookieWrite { .. } => ErrorCategory::Cookie,
            Self::IdentityProvider { .. } => ErrorCategory::Provider,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::IdentityProvider {
            message: err.to_string(),
        }
    }
}

/// Categories of session lifecycle errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Session field validation errors.
    Validation,
    /// Expiry evaluation errors.
    Expiry,
    /// Refresh coordination errors.
    Refresh,
    /// Cookie synchronization errors.
    Cookie,
    /// Identity provider errors.
    Provider,
    /// Configuration errors.
    Configuration,
    /// Internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Expiry => write!(f, "expiry"),
            Self::Refresh => write!(f, "refresh"),
            Self::Cookie => write!(f, "cookie"),
            Self::Provider => write!(f, "provider"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::validation("missing user email");
        assert_eq!(err.to_string(), "Validation error: missing user email");

        let err = AuthError::Expired;
        assert_eq!(err.to_string(), "Session expired");

        let err = AuthError::cookie_write("wf-auth-access-token", "bad attribute");
        assert_eq!(
            err.to_string(),
            "Cookie write error for 'wf-auth-access-token': bad attribute"
        );

        let err = AuthError::refresh("non-monotonic expiry");
        assert_eq!(err.to_string(), "Refresh error: non-monotonic expiry");
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::validation("x").category(),
            ErrorCategory::Validation
        );
        assert_eq!(AuthError::Expired.category(), ErrorCategory::Expiry);
        assert_eq!(AuthError::refresh("x").category(), ErrorCategory::Refresh);
        assert_eq!(
            AuthError::cookie_write("a", "b").category(),
            ErrorCategory::Cookie
        );
        assert_eq!(
            AuthError::identity_provider("x").category(),
            ErrorCategory::Provider
        );
        assert_eq!(
            AuthError::configuration("x").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(AuthError::internal("x").category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_session_error_predicate() {
        assert!(AuthError::validation("x").is_session_error());
        assert!(AuthError::Expired.is_session_error());
        assert!(AuthError::refresh("x").is_session_error());
        assert!(!AuthError::identity_provider("x").is_session_error());
        assert!(!AuthError::configuration("x").is_session_error());
        assert!(!AuthError::cookie_write("a", "b").is_session_error());
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::Expiry.to_string(), "expiry");
        assert_eq!(ErrorCategory::Refresh.to_string(), "refresh");
        assert_eq!(ErrorCategory::Cookie.to_string(), "cookie");
        assert_eq!(ErrorCategory::Provider.to_string(), "provider");
    }
}
