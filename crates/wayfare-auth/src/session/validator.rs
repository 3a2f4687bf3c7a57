//! Structural and semantic session validation.
//!
//! The validator accumulates every failure rather than short-circuiting on
//! the first one, so logs show the complete picture of a malformed session.
//! It is a pure function: no clock reads, no provider calls.

use super::{AUTHENTICATED_AUDIENCE, Session};

/// Result of validating a session. Produced fresh per call.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// `true` when every check passed.
    pub valid: bool,

    /// One entry per failed check, naming the offending field.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// A report with no failures.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A report for a failure that happened before field checks could run,
    /// e.g. a provider error while fetching the session.
    #[must_use]
    pub fn failure(message: impl std::fmt::Display) -> Self {
        Self {
            valid: false,
            errors: vec![format!("validation failed: {message}")],
        }
    }
}

/// Validates a session's structural and semantic integrity.
///
/// Checks, in order: user id, email, expiry timestamp, access token,
/// audience, role. All failures are collected into the report.
#[must_use]
pub fn validate(session: &Session) -> ValidationReport {
    let mut errors = Vec::new();

    if session.user.id.is_empty() {
        errors.push("missing user id".to_string());
    }
    if session.user.email.is_empty() {
        errors.push("missing user email".to_string());
    }
    if session.expires_at <= 0 {
        errors.push("missing expires_at".to_string());
    }
    if session.access_token.is_empty() {
        errors.push("missing access token".to_string());
    }
    if session.user.aud != AUTHENTICATED_AUDIENCE {
        errors.push(format!(
            "audience must be '{AUTHENTICATED_AUDIENCE}', got '{}'",
            session.user.aud
        ));
    }
    if session.user.role.is_empty() {
        errors.push("missing user role".to_string());
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}
