//! Session model and lifecycle checks.
//!
//! A session is a time-bounded, server-issued proof of identity with an
//! embedded expiry and role/audience claims. Sessions are created and
//! refreshed exclusively by the identity provider; this crate only
//! validates them, evaluates expiry, and requests refresh.
//!
//! The wire field names (`user.id`, `user.email`, `user.aud`, `user.role`,
//! `expires_at`, `access_token`, `refresh_token`) are dictated by the
//! provider and must not be renamed.

pub mod expiry;
pub mod validator;

pub use expiry::{ExpiryStatus, evaluate, remaining_cookie_lifetime};
pub use validator::{ValidationReport, validate};

use serde::{Deserialize, Serialize};

/// The audience claim every authenticated session must carry.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Identity claims embedded in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Provider-assigned user identifier.
    #[serde(default)]
    pub id: String,

    /// User's email address.
    #[serde(default)]
    pub email: String,

    /// Audience claim; must equal [`AUTHENTICATED_AUDIENCE`].
    #[serde(default)]
    pub aud: String,

    /// User's role claim.
    #[serde(default)]
    pub role: String,
}

/// A server-issued proof of identity for one user for one continuous period.
///
/// Fields default to empty when absent from the wire payload; the provider
/// sends empty strings rather than omitting fields in some error paths, and
/// the validator treats both the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Identity claims for the session's user.
    #[serde(default)]
    pub user: SessionUser,

    /// Expiry timestamp in unix seconds.
    #[serde(default)]
    pub expires_at: i64,

    /// Bearer token presented to downstream services.
    #[serde(default)]
    pub access_token: String,

    /// Token exchanged with the provider to obtain a new session.
    #[serde(default)]
    pub refresh_token: String,
}

impl Session {
    /// Returns `true` if the session carries both tokens.
    #[must_use]
    pub fn has_tokens(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}
