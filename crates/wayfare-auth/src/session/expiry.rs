//! Expiry evaluation.
//!
//! Computes remaining lifetime and expiry state from a session's timestamp.
//! This is the one fail-closed check in the pipeline: an unusable timestamp
//! evaluates as already expired, and downstream treats "expired" as "needs
//! refresh or logout" rather than as a hard failure.

use super::Session;

/// Fallback cookie lifetime when the remaining session lifetime is unusable.
pub const DEFAULT_COOKIE_LIFETIME_SECS: i64 = 7 * 24 * 3600;

/// Upper bound on a cookie lifetime derived from a session.
pub const MAX_COOKIE_LIFETIME_SECS: i64 = 30 * 24 * 3600;

/// Expiry state of a session at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryStatus {
    /// `true` when no lifetime remains.
    pub is_expired: bool,

    /// Seconds until expiry; non-positive when expired.
    pub seconds_remaining: i64,
}

/// Evaluates a session's expiry state at `now` (unix seconds).
///
/// A missing timestamp (zero or negative `expires_at`) evaluates as expired
/// with zero seconds remaining.
#[must_use]
pub fn evaluate(session: &Session, now: i64) -> ExpiryStatus {
    if session.expires_at <= 0 {
        return ExpiryStatus {
            is_expired: true,
            seconds_remaining: 0,
        };
    }

    let seconds_remaining = session.expires_at - now;
    ExpiryStatus {
        is_expired: seconds_remaining <= 0,
        seconds_remaining,
    }
}

/// Clamps a remaining lifetime to the usable cookie range.
///
/// Values inside `[1, max]` pass through; anything outside (clock skew,
/// corrupted data, already expired) falls back to `default`.
#[must_use]
pub fn clamp_lifetime(seconds_remaining: i64, max: i64, default: i64) -> i64 {
    if (1..=max).contains(&seconds_remaining) {
        seconds_remaining
    } else {
        default
    }
}

/// Returns the session's remaining lifetime clamped for use as a cookie
/// `Max-Age`, falling back to [`DEFAULT_COOKIE_LIFETIME_SECS`].
#[must_use]
pub fn remaining_cookie_lifetime(session: &Session, now: i64) -> i64 {
    let status = evaluate(session, now);
    clamp_lifetime(
        status.seconds_remaining,
        MAX_COOKIE_LIFETIME_SECS,
        DEFAULT_COOKIE_LIFETIME_SECS,
    )
}
