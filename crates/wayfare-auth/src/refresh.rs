//! Proactive session refresh coordination.
//!
//! When a session is inside the refresh window (less than the configured
//! threshold from expiry, but not yet expired), the coordinator exchanges
//! the refresh token for a new session. Every attempt races the provider
//! call against a per-attempt timeout; retries back off linearly.
//!
//! A refreshed session is accepted only if it independently passes the
//! validator and its `expires_at` strictly exceeds the prior session's
//! (monotonicity invariant, rejecting stale or duplicate refresh
//! responses). On exhaustion the coordinator logs the failure and returns
//! the original session unchanged: a request is never blocked or failed
//! because of a refresh problem.

use std::time::Duration;

use crate::config::RefreshConfig;
use crate::cookies::CookieInstruction;
use crate::error::AuthError;
use crate::provider::{IdentityProvider, ProviderResponse};
use crate::session::{self, Session};

/// Bounded-retry policy for refresh attempts.
///
/// Expressed as an explicit type so the retry contract is testable on its
/// own: `max_attempts` total tries, each bounded by `attempt_timeout`, with
/// retry `k` preceded by a `k * base_backoff` wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, counting the initial one.
    pub max_attempts: u32,

    /// Per-attempt timeout; a losing race counts as a failed attempt.
    pub attempt_timeout: Duration,

    /// Base backoff unit.
    pub base_backoff: Duration,
}

impl RetryPolicy {
    /// Derives the policy from refresh configuration.
    #[must_use]
    pub fn from_config(config: &RefreshConfig) -> Self {
        Self {
            max_attempts: config.max_retries + 1,
            attempt_timeout: config.attempt_timeout,
            base_backoff: config.base_backoff,
        }
    }

    /// Wait before retry `k` (1-based).
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        self.base_backoff * retry
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RefreshConfig::default())
    }
}

/// Result of a refresh decision.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// The session to continue the request with. Identical to the input
    /// when no refresh was performed or every attempt failed.
    pub session: Session,

    /// `true` when a refreshed session was accepted.
    pub refreshed: bool,

    /// Cookie instructions from the accepted attempt. Instructions from
    /// abandoned attempts are discarded.
    pub cookies: Vec<CookieInstruction>,
}

impl RefreshOutcome {
    fn unchanged(session: &Session) -> Self {
        Self {
            session: session.clone(),
            refreshed: false,
            cookies: Vec::new(),
        }
    }
}

/// Orchestrates bounded-retry, timed-out refresh calls.
#[derive(Debug, Clone)]
pub struct RefreshCoordinator {
    policy: RetryPolicy,
    threshold_secs: i64,
}

impl RefreshCoordinator {
    /// Creates a coordinator from refresh configuration.
    #[must_use]
    pub fn new(config: &RefreshConfig) -> Self {
        Self {
            policy: RetryPolicy::from_config(config),
            threshold_secs: config.threshold.as_secs() as i64,
        }
    }

    /// Returns `true` if the session is inside the refresh window.
    ///
    /// Expired sessions are not refreshed here; they fall through to the
    /// route guard's admission decision.
    #[must_use]
    pub fn should_refresh(&self, session: &Session, now: i64) -> bool {
        let status = session::evaluate(session, now);
        !status.is_expired && status.seconds_remaining < self.threshold_secs
    }

    /// Refreshes the session if it is inside the refresh window.
    ///
    /// Returns the original session untouched when no refresh is needed or
    /// when every attempt fails; refresh problems never surface to the
    /// caller.
    pub async fn maybe_refresh(
        &self,
        provider: &dyn IdentityProvider,
        session: &Session,
        now: i64,
    ) -> RefreshOutcome {
        if !self.should_refresh(session, now) {
            return RefreshOutcome::unchanged(session);
        }

        tracing::debug!(
            user_id = %session.user.id,
            seconds_remaining = session.expires_at - now,
            "session inside refresh window, refreshing"
        );

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.policy.backoff(attempt - 1)).await;
            }

            match tokio::time::timeout(self.policy.attempt_timeout, provider.refresh_session())
                .await
            {
                Err(_) => {
                    tracing::warn!(attempt, "refresh attempt timed out, result abandoned");
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, attempt, "refresh attempt failed");
                }
                Ok(Ok(response)) => match Self::accept(session, response) {
                    Ok(outcome) => {
                        tracing::info!(
                            user_id = %outcome.session.user.id,
                            expires_at = outcome.session.expires_at,
                            attempt,
                            "session refreshed"
                        );
                        return outcome;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, attempt, "refresh response rejected");
                    }
                },
            }
        }

        tracing::warn!(
            user_id = %session.user.id,
            attempts = self.policy.max_attempts,
            "session refresh exhausted all attempts, continuing with original session"
        );
        RefreshOutcome::unchanged(session)
    }

    /// Acceptance check for a refresh response.
    fn accept(prior: &Session, response: ProviderResponse) -> Result<RefreshOutcome, AuthError> {
        let refreshed = response
            .session
            .ok_or_else(|| AuthError::refresh("provider returned no session"))?;

        let report = session::validate(&refreshed);
        if !report.valid {
            return Err(AuthError::refresh(format!(
                "refreshed session failed validation: {}",
                report.errors.join("; ")
            )));
        }

        if refreshed.expires_at <= prior.expires_at {
            return Err(AuthError::refresh(format!(
                "non-monotonic expiry: refreshed {} <= prior {}",
                refreshed.expires_at, prior.expires_at
            )));
        }

        Ok(RefreshOutcome {
            session: refreshed,
            refreshed: true,
            cookies: response.cookies,
        })
    }
}
