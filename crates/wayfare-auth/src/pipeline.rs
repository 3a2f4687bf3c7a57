//! The per-request session lifecycle pipeline.
//!
//! Runs on every inbound request: fetch the session from the identity
//! provider, validate it, evaluate expiry, proactively refresh when close
//! to expiry, plan the cookie batch, and make the admission decision.
//!
//! The pipeline is a pure decision function: it returns an explicit
//! [`PipelineDecision`] and performs no transport side effects. The axum
//! middleware applies the decision to the live request and response.
//!
//! Error posture is fail-open: every internal failure (provider down,
//! malformed session, rejected refresh) degrades to "no valid session" and
//! lets the route guard make a safe admission decision instead of
//! returning a 500.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};

use crate::config::AuthConfig;
use crate::cookies::{self, CookieInstruction};
use crate::guard::{self, RouteDecision};
use crate::provider::IdentityProvider;
use crate::refresh::RefreshCoordinator;
use crate::session::{self, Session, ValidationReport};

/// The pipeline's decision for one request.
#[derive(Debug, Clone, Default)]
pub struct PipelineDecision {
    /// Finalized cookie batch to mirror onto the request and response.
    pub cookies: Vec<CookieInstruction>,

    /// Redirect target, when the request should not reach its handler.
    pub redirect: Option<String>,

    /// Headers to attach to the response (cache-control for
    /// auth-sensitive paths).
    pub headers: Vec<(HeaderName, HeaderValue)>,

    /// Wait before redirecting, giving the client time to persist cookies.
    pub delay: Option<Duration>,

    /// The validated (possibly refreshed) session, for downstream
    /// consumers.
    pub session: Option<Session>,
}

impl PipelineDecision {
    /// The do-nothing decision: continue unmodified.
    ///
    /// This is also the last-resort fallback when applying a decision
    /// fails: availability is prioritized over strict enforcement.
    #[must_use]
    pub fn pass_through() -> Self {
        Self::default()
    }
}

/// Orchestrates the session lifecycle for one request at a time.
///
/// All state is scoped to a single request/response pair; the pipeline
/// itself holds only configuration and can serve concurrent requests
/// without contention.
pub struct SessionPipeline {
    config: AuthConfig,
    coordinator: RefreshCoordinator,
}

impl SessionPipeline {
    /// Creates a pipeline from configuration.
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let coordinator = RefreshCoordinator::new(&config.refresh);
        Self {
            config,
            coordinator,
        }
    }

    /// The pipeline's configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Runs the full pipeline for one request.
    pub async fn run(
        &self,
        provider: &dyn IdentityProvider,
        path: &str,
        now: i64,
    ) -> PipelineDecision {
        let class = guard::classify(path, &self.config.routes);

        let (fetched, mut instructions, report) = self.fetch_session(provider).await;

        let mut session_valid = false;
        let mut session = None;
        if let Some(current) = fetched {
            if report.valid {
                let status = session::evaluate(&current, now);
                if status.is_expired {
                    tracing::debug!(user_id = %current.user.id, path, "session expired");
                } else {
                    let outcome = self.coordinator.maybe_refresh(provider, &current, now).await;
                    if outcome.refreshed {
                        instructions.extend(outcome.cookies);
                    }
                    session_valid = true;
                    session = Some(outcome.session);
                }
            } else {
                tracing::debug!(path, errors = ?report.errors, "session failed validation");
            }
        }

        let cookies = self.plan_cookies(instructions, session.as_ref(), now);

        let decision = guard::decide(class, session_valid, &self.config.routes);
        let headers = if class.is_auth_sensitive() {
            guard::cache_headers()
        } else {
            Vec::new()
        };

        let (redirect, delay) = match decision {
            RouteDecision::Continue => (None, None),
            RouteDecision::RedirectTo(target) => {
                // Redirecting an authenticated user away from the auth flow
                // waits for cookie propagation.
                let delay = (class == guard::RouteClass::AuthFlow)
                    .then_some(self.config.routes.propagation_delay);
                tracing::debug!(path, target = %target, session_valid, "redirecting request");
                (Some(target), delay)
            }
        };

        PipelineDecision {
            cookies,
            redirect,
            headers,
            delay,
            session,
        }
    }

    /// Fetches and structurally validates the current session.
    async fn fetch_session(
        &self,
        provider: &dyn IdentityProvider,
    ) -> (Option<Session>, Vec<CookieInstruction>, ValidationReport) {
        match provider.get_session().await {
            Ok(response) => match response.session {
                Some(session) => {
                    let report = session::validate(&session);
                    (Some(session), response.cookies, report)
                }
                None => (
                    None,
                    response.cookies,
                    ValidationReport::failure("no session for request"),
                ),
            },
            Err(e) => {
                tracing::debug!(error = %e, category = %e.category(), "session lookup failed");
                (None, Vec::new(), ValidationReport::failure(e))
            }
        }
    }

    /// Applies the cookie policy to the collected instructions.
    fn plan_cookies(
        &self,
        instructions: Vec<CookieInstruction>,
        session: Option<&Session>,
        now: i64,
    ) -> Vec<CookieInstruction> {
        if instructions.is_empty() {
            return Vec::new();
        }

        let default_secs = self.config.cookies.default_lifetime.as_secs() as i64;
        let max_secs = self.config.cookies.max_lifetime.as_secs() as i64;
        let lifetime = match session {
            Some(s) => {
                let status = session::evaluate(s, now);
                session::expiry::clamp_lifetime(status.seconds_remaining, max_secs, default_secs)
            }
            None => default_secs,
        };

        let planned = cookies::plan(instructions, lifetime, &self.config.cookies);
        if !cookies::has_auth_pair(&planned, &self.config.cookies) {
            tracing::debug!("cookie batch lacks token pair, session is not cookie-backed");
        }
        planned
    }
}
