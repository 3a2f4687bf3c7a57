//! Identity provider interface.
//!
//! The identity provider mints, validates, and refreshes sessions; this
//! crate only consumes its two operations. Both calls may emit zero or more
//! cookie-set instructions as a side channel, which the pipeline mirrors
//! onto the request and response.
//!
//! The trait is object-safe and injected as `Arc<dyn IdentityProvider>` so
//! the whole pipeline is testable without process-wide state.

pub mod http;

pub use http::{HttpIdentityProvider, HttpProviderConfig, HttpProviderFactory};

use std::sync::Arc;

use async_trait::async_trait;

use crate::cookies::CookieInstruction;
use crate::error::AuthError;
use crate::session::Session;

/// Response from an identity provider call.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    /// The session, when the provider recognized the caller.
    pub session: Option<Session>,

    /// Cookie-set instructions emitted alongside the session.
    pub cookies: Vec<CookieInstruction>,
}

impl ProviderResponse {
    /// A response carrying no session and no cookie instructions.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A response carrying a session and no cookie instructions.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Some(session),
            cookies: Vec::new(),
        }
    }
}

/// The identity provider's validate/refresh contract.
///
/// Both calls are idempotent from this crate's perspective: concurrent
/// calls from different requests are independent, and each refresh result
/// is individually checked for monotonicity before acceptance.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the current session for the calling request, if any.
    async fn get_session(&self) -> Result<ProviderResponse, AuthError>;

    /// Exchanges the refresh token for a new session.
    async fn refresh_session(&self) -> Result<ProviderResponse, AuthError>;
}

/// Builds a provider scoped to one request's credentials.
///
/// The middleware extracts the auth cookies from each inbound request and
/// asks the factory for a provider bound to them. Factories own any shared
/// infrastructure (HTTP client, base URL) and hand out cheap per-request
/// handles.
pub trait ProviderFactory: Send + Sync {
    /// Creates a provider bound to the given request credentials.
    fn for_request(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Arc<dyn IdentityProvider>;
}
