//! # wayfare-auth
//!
//! Authenticated session lifecycle management for the Wayfare travel
//! planner.
//!
//! This crate runs on every inbound request. It validates the signed
//! session the identity provider issued, decides whether to proactively
//! refresh it before expiry, reconciles the resulting auth cookies across
//! both the continuing request and the outgoing response, and makes
//! route-admission decisions (pass through, redirect to login, redirect
//! home) from path classification and session validity.
//!
//! Sessions are minted exclusively by the identity provider; this crate
//! only consumes its validate/refresh operations.
//!
//! ## Modules
//!
//! - [`config`] - Route, cookie, and refresh policy configuration
//! - [`session`] - Session model, validator, and expiry evaluator
//! - [`refresh`] - Bounded-retry proactive refresh coordination
//! - [`cookies`] - Cookie batch planning and rendering
//! - [`guard`] - Route classification and admission decisions
//! - [`pipeline`] - The per-request decision pipeline
//! - [`provider`] - Identity provider trait and HTTP client
//! - [`middleware`] - Axum middleware applying decisions to live requests

pub mod config;
pub mod cookies;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod pipeline;
pub mod provider;
pub mod refresh;
pub mod session;

pub use config::{AuthConfig, ConfigError, CookieConfig, RefreshConfig, RouteConfig};
pub use cookies::{CookieInstruction, CookieOptions};
pub use error::{AuthError, ErrorCategory};
pub use guard::{RouteClass, RouteDecision};
pub use middleware::{AuthState, CurrentSession, session_middleware};
pub use pipeline::{PipelineDecision, SessionPipeline};
pub use provider::{
    HttpIdentityProvider, HttpProviderConfig, HttpProviderFactory, IdentityProvider,
    ProviderFactory, ProviderResponse,
};
pub use refresh::{RefreshCoordinator, RefreshOutcome, RetryPolicy};
pub use session::{Session, SessionUser, ValidationReport};

/// Type alias for session lifecycle results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use wayfare_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError, CookieConfig, RefreshConfig, RouteConfig};
    pub use crate::cookies::{CookieInstruction, CookieOptions};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::guard::{RouteClass, RouteDecision};
    pub use crate::middleware::{AuthState, CurrentSession, session_middleware};
    pub use crate::pipeline::{PipelineDecision, SessionPipeline};
    pub use crate::provider::{
        HttpIdentityProvider, HttpProviderConfig, HttpProviderFactory, IdentityProvider,
        ProviderFactory, ProviderResponse,
    };
    pub use crate::refresh::{RefreshCoordinator, RefreshOutcome, RetryPolicy};
    pub use crate::session::{Session, SessionUser, ValidationReport};
}
