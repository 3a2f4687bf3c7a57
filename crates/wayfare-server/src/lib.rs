//! Wayfare web server.
//!
//! Thin transport shell: loads configuration, initializes tracing,
//! constructs the identity provider client and session pipeline as
//! explicit dependencies, and mounts the session middleware on the
//! application router.

pub mod config;
pub mod observability;
pub mod routes;

pub use config::{ConfigLoadError, ServerConfig, load_config};
pub use routes::build_router;
