//! Cookie synchronization planning.
//!
//! The identity provider emits cookie-set instructions as a side channel of
//! its validate/refresh calls. This module turns those instructions into a
//! finalized, policy-applied batch: base attributes from [`CookieConfig`],
//! `HttpOnly` forced on for token-bearing names, and `Max-Age` from the
//! session's clamped remaining lifetime.
//!
//! Planning is pure; the transport boundary (the axum middleware) applies
//! the planned batch to both the in-flight request and the outgoing
//! response. Each cookie is rendered independently so one bad instruction
//! never blocks the rest of the batch.

use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

use crate::config::CookieConfig;
use crate::error::AuthError;

/// Security attributes attached to a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieOptions {
    /// Whether the cookie is hidden from client-side scripts.
    pub http_only: bool,

    /// Whether the cookie requires HTTPS.
    pub secure: bool,

    /// SameSite attribute: "strict", "lax", or "none".
    pub same_site: String,

    /// Cookie path.
    pub path: String,

    /// Lifetime in seconds; `None` makes a session cookie.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,

    /// Cookie domain; `None` scopes to the request host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: false,
            secure: true,
            same_site: "lax".to_string(),
            path: "/".to_string(),
            max_age: None,
            domain: None,
        }
    }
}

/// A named credential fragment to be persisted client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieInstruction {
    /// Cookie name; auth cookies share the configured prefix.
    pub name: String,

    /// Cookie value.
    pub value: String,

    /// Security attributes.
    #[serde(default)]
    pub options: CookieOptions,
}

impl CookieInstruction {
    /// Creates an instruction with default options.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            options: CookieOptions::default(),
        }
    }
}

/// Returns `true` if the cookie name indicates it carries an access or
/// refresh token. `HttpOnly` is forced on for these.
#[must_use]
pub fn is_token_bearing(name: &str) -> bool {
    name.contains("token")
}

/// Returns `true` if the batch carries the minimum pair of auth cookies
/// (access token and refresh token) for a session to be cookie-backed.
#[must_use]
pub fn has_auth_pair(instructions: &[CookieInstruction], config: &CookieConfig) -> bool {
    let access = config.access_token_cookie();
    let refresh = config.refresh_token_cookie();
    instructions.iter().any(|c| c.name == access)
        && instructions.iter().any(|c| c.name == refresh)
}

/// Applies the cookie policy to a batch of provider instructions.
///
/// Base policy (`secure`, `same_site`, `path`, `domain`) comes from the
/// configuration; overrides force `http_only` for token-bearing names and
/// set `max_age` to the clamped remaining session lifetime.
#[must_use]
pub fn plan(
    instructions: Vec<CookieInstruction>,
    lifetime_secs: i64,
    config: &CookieConfig,
) -> Vec<CookieInstruction> {
    instructions
        .into_iter()
        .map(|mut instruction| {
            instruction.options.secure = config.secure;
            instruction.options.same_site = config.same_site.clone();
            instruction.options.path = config.path.clone();
            instruction.options.domain = config.domain.clone();
            instruction.options.max_age = Some(lifetime_secs);
            if is_token_bearing(&instruction.name) {
                instruction.options.http_only = true;
            }
            instruction
        })
        .collect()
}

/// Builds a `Set-Cookie`-ready cookie from one instruction.
///
/// # Errors
///
/// Returns `AuthError::CookieWrite` if the instruction has an empty name or
/// an unknown `same_site` value.
pub fn render(instruction: &CookieInstruction) -> Result<Cookie<'static>, AuthError> {
    if instruction.name.is_empty() {
        return Err(AuthError::cookie_write("<unnamed>", "empty cookie name"));
    }

    let same_site = parse_same_site(&instruction.options.same_site)
        .ok_or_else(|| {
            AuthError::cookie_write(
                &instruction.name,
                format!("unknown SameSite value '{}'", instruction.options.same_site),
            )
        })?;

    let mut cookie = Cookie::new(instruction.name.clone(), instruction.value.clone());
    cookie.set_http_only(instruction.options.http_only);
    cookie.set_secure(instruction.options.secure);
    cookie.set_same_site(same_site);
    cookie.set_path(instruction.options.path.clone());
    if let Some(max_age) = instruction.options.max_age {
        cookie.set_max_age(time::Duration::seconds(max_age));
    }
    if let Some(domain) = &instruction.options.domain {
        cookie.set_domain(domain.clone());
    }

    Ok(cookie)
}

/// Renders a batch of instructions with per-cookie isolation.
///
/// A failure rendering cookie *i* is logged and does not prevent rendering
/// cookies *i+1..n*; there is no all-or-nothing transaction across the
/// batch.
#[must_use]
pub fn render_batch(instructions: &[CookieInstruction]) -> Vec<Cookie<'static>> {
    let mut rendered = Vec::with_capacity(instructions.len());
    for instruction in instructions {
        match render(instruction) {
            Ok(cookie) => rendered.push(cookie),
            Err(e) => {
                tracing::warn!(
                    cookie = %instruction.name,
                    error = %e,
                    "failed to render cookie, continuing with rest of batch"
                );
            }
        }
    }
    rendered
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}
