//! HTTP identity provider client.
//!
//! Talks to the hosted identity provider over its JSON wire format. Each
//! response carries an optional session, an optional error, and zero or
//! more cookie-set instructions:
//!
//! ```json
//! {
//!   "session": { "user": { ... }, "expires_at": 1735689600, ... },
//!   "error": null,
//!   "set_cookie": [ { "name": "...", "value": "...", "options": { ... } } ]
//! }
//! ```
//!
//! The factory owns the shared `reqwest` client; per-request providers are
//! cheap clones bound to that request's tokens.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{IdentityProvider, ProviderFactory, ProviderResponse};
use crate::cookies::CookieInstruction;
use crate::error::AuthError;
use crate::session::Session;

/// Configuration for the HTTP identity provider client.
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    /// Base URL of the identity provider, e.g. `https://id.wayfare.example/auth/v1/`.
    pub base_url: Url,

    /// Project API key sent with every call.
    pub api_key: String,

    /// HTTP request timeout (default: 5 seconds).
    ///
    /// This bounds a single HTTP exchange; the refresh coordinator applies
    /// its own tighter per-attempt timeout on top.
    pub request_timeout: Duration,
}

impl HttpProviderConfig {
    /// Creates a new configuration with the provider base URL and API key.
    #[must_use]
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Wire shape of a provider response.
#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    session: Option<Session>,
    #[serde(default)]
    error: Option<WireError>,
    #[serde(default)]
    set_cookie: Vec<CookieInstruction>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    message: String,
}

/// Identity provider client bound to one request's credentials.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    config: Arc<HttpProviderConfig>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl HttpIdentityProvider {
    /// Creates a provider with its own HTTP client.
    #[must_use]
    pub fn new(config: HttpProviderConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config: Arc::new(config),
            access_token: None,
            refresh_token: None,
        }
    }

    /// Binds the access token presented by the inbound request.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Binds the refresh token presented by the inbound request.
    #[must_use]
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.config.base_url.join(path).map_err(|e| {
            AuthError::identity_provider(format!("invalid provider endpoint '{path}': {e}"))
        })
    }

    async fn read_response(response: reqwest::Response) -> Result<ProviderResponse, AuthError> {
        let status = response.status();
        let body: WireResponse = response.json().await.map_err(|e| {
            AuthError::identity_provider(format!("unreadable provider response: {e}"))
        })?;

        if let Some(error) = body.error {
            return Err(AuthError::identity_provider(error.message));
        }
        if !status.is_success() {
            return Err(AuthError::identity_provider(format!(
                "provider returned status {status}"
            )));
        }

        Ok(ProviderResponse {
            session: body.session,
            cookies: body.set_cookie,
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn get_session(&self) -> Result<ProviderResponse, AuthError> {
        // An anonymous request has no session to look up.
        let Some(access_token) = &self.access_token else {
            return Ok(ProviderResponse::empty());
        };

        let url = self.endpoint("session")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .header("apikey", &self.config.api_key)
            .send()
            .await?;

        Self::read_response(response).await
    }

    async fn refresh_session(&self) -> Result<ProviderResponse, AuthError> {
        let Some(refresh_token) = &self.refresh_token else {
            return Err(AuthError::refresh("no refresh token to exchange"));
        };

        let url = self.endpoint("token")?;
        let response = self
            .client
            .post(url)
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.config.api_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        Self::read_response(response).await
    }
}

/// Factory handing out per-request HTTP providers over one shared client.
pub struct HttpProviderFactory {
    base: HttpIdentityProvider,
}

impl HttpProviderFactory {
    /// Creates a factory with a shared HTTP client.
    #[must_use]
    pub fn new(config: HttpProviderConfig) -> Self {
        Self {
            base: HttpIdentityProvider::new(config),
        }
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn for_request(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Arc<dyn IdentityProvider> {
        let mut provider = self.base.clone();
        provider.access_token = access_token.map(ToString::to_string);
        provider.refresh_token = refresh_token.map(ToString::to_string);
        Arc::new(provider)
    }
}
