//! Server configuration loading.
//!
//! Configuration lives in a TOML file (default `wayfare.toml`) with the
//! auth policy nested under `[auth]`. Secrets are not stored in the file:
//! the provider API key is read from the environment variable named by
//! `provider.api_key_env`.

use serde::{Deserialize, Serialize};
use wayfare_auth::AuthConfig;

/// Root server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:3000`.
    pub listen: String,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Identity provider endpoint configuration.
    pub provider: ProviderConfig,

    /// Session lifecycle policy.
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            logging: LoggingConfig::default(),
            provider: ProviderConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base log level when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Identity provider endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the identity provider API.
    pub base_url: String,

    /// Environment variable holding the provider API key.
    pub api_key_env: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://id.wayfare.example/auth/v1/".to_string(),
            api_key_env: "WAYFARE_PROVIDER_API_KEY".to_string(),
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// The configuration file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// The configuration failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] wayfare_auth::ConfigError),
}

/// Loads configuration from a TOML file, falling back to defaults when the
/// file does not exist.
pub fn load_config(path: &str) -> Result<ServerConfig, ConfigLoadError> {
    let config = match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
            path: path.to_string(),
            source,
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path, "config file not found, using defaults");
            ServerConfig::default()
        }
        Err(source) => {
            return Err(ConfigLoadError::Io {
                path: path.to_string(),
                source,
            });
        }
    };

    config.auth.validate()?;
    Ok(config)
}
