use std::env;
use std::sync::Arc;

use url::Url;
use wayfare_auth::{AuthState, HttpProviderConfig, HttpProviderFactory};
use wayfare_server::{build_router, load_config, observability};

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else).
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    let config_path =
        env::var("WAYFARE_CONFIG").unwrap_or_else(|_| "wayfare.toml".to_string());

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    observability::init_tracing(&config.logging.level);
    tracing::info!(path = %config_path, "Configuration loaded");

    let base_url = match Url::parse(&config.provider.base_url) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("Invalid provider base_url '{}': {e}", config.provider.base_url);
            std::process::exit(2);
        }
    };

    let api_key = match env::var(&config.provider.api_key_env) {
        Ok(k) => k,
        Err(_) => {
            eprintln!(
                "Missing provider API key: set the {} environment variable",
                config.provider.api_key_env
            );
            std::process::exit(2);
        }
    };

    let providers = Arc::new(HttpProviderFactory::new(HttpProviderConfig::new(
        base_url, api_key,
    )));
    let state = AuthState::new(config.auth.clone(), providers);
    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(&config.listen).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind {}: {e}", config.listen);
            std::process::exit(2);
        }
    };

    tracing::info!(listen = %config.listen, "Wayfare server started");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {e}");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install shutdown signal handler");
    }
    tracing::info!("Shutdown signal received");
}
