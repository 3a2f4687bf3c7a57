//! HTTP routes and router assembly.
//!
//! The handlers here are the transport shell around the session
//! middleware: placeholder pages for the auth flow and the protected app
//! area. Trip CRUD, chat, and the other product surfaces mount their own
//! routers behind the same middleware.

use axum::{Json, Router, middleware, response::Html, routing::get};
use serde_json::json;
use tower_http::trace::TraceLayer;
use wayfare_auth::{AuthState, CurrentSession, session_middleware};

/// Builds the application router with the session middleware attached.
pub fn build_router(state: AuthState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/trips", get(trips))
        .route("/login", get(login))
        .layer(middleware::from_fn_with_state(state, session_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn home() -> Html<&'static str> {
    Html("<h1>Wayfare</h1><p>Plan your next trip.</p>")
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Protected area; the middleware guarantees a validated session here.
async fn trips(CurrentSession(session): CurrentSession) -> Json<serde_json::Value> {
    Json(json!({
        "user": session.user.email,
        "trips": [],
    }))
}

async fn login() -> Html<&'static str> {
    Html("<h1>Sign in to Wayfare</h1>")
}
