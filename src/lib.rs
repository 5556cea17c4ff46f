//! Gatehouse - a minimal GitHub OAuth sign-in server
//!
//! Authenticates a visitor through GitHub's authorization-code flow,
//! keeps the resulting profile in a server-side session, and exposes it
//! to a single-page profile view.
//!
//! # Modules
//!
//! - `auth`: OAuth flow, sessions, authentication gate
//! - `api`: JSON endpoint exposing the signed-in profile
//! - `pages`: static landing and profile pages
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod pages;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains the configuration,
/// the session repository, and the provider client.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Server-side session repository
    pub sessions: Arc<dyn auth::SessionStore>,

    /// GitHub identity provider client
    pub github: Arc<auth::GitHubClient>,
}

impl AppState {
    /// Initialize application state with the in-memory session store
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        Self::with_session_store(config, Arc::new(auth::MemorySessionStore::new()))
    }

    /// Initialize application state with an injected session repository
    ///
    /// The repository is a capability; a deployment can back it with a
    /// shared cache or database instead of process memory.
    pub fn with_session_store(
        config: config::AppConfig,
        sessions: Arc<dyn auth::SessionStore>,
    ) -> Result<Self, error::AppError> {
        let github = auth::GitHubClient::new(&config.auth.github)?;

        Ok(Self {
            config: Arc::new(config),
            sessions,
            github: Arc::new(github),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{Router, routing::get};
    use tower_http::{services::ServeDir, trace::TraceLayer};

    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(pages::home))
        .route("/profile", get(pages::profile))
        .merge(auth::auth_router())
        .nest("/api", api::api_router())
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
