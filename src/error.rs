//! Error types for Gatehouse
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// The OAuth redemption branches are explicit variants so handlers
/// propagate them with `?` instead of catching ad hoc.
#[derive(Debug, Error)]
pub enum AppError {
    /// Callback request carried no authorization code (400)
    #[error("No code provided")]
    MissingCode,

    /// Token endpoint answered without an access token (400)
    #[error("Failed to get access token")]
    TokenExchange,

    /// Profile fetch failed: transport, status, or decode (500)
    #[error("Failed to fetch user profile: {0}")]
    ProfileFetch(#[source] reqwest::Error),

    /// Any other provider transport failure (500)
    #[error("Provider request failed: {0}")]
    Provider(#[from] reqwest::Error),

    /// Authentication required (401)
    #[error("Not logged in")]
    Unauthorized,

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each variant to its status code and a `{"error": ...}` body.
    /// Provider and internal failures are logged here; the client only
    /// sees a generic message.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message) = match &self {
            AppError::MissingCode => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::TokenExchange => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::ProfileFetch(_) | AppError::Provider(_) => {
                tracing::error!(error = %self, "OAuth provider request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "OAuth error".to_string())
            }
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Internal(_) => {
                tracing::error!(error = %self, "Unhandled internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
