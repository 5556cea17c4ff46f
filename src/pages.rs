//! Static page handlers
//!
//! The landing and profile views are plain files under the configured
//! static directory; the profile page fetches `/api/user` client-side.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::AppState;
use crate::auth::MaybeUser;
use crate::error::AppError;

/// GET /
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    serve_page(&state, "index.html").await
}

/// GET /profile
///
/// Serves the profile page for authenticated visitors and redirects
/// anonymous ones home.
pub async fn profile(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, AppError> {
    if user.is_none() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(serve_page(&state, "profile.html").await?.into_response())
}

async fn serve_page(state: &AppState, file: &str) -> Result<Html<String>, AppError> {
    let path = state.config.server.static_dir.join(file);
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(Html(contents))
}
