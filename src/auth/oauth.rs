//! GitHub OAuth flow
//!
//! Implements the OAuth 2.0 authorization code flow with GitHub.

use axum::{
    Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
    routing::get,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;

use super::session::{
    SESSION_COOKIE, Session, generate_session_id, sign_session_id, verify_session_cookie,
};
use crate::AppState;
use crate::error::AppError;

/// Create authentication router
///
/// Routes:
/// - GET /login - Redirect to GitHub
/// - GET /auth/github/callback - OAuth callback
/// - GET /logout - Logout
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(github_redirect))
        .route("/auth/github/callback", get(github_callback))
        .route("/logout", get(logout))
}

// =============================================================================
// GitHub OAuth
// =============================================================================

/// GET /login
///
/// Redirects the visitor to GitHub's authorization page with client id,
/// callback URL, and requested scopes.
async fn github_redirect(State(state): State<AppState>) -> impl IntoResponse {
    Redirect::to(&state.github.authorize_redirect_url())
}

/// Query parameters from GitHub callback
#[derive(Debug, Deserialize)]
struct CallbackQuery {
    /// Authorization code; absent when the visitor denied access
    code: Option<String>,
}

/// GET /auth/github/callback
///
/// Handles OAuth callback from GitHub.
///
/// # Steps
/// 1. Require an authorization code
/// 2. Exchange code for access token
/// 3. Fetch user profile from GitHub
/// 4. Store the session and set the signed id cookie
/// 5. Redirect to the profile page
///
/// Every failure leaves the session untouched; nothing is created until
/// the profile fetch has succeeded.
async fn github_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or(AppError::MissingCode)?;

    let access_token = state.github.exchange_code(&code).await?;

    // The token is used for this one fetch and then dropped.
    let user = state.github.fetch_user(&access_token).await?;

    let session_id = generate_session_id();
    let cookie_value = sign_session_id(&session_id, &state.config.auth.session_secret)?;
    state
        .sessions
        .put(
            &session_id,
            Session::new(user, state.config.auth.session_max_age),
        )
        .await;

    let jar = jar.add(session_cookie(
        cookie_value,
        state.config.should_use_secure_cookies(),
    ));

    Ok((jar, Redirect::to("/profile")))
}

// =============================================================================
// Logout
// =============================================================================

/// GET /logout
///
/// Destroys the session record, clears the cookie, redirects home.
/// Safe to call without a session.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(id) = verify_session_cookie(cookie.value(), &state.config.auth.session_secret)
        {
            state.sessions.destroy(&id).await;
        }
    }

    (jar.remove(removal_cookie()), Redirect::to("/"))
}

// =============================================================================
// Helpers
// =============================================================================

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Removal cookie with attributes matching the ones set at login
fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}
