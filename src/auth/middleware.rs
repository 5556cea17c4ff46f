//! Authentication gate
//!
//! Extractors that resolve the session cookie against the session store.
//! Presence of a live session is the sole authorization signal.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;

use super::session::{SESSION_COOKIE, Session, verify_session_cookie};
use crate::AppState;
use crate::error::AppError;

/// Resolve the current request's session, if any
///
/// A missing cookie, bad signature, unknown id, or expired record all
/// read as anonymous.
async fn session_from_parts(parts: &Parts, state: &AppState) -> Option<Session> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar.get(SESSION_COOKIE)?;
    let id = verify_session_cookie(cookie.value(), &state.config.auth.session_secret)?;
    state.sessions.get(&id).await
}

/// Extractor for the current authenticated user
///
/// Rejects anonymous requests with 401.
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentUser(session): CurrentUser) -> impl IntoResponse {
///     Json(session.user)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let session = session_from_parts(parts, &state)
            .await
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser(session))
    }
}

/// Optional current user extractor
///
/// Returns None if not authenticated, instead of error.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        Ok(MaybeUser(session_from_parts(parts, &state).await))
    }
}
