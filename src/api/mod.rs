//! HTTP API endpoints

use axum::{Json, Router, routing::get};

use crate::AppState;
use crate::auth::CurrentUser;

/// Create API router
pub fn api_router() -> Router<AppState> {
    Router::new().route("/user", get(user_info))
}

/// GET /api/user
///
/// Returns the stored profile object verbatim. Anonymous requests are
/// rejected by the extractor with 401.
async fn user_info(CurrentUser(session): CurrentUser) -> Json<serde_json::Value> {
    Json(session.user)
}
