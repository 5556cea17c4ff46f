//! GitHub OAuth authentication
//!
//! Handles:
//! - GitHub OAuth flow
//! - Session management
//! - Authentication gate

mod github;
mod middleware;
mod oauth;
pub mod session;

pub use github::GitHubClient;
pub use middleware::{CurrentUser, MaybeUser};
pub use oauth::auth_router;
pub use session::{MemorySessionStore, Session, SessionStore};
