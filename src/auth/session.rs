//! Session management
//!
//! Sessions live server-side behind the `SessionStore` capability and are
//! referenced from the browser by an HMAC-signed id cookie.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::AppError;

/// Name of the session id cookie
pub const SESSION_COOKIE: &str = "session";

/// Length of generated session ids
const SESSION_ID_LEN: usize = 32;

/// User session data
///
/// Created on a successful OAuth callback. `user` is the profile object
/// returned by the provider, stored verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Provider profile, unvalidated
    pub user: serde_json::Value,
    /// When session was created
    pub created_at: DateTime<Utc>,
    /// When session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session for a freshly fetched profile
    pub fn new(user: serde_json::Value, max_age_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            user,
            created_at: now,
            expires_at: now + Duration::seconds(max_age_seconds),
        }
    }

    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Server-side session repository
///
/// The handlers only ever see this capability, so the memory backend can
/// be swapped for a shared cache or database without touching them.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up a live session by id
    async fn get(&self, id: &str) -> Option<Session>;

    /// Store a session under the given id
    async fn put(&self, id: &str, session: Session);

    /// Remove a session, if present
    async fn destroy(&self, id: &str);
}

/// In-memory session store
///
/// Volatile; all sessions are lost on restart. Expired records are
/// dropped lazily on lookup.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &str) -> Option<Session> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                Some(session) if !session.is_expired() => return Some(session.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired record: drop it before reporting the session as gone.
        self.sessions.write().await.remove(id);
        None
    }

    async fn put(&self, id: &str, session: Session) {
        self.sessions.write().await.insert(id.to_string(), session);
    }

    async fn destroy(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }
}

// =============================================================================
// Session id cookie
// =============================================================================

/// Generate a random session id
pub fn generate_session_id() -> String {
    use rand::{Rng, distributions::Alphanumeric};

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

/// Sign a session id for use as a cookie value
///
/// Cookie format: `{id}.{base64(hmac_sha256(id))}`
pub fn sign_session_id(id: &str, secret: &str) -> Result<String, AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    mac.update(id.as_bytes());
    let signature = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", id, signature))
}

/// Verify a session cookie value and extract the session id
///
/// A malformed or tampered cookie yields `None`; the request is then
/// simply anonymous.
pub fn verify_session_cookie(value: &str, secret: &str) -> Option<String> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let (id, signature_b64) = value.split_once('.')?;

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(id.as_bytes());

    let signature = general_purpose::URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
    mac.verify_slice(&signature).ok()?;

    Some(id.to_string())
}
