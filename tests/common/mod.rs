//! Common test utilities for E2E tests

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use gatehouse::{AppState, config};
use tokio::net::TcpListener;
use url::Url;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a test server backed by a stub provider that hands out a
    /// token and a small fixed profile
    pub async fn new() -> Self {
        Self::with_provider(StubProvider::succeeding(serde_json::json!({
            "id": 42,
            "login": "alice",
        })))
        .await
    }

    /// Create a test server wired to the given stub provider
    pub async fn with_provider(stub: StubProvider) -> Self {
        let provider_url = spawn_stub_provider(stub).await;

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                static_dir: std::path::PathBuf::from("public"),
            },
            auth: config::AuthConfig {
                session_secret: "test-secret-key-32-bytes-long!!!".to_string(),
                session_max_age: 604800,
                github: config::GitHubOAuthConfig {
                    client_id: "test-client-id".to_string(),
                    client_secret: "test-client-secret".to_string(),
                    callback_url: Url::parse("http://localhost:5001/auth/github/callback")
                        .unwrap(),
                    scopes: "read:user user:email".to_string(),
                    authorize_url: format!("{provider_url}/login/oauth/authorize"),
                    token_url: format!("{provider_url}/login/oauth/access_token"),
                    user_api_url: format!("{provider_url}/user"),
                },
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = gatehouse::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

// =============================================================================
// Stub GitHub provider
// =============================================================================

/// Behavior of the stub provider endpoints
#[derive(Clone)]
pub struct StubProvider {
    /// Token handed out by the token endpoint; `None` simulates an
    /// unredeemable authorization code
    pub access_token: Option<String>,
    /// Profile returned by the user-info endpoint
    pub profile: serde_json::Value,
}

impl StubProvider {
    /// Provider that redeems every code and returns `profile`
    pub fn succeeding(profile: serde_json::Value) -> Self {
        Self {
            access_token: Some("stub-access-token".to_string()),
            profile,
        }
    }

    /// Provider that answers the token exchange without a token
    pub fn without_token() -> Self {
        Self {
            access_token: None,
            profile: serde_json::json!({}),
        }
    }
}

/// Spawn the stub provider on an OS-assigned port, returning its base URL
async fn spawn_stub_provider(stub: StubProvider) -> String {
    let app = Router::new()
        .route("/login/oauth/access_token", post(stub_token_endpoint))
        .route("/user", get(stub_user_endpoint))
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn stub_token_endpoint(State(stub): State<StubProvider>) -> Json<serde_json::Value> {
    match stub.access_token {
        Some(token) => Json(serde_json::json!({
            "access_token": token,
            "token_type": "bearer",
            "scope": "read:user",
        })),
        None => Json(serde_json::json!({
            "error": "bad_verification_code",
        })),
    }
}

async fn stub_user_endpoint(State(stub): State<StubProvider>) -> Json<serde_json::Value> {
    Json(stub.profile)
}
