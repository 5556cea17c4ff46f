//! GitHub identity provider client
//!
//! Talks to the provider's token and user-info endpoints. Exactly two
//! outbound calls exist: code-for-token and token-for-profile. Neither is
//! retried; a failure is terminal for the login attempt.

use serde::{Deserialize, Serialize};

use crate::config::GitHubOAuthConfig;
use crate::error::AppError;

/// Client for the GitHub OAuth endpoints
///
/// Endpoint URLs come from configuration so the provider can be
/// substituted, e.g. with a local stub in tests.
pub struct GitHubClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    callback_url: String,
    scopes: String,
    authorize_url: String,
    token_url: String,
    user_api_url: String,
}

/// Token exchange request body
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Token exchange response body
///
/// GitHub answers 200 with an `error` field instead of a non-success
/// status for unredeemable codes, so `access_token` is optional.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

impl GitHubClient {
    /// Build the client from OAuth configuration
    pub fn new(config: &GitHubOAuthConfig) -> Result<Self, AppError> {
        // GitHub's API rejects requests without a user agent.
        let http = reqwest::Client::builder()
            .user_agent(concat!("Gatehouse/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            callback_url: config.callback_url.to_string(),
            scopes: config.scopes.clone(),
            authorize_url: config.authorize_url.clone(),
            token_url: config.token_url.clone(),
            user_api_url: config.user_api_url.clone(),
        })
    }

    /// Provider authorize URL to redirect the visitor to
    pub fn authorize_redirect_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}",
            self.authorize_url,
            self.client_id,
            urlencoding::encode(&self.callback_url),
            urlencoding::encode(&self.scopes),
        )
    }

    /// Exchange an authorization code for an access token
    ///
    /// # Errors
    /// `TokenExchange` when the response carries no usable token,
    /// `Provider` on transport or decode failure.
    pub async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&TokenRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                code,
            })
            .send()
            .await?;

        let token: TokenResponse = response.json().await?;

        token
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(AppError::TokenExchange)
    }

    /// Fetch the user profile for an access token
    ///
    /// Returns the provider's profile object verbatim; nothing about its
    /// shape is validated here.
    pub async fn fetch_user(&self, access_token: &str) -> Result<serde_json::Value, AppError> {
        let response = self
            .http
            .get(&self.user_api_url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(AppError::ProfileFetch)?;

        response.json().await.map_err(AppError::ProfileFetch)
    }
}
