//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};
use url::Url;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 5001)
    pub port: u16,
    /// Directory holding the static pages and assets
    pub static_dir: PathBuf,
}

/// Authentication configuration (sessions + GitHub OAuth)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session cookie signing secret (32+ bytes)
    pub session_secret: String,
    /// Session max age in seconds (default: 604800 = 7 days)
    pub session_max_age: i64,
    pub github: GitHubOAuthConfig,
}

/// GitHub OAuth configuration
///
/// The endpoint URLs default to github.com and only change when the
/// provider is substituted, e.g. by the test suite.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Callback URL registered with the OAuth app
    pub callback_url: Url,
    /// Requested scopes, space separated
    pub scopes: String,
    /// Provider authorize endpoint
    pub authorize_url: String,
    /// Provider token endpoint
    pub token_url: String,
    /// Provider user-info endpoint
    pub user_api_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (GATEHOUSE_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5001)?
            .set_default("server.static_dir", "public")?
            .set_default("auth.session_max_age", 604800)?
            .set_default("auth.github.scopes", "read:user user:email")?
            .set_default(
                "auth.github.authorize_url",
                "https://github.com/login/oauth/authorize",
            )?
            .set_default(
                "auth.github.token_url",
                "https://github.com/login/oauth/access_token",
            )?
            .set_default("auth.github.user_api_url", "https://api.github.com/user")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (GATEHOUSE_*)
            .add_source(
                Environment::with_prefix("GATEHOUSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    ///
    /// True whenever the registered callback is https or points at a
    /// non-local host.
    pub fn should_use_secure_cookies(&self) -> bool {
        let callback = &self.auth.github.callback_url;
        callback.scheme().eq_ignore_ascii_case("https") || !is_local_callback_host(callback)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_SESSION_SECRET_BYTES: usize = 32;

        if self.auth.session_secret.as_bytes().len() < MIN_SESSION_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SESSION_SECRET_BYTES
            )));
        }

        if self.auth.session_max_age <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.session_max_age must be greater than 0".to_string(),
            ));
        }

        if self.auth.github.client_id.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "auth.github.client_id must not be empty".to_string(),
            ));
        }

        if self.auth.github.client_secret.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "auth.github.client_secret must not be empty".to_string(),
            ));
        }

        let callback = &self.auth.github.callback_url;
        if !callback.scheme().eq_ignore_ascii_case("https") {
            if is_local_callback_host(callback) {
                tracing::warn!(
                    callback = %callback,
                    "Using insecure session cookies for local development"
                );
            } else {
                return Err(crate::error::AppError::Config(
                    "auth.github.callback_url must be https for non-local hosts".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn is_local_callback_host(callback: &Url) -> bool {
    let Some(host) = callback.host_str() else {
        return false;
    };
    let host = host.trim_end_matches('.').to_ascii_lowercase();

    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5001,
                static_dir: PathBuf::from("public"),
            },
            auth: AuthConfig {
                session_secret: "x".repeat(32),
                session_max_age: 604_800,
                github: GitHubOAuthConfig {
                    client_id: "github-client-id".to_string(),
                    client_secret: "github-client-secret".to_string(),
                    callback_url: Url::parse("http://localhost:5001/auth/github/callback")
                        .unwrap(),
                    scopes: "read:user user:email".to_string(),
                    authorize_url: "https://github.com/login/oauth/authorize".to_string(),
                    token_url: "https://github.com/login/oauth/access_token".to_string(),
                    user_api_url: "https://api.github.com/user".to_string(),
                },
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_http_callback_on_localhost() {
        let config = valid_config();
        assert!(config.validate().is_ok());
        assert!(!config.should_use_secure_cookies());
    }

    #[test]
    fn validate_rejects_short_session_secret() {
        let mut config = valid_config();
        config.auth.session_secret = "short-secret".to_string();

        let error = config
            .validate()
            .expect_err("session secret shorter than 32 bytes must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("auth.session_secret")
        ));
    }

    #[test]
    fn validate_rejects_http_callback_for_public_host() {
        let mut config = valid_config();
        config.auth.github.callback_url =
            Url::parse("http://auth.example.com/auth/github/callback").unwrap();

        let error = config
            .validate()
            .expect_err("public callback hosts must require https");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("must be https")
        ));
    }

    #[test]
    fn validate_rejects_empty_client_credentials() {
        let mut config = valid_config();
        config.auth.github.client_id = "  ".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn https_callback_uses_secure_cookies() {
        let mut config = valid_config();
        config.auth.github.callback_url =
            Url::parse("https://auth.example.com/auth/github/callback").unwrap();

        assert!(config.validate().is_ok());
        assert!(config.should_use_secure_cookies());
    }
}
