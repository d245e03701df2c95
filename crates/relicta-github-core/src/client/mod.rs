//! GitHub API client for release operations.
//!
//! This module provides [`GitHubClient`], a token-authenticated wrapper over
//! `reqwest` that knows how to create releases and upload release assets, and
//! [`ClientFactory`], which resolves the token and builds a client without
//! touching the network.

mod release;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::RequestBuilder;
use serde::Deserialize;
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use crate::config::{resolve_token, EnvLookup, PluginConfig, ProcessEnv};
use crate::error::ApiError;

pub use release::{CreateReleaseRequest, Release, ReleaseAsset};

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default GitHub upload API base URL.
pub const DEFAULT_UPLOADS_URL: &str = "https://uploads.github.com";

/// REST API version pinned on every request.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Configuration for GitHub API client behavior.
///
/// Controls the request timeout, user agent and API endpoints. The endpoints
/// are overridable so that GitHub Enterprise hosts and mock servers can be
/// targeted.
///
/// # Examples
///
/// ```
/// use relicta_github_core::client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_github_api_url("https://github.example.com/api/v3");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string for API requests (required by GitHub)
    pub user_agent: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// GitHub API base URL
    pub github_api_url: String,
    /// GitHub upload API base URL
    pub github_uploads_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("relicta-github/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            github_api_url: DEFAULT_API_URL.to_string(),
            github_uploads_url: DEFAULT_UPLOADS_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the GitHub API base URL.
    pub fn with_github_api_url(mut self, url: impl Into<String>) -> Self {
        self.github_api_url = url.into();
        self
    }

    /// Set the GitHub upload API base URL.
    pub fn with_github_uploads_url(mut self, url: impl Into<String>) -> Self {
        self.github_uploads_url = url.into();
        self
    }
}

/// GitHub API client authenticated with a personal access or workflow token.
///
/// Cloning is cheap; the underlying `reqwest::Client` shares its connection
/// pool. The token is wiped from memory when the last clone is dropped and is
/// never printed by the `Debug` implementation.
#[derive(Clone)]
pub struct GitHubClient {
    http_client: reqwest::Client,
    config: ClientConfig,
    token: Arc<Zeroizing<String>>,
}

impl GitHubClient {
    /// Build a client for `token`.
    ///
    /// No request is made; only the HTTP client is constructed.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` if the token is empty and
    /// `ApiError::Configuration` if a base URL is malformed or the HTTP
    /// client cannot be created.
    pub fn new(token: impl Into<String>, config: ClientConfig) -> Result<Self, ApiError> {
        let token = Zeroizing::new(token.into());
        if token.is_empty() {
            return Err(ApiError::MissingToken);
        }

        parse_base_url(&config.github_api_url)?;
        parse_base_url(&config.github_uploads_url)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            config,
            token: Arc::new(token),
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a URL on the REST API host from path `segments`.
    fn api_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        endpoint_url(&self.config.github_api_url, segments)
    }

    /// Build a URL on the upload host from path `segments`.
    fn uploads_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        endpoint_url(&self.config.github_uploads_url, segments)
    }

    /// Attach authentication and versioning headers.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token.as_str()))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("config", &self.config)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Builds authenticated clients from resolved plugin configuration.
///
/// The factory owns the endpoint configuration and the environment used for
/// token fallback, so one factory serves every invocation of a plugin.
#[derive(Clone)]
pub struct ClientFactory {
    config: ClientConfig,
    env: Arc<dyn EnvLookup>,
}

impl ClientFactory {
    /// Create a factory with explicit endpoint configuration and environment.
    pub fn new(config: ClientConfig, env: Arc<dyn EnvLookup>) -> Self {
        Self { config, env }
    }

    /// Get the endpoint configuration shared by every client.
    pub fn client_config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a client for the given configuration.
    ///
    /// The token is taken from the configuration, then `GITHUB_TOKEN`, then
    /// `GH_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` when every source is empty, before
    /// any network access.
    pub fn client_for(&self, plugin_config: &PluginConfig) -> Result<GitHubClient, ApiError> {
        let token = resolve_token(&plugin_config.token, self.env.as_ref());
        debug!(
            api_url = %self.config.github_api_url,
            token_present = !token.is_empty(),
            "Building GitHub client"
        );
        GitHubClient::new(token, self.config.clone())
    }
}

impl Default for ClientFactory {
    fn default() -> Self {
        Self::new(ClientConfig::default(), Arc::new(ProcessEnv))
    }
}

impl fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientFactory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Error payload returned by the GitHub REST API.
#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

fn parse_base_url(base: &str) -> Result<Url, ApiError> {
    Url::parse(base).map_err(|e| ApiError::Configuration {
        message: format!("Invalid base URL '{}': {}", base, e),
    })
}

/// Append `segments` to the path of `base`.
///
/// Each segment is percent-encoded, so `/`, `?` and `#` inside a segment stay
/// part of that segment. Empty, `.` and `..` segments are rejected because
/// they would change which endpoint is addressed.
fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, ApiError> {
    if let Some(segment) = segments
        .iter()
        .find(|s| s.is_empty() || **s == "." || **s == "..")
    {
        return Err(ApiError::Configuration {
            message: format!("Invalid URL path segment '{}'", segment),
        });
    }

    let mut url = parse_base_url(base)?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Configuration {
            message: format!("Base URL '{}' cannot carry a path", base),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn a non-success response into an `ApiError`.
///
/// Uses GitHub's `message` field when the body is a GitHub error document
/// and the raw body text otherwise.
async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error body".to_string());

    let message = match serde_json::from_str::<GitHubErrorBody>(&text) {
        Ok(body) => body.message,
        Err(_) if text.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => text,
    };

    ApiError::HttpError { status, message }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
