// Release and release asset operations for GitHub API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use super::{error_from_response, GitHubClient};
use crate::error::ApiError;

/// GitHub release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Unique release identifier
    pub id: u64,

    /// Release tag name
    pub tag_name: String,

    /// Release name
    #[serde(default)]
    pub name: Option<String>,

    /// Release body (Markdown)
    #[serde(default)]
    pub body: Option<String>,

    /// Whether this is a draft release
    #[serde(default)]
    pub draft: bool,

    /// Whether this is a prerelease
    #[serde(default)]
    pub prerelease: bool,

    /// Release HTML URL
    pub html_url: String,

    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Publication timestamp
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    /// Release assets
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Asset attached to a release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// Unique asset identifier
    pub id: u64,

    /// Asset filename
    pub name: String,

    /// Asset content type
    #[serde(default)]
    pub content_type: String,

    /// Asset state
    #[serde(default)]
    pub state: String, // "uploaded", "open"

    /// Asset size in bytes
    #[serde(default)]
    pub size: u64,

    /// Asset download URL
    pub browser_download_url: String,
}

/// Request to create a release.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateReleaseRequest {
    /// Tag name (required)
    pub tag_name: String,

    /// Release name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Release body (Markdown)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Whether to create as draft
    pub draft: bool,

    /// Whether to mark as prerelease
    pub prerelease: bool,

    /// Whether GitHub should generate release notes
    pub generate_release_notes: bool,

    /// Discussion category to link the release to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discussion_category_name: Option<String>,
}

impl GitHubClient {
    // ========================================================================
    // Release Operations
    // ========================================================================

    /// Create a new release.
    ///
    /// Issues `POST /repos/{owner}/{repo}/releases` exactly once.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::HttpError` for non-success responses (carrying
    /// GitHub's `message`), `ApiError::HttpClientError` for transport
    /// failures, and `ApiError::JsonError` if the response cannot be parsed.
    pub async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        request: &CreateReleaseRequest,
    ) -> Result<Release, ApiError> {
        let url = self.api_url(&["repos", owner, repo, "releases"])?;
        debug!(owner = %owner, repo = %repo, tag = %request.tag_name, "Creating release");

        let response = self
            .authorize(self.http_client.post(url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.bytes().await?;
        let release: Release = serde_json::from_slice(&body)?;

        info!(
            owner = %owner,
            repo = %repo,
            release_id = release.id,
            html_url = %release.html_url,
            "Release created"
        );

        Ok(release)
    }

    /// Upload a release asset.
    ///
    /// Streams `file` to
    /// `POST {uploads}/repos/{owner}/{repo}/releases/{release_id}/assets?name={name}`
    /// with an explicit `Content-Length` of `size` bytes.
    ///
    /// # Errors
    ///
    /// Same classification as [`GitHubClient::create_release`].
    pub async fn upload_release_asset(
        &self,
        owner: &str,
        repo: &str,
        release_id: u64,
        name: &str,
        file: tokio::fs::File,
        size: u64,
    ) -> Result<ReleaseAsset, ApiError> {
        let release_id_segment = release_id.to_string();
        let mut url = self.uploads_url(&[
            "repos",
            owner,
            repo,
            "releases",
            &release_id_segment,
            "assets",
        ])?;
        url.query_pairs_mut().append_pair("name", name);

        debug!(release_id = release_id, name = %name, size = size, "Uploading release asset");

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let response = self
            .authorize(self.http_client.post(url))
            .header("Content-Type", "application/octet-stream")
            .header("Content-Length", size)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
#[path = "release_tests.rs"]
mod tests;
