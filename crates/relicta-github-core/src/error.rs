//! Error types for GitHub release plugin operations.
//!
//! Errors are grouped by the stage that produced them: remote API calls
//! (`ApiError`), asset path checks and uploads (`AssetError`), and the release
//! orchestration as a whole (`ReleaseError`). Display strings carry fixed
//! prefixes so that hosts can grep for the failing stage.

use std::path::PathBuf;
use thiserror::Error;

/// Errors during GitHub API operations.
///
/// These errors represent failures when communicating with the GitHub API,
/// including missing credentials, HTTP errors and parsing failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No token could be resolved from configuration or environment.
    #[error("GitHub token is required: set the 'token' config key, GITHUB_TOKEN or GH_TOKEN")]
    MissingToken,

    /// HTTP error response from GitHub API.
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    /// The client or a request could not be configured.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Failed to parse JSON response from GitHub API.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error (network, TLS, etc.).
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

impl ApiError {
    /// Check if this error represents a transient condition.
    ///
    /// The plugin never retries; the classification is reported to the host
    /// so that it can decide whether re-running the hook makes sense.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::MissingToken => false,
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            Self::Configuration { .. } => false,
            Self::JsonError(_) => false,
            Self::HttpClientError(_) => true,
        }
    }

    /// HTTP status code, if the error came from a GitHub response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while validating or uploading a release asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The path contains a parent-directory component.
    #[error("invalid asset path: {} (parent directory traversal is not allowed)", path.display())]
    InvalidPath { path: PathBuf },

    /// Nothing exists at the path.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The path exists but its metadata cannot be read.
    #[error("asset file not accessible: {}: {source}", path.display())]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The path is a symbolic link.
    #[error("symlinks not allowed: {}", path.display())]
    Symlink { path: PathBuf },

    /// The path is a directory.
    #[error("asset path {} is a directory", path.display())]
    Directory { path: PathBuf },

    /// The validated file could not be opened or read.
    #[error("failed to read asset {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The GitHub upload call failed.
    #[error("failed to upload asset {name}: {source}")]
    UploadFailed {
        name: String,
        #[source]
        source: ApiError,
    },
}

impl AssetError {
    /// True for failures detected before the file was opened.
    pub fn is_path_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath { .. }
                | Self::NotFound { .. }
                | Self::Inaccessible { .. }
                | Self::Symlink { .. }
                | Self::Directory { .. }
        )
    }
}

/// Errors surfaced by the release orchestrator.
///
/// None of these escape `Plugin::execute`; they are rendered into the
/// `error` field of the response.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// Owner or repository name missing from every source.
    #[error("repository owner and name are required")]
    MissingRepository,

    /// Owner or repository name is not a valid GitHub name.
    #[error("invalid repository name: {0}")]
    InvalidRepository(String),

    /// The authenticated client could not be built.
    #[error("failed to create GitHub client: {0}")]
    ClientCreation(#[source] ApiError),

    /// GitHub rejected or failed the create-release call.
    #[error("failed to create release: {0}")]
    CreateRelease(#[source] ApiError),

    /// The release exists but an asset could not be attached.
    #[error("release created but asset upload failed: {0}")]
    AssetUpload(#[source] AssetError),

    /// The caller cancelled the invocation before the release was created.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller cancelled the invocation after the release was created.
    #[error("release created but asset upload cancelled")]
    UploadCancelled,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
