//! # Release Assets
//!
//! Path safety checks and upload of local files as release assets.
//!
//! A path is uploadable only if it names an existing regular file reached
//! without parent-directory traversal or symbolic links. The checks run in a
//! fixed order so the reported error is deterministic when several apply.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::client::GitHubClient;
use crate::error::AssetError;

/// Artifact type reported for uploaded release assets.
pub const URL_ARTIFACT_TYPE: &str = "url";

/// An artifact produced by the plugin and reported back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact kind; always `"url"` for release assets
    #[serde(rename = "type")]
    pub artifact_type: String,

    /// Public download URL
    pub url: String,

    /// Size in bytes of the local file that was uploaded
    pub size: u64,
}

impl Artifact {
    /// Create a URL artifact.
    pub fn url(url: impl Into<String>, size: u64) -> Self {
        Self {
            artifact_type: URL_ARTIFACT_TYPE.to_string(),
            url: url.into(),
            size,
        }
    }
}

/// Check that `path` is safe to upload and return its cleaned absolute form.
///
/// Checks, in order: no `..` component, the path exists (links are not
/// followed), it is not a symlink, it is not a directory.
pub fn validate_asset_path(path: impl AsRef<Path>) -> Result<PathBuf, AssetError> {
    let path = path.as_ref();

    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(AssetError::InvalidPath {
            path: path.to_path_buf(),
        });
    }

    let metadata = std::fs::symlink_metadata(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            AssetError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            AssetError::Inaccessible {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        return Err(AssetError::Symlink {
            path: path.to_path_buf(),
        });
    }
    if file_type.is_dir() {
        return Err(AssetError::Directory {
            path: path.to_path_buf(),
        });
    }

    absolute_clean(path).map_err(|source| AssetError::Inaccessible {
        path: path.to_path_buf(),
        source,
    })
}

/// Join relative paths onto the working directory and drop `.` components.
fn absolute_clean(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    Ok(absolute
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}

/// Validate and upload one asset to an existing release.
///
/// The asset is named after the file's base name. Path rejections are
/// returned unchanged; remote failures are wrapped in
/// [`AssetError::UploadFailed`].
pub async fn upload_asset(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    release_id: u64,
    path: &str,
) -> Result<Artifact, AssetError> {
    let validated = validate_asset_path(path)?;
    let name = validated
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| validated.display().to_string());

    let read_error = |source| AssetError::Read {
        path: validated.clone(),
        source,
    };
    let file = tokio::fs::File::open(&validated).await.map_err(read_error)?;
    let size = file.metadata().await.map_err(read_error)?.len();

    debug!(path = %validated.display(), name = %name, size = size, "Asset validated");

    let asset = client
        .upload_release_asset(owner, repo, release_id, &name, file, size)
        .await
        .map_err(|source| AssetError::UploadFailed {
            name: name.clone(),
            source,
        })?;

    info!(
        name = %name,
        release_id = release_id,
        url = %asset.browser_download_url,
        "Asset uploaded"
    );

    Ok(Artifact::url(asset.browser_download_url, size))
}

#[cfg(test)]
#[path = "assets_tests.rs"]
mod tests;
