//! Common test utilities for relicta-github integration tests
//!
//! This module provides:
//! - A plugin wired to a wiremock server and a synthetic environment
//! - GitHub response fixtures
//! - Asset file builders

use relicta_github_core::{ClientConfig, ExecuteRequest, GitHubPlugin, Hook, MapEnv, ReleaseContext};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "ghp_integration_token";

/// Plugin whose API and upload endpoints both point at `server`.
pub fn plugin_for(server: &MockServer, env: MapEnv) -> GitHubPlugin {
    GitHubPlugin::new().with_env(Arc::new(env)).with_client_config(
        ClientConfig::default()
            .with_github_api_url(server.uri())
            .with_github_uploads_url(server.uri()),
    )
}

/// A `post-publish` request for `owner/repo` at `tag`.
pub fn post_publish_request(config: Value, tag: &str, dry_run: bool) -> ExecuteRequest {
    ExecuteRequest {
        hook: Hook::PostPublish,
        config,
        context: ReleaseContext {
            version: tag.trim_start_matches('v').to_string(),
            tag_name: tag.to_string(),
            release_type: "minor".to_string(),
            changelog: "## Changes\n- Fixed bug".to_string(),
            ..ReleaseContext::default()
        },
        dry_run,
    }
}

/// Body GitHub returns from the create-release endpoint.
pub fn release_response(id: u64, owner: &str, repo: &str, tag: &str) -> Value {
    json!({
        "id": id,
        "tag_name": tag,
        "name": tag,
        "body": "",
        "draft": false,
        "prerelease": false,
        "html_url": format!("https://github.com/{}/{}/releases/tag/{}", owner, repo, tag),
        "created_at": "2024-06-01T12:00:00Z",
        "published_at": "2024-06-01T12:00:00Z",
        "assets": []
    })
}

/// Body GitHub returns from the upload-asset endpoint.
#[allow(dead_code)]
pub fn asset_response(id: u64, name: &str, size: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "content_type": "application/octet-stream",
        "state": "uploaded",
        "size": size,
        "browser_download_url": format!("https://github.com/o/r/releases/download/v1.0.0/{}", name)
    })
}

/// Write `files` into a fresh temporary directory.
#[allow(dead_code)]
pub fn write_assets(files: &[(&str, &[u8])]) -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().unwrap();
    let paths = files
        .iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path
        })
        .collect();
    (dir, paths)
}

/// Paths as the JSON string list the host would send.
#[allow(dead_code)]
pub fn asset_list(paths: &[PathBuf]) -> Value {
    Value::Array(
        paths
            .iter()
            .map(|p| Value::String(p.to_string_lossy().into_owned()))
            .collect(),
    )
}
