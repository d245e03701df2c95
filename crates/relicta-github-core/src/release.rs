//! # Release Orchestration
//!
//! Turns a resolved [`PluginConfig`] and the host's [`ReleaseContext`] into a
//! GitHub release, then attaches the configured assets one at a time.
//!
//! The orchestrator performs at most one create-release call and one upload
//! per asset, strictly in sequence. Nothing is retried and nothing is rolled
//! back: if an upload fails after the release exists, the response reports a
//! partial failure that still carries the release outputs.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::assets::{upload_asset, Artifact};
use crate::client::{ClientFactory, CreateReleaseRequest, GitHubClient, Release};
use crate::config::PluginConfig;
use crate::error::ReleaseError;
use crate::plugin::{ExecuteResponse, ReleaseContext};

/// Where the release body text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySource {
    ReleaseNotes,
    Changelog,
    Empty,
}

impl BodySource {
    /// Wire name reported in the `body_source` output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReleaseNotes => "release_notes",
            Self::Changelog => "changelog",
            Self::Empty => "empty",
        }
    }
}

/// Repository coordinates and body text for one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTarget {
    pub owner: String,
    pub repo: String,
    pub tag_name: String,
    pub body: String,
    pub body_source: BodySource,
}

impl ReleaseTarget {
    /// Pick owner and repo (config wins over context, per field) and the body
    /// text (release notes, then changelog).
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::MissingRepository` if owner or repo is empty in
    /// both sources and `ReleaseError::InvalidRepository` if either is not a
    /// valid GitHub name.
    pub fn resolve(config: &PluginConfig, context: &ReleaseContext) -> Result<Self, ReleaseError> {
        let owner = first_non_empty(&config.owner, &context.repository_owner);
        let repo = first_non_empty(&config.repo, &context.repository_name);

        if owner.is_empty() || repo.is_empty() {
            return Err(ReleaseError::MissingRepository);
        }
        for name in [owner, repo] {
            if !is_valid_name(name) {
                return Err(ReleaseError::InvalidRepository(name.to_string()));
            }
        }

        let (body, body_source) = if !context.release_notes.is_empty() {
            (context.release_notes.clone(), BodySource::ReleaseNotes)
        } else if !context.changelog.is_empty() {
            (context.changelog.clone(), BodySource::Changelog)
        } else {
            (String::new(), BodySource::Empty)
        };

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            tag_name: context.tag_name.clone(),
            body,
            body_source,
        })
    }
}

/// GitHub owner and repository names: ASCII letters, digits, `-`, `_` and
/// `.`, but never `.` or `..` alone.
fn is_valid_name(name: &str) -> bool {
    name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn first_non_empty<'a>(preferred: &'a str, fallback: &'a str) -> &'a str {
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}

/// Creates GitHub releases and uploads their assets.
#[derive(Debug, Clone, Default)]
pub struct ReleaseOrchestrator {
    factory: ClientFactory,
}

impl ReleaseOrchestrator {
    /// Create an orchestrator that builds clients with `factory`.
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }

    /// Run the release for one `post-publish` invocation.
    ///
    /// Anticipated failures are reported in the returned response; this
    /// function does not fail.
    pub async fn create_release(
        &self,
        config: &PluginConfig,
        context: &ReleaseContext,
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> ExecuteResponse {
        let target = match ReleaseTarget::resolve(config, context) {
            Ok(target) => target,
            Err(e) => return failure(e),
        };

        // Built before the dry-run branch so that a missing token is caught
        // in dry runs too. Construction performs no I/O.
        let client = match self.factory.client_for(config) {
            Ok(client) => client,
            Err(e) => return failure(ReleaseError::ClientCreation(e)),
        };

        let outputs = base_outputs(config, &target);

        if dry_run {
            info!(
                owner = %target.owner,
                repo = %target.repo,
                tag = %target.tag_name,
                assets = config.asset_paths().len(),
                "Dry run: release not created"
            );
            return ExecuteResponse::success(format!(
                "Would create GitHub release for {}/{}: {}",
                target.owner, target.repo, target.tag_name
            ))
            .with_outputs(outputs);
        }

        self.publish(&client, config, &target, outputs, cancel).await
    }

    async fn publish(
        &self,
        client: &GitHubClient,
        config: &PluginConfig,
        target: &ReleaseTarget,
        mut outputs: BTreeMap<String, Value>,
        cancel: &CancellationToken,
    ) -> ExecuteResponse {
        if cancel.is_cancelled() {
            warn!(tag = %target.tag_name, "Cancelled before release creation");
            return failure(ReleaseError::Cancelled);
        }

        let request = build_request(config, target);
        let release = match client
            .create_release(&target.owner, &target.repo, &request)
            .await
        {
            Ok(release) => release,
            Err(e) => {
                error!(
                    owner = %target.owner,
                    repo = %target.repo,
                    tag = %target.tag_name,
                    transient = e.is_transient(),
                    error = %e,
                    "Failed to create release"
                );
                return failure(ReleaseError::CreateRelease(e));
            }
        };

        insert_release_outputs(&mut outputs, &release);

        let mut artifacts: Vec<Artifact> = Vec::new();
        for path in config.asset_paths() {
            if cancel.is_cancelled() {
                warn!(release_id = release.id, path = %path, "Cancelled during asset upload");
                outputs.insert("assets_uploaded".to_string(), json!(artifacts.len()));
                return failure(ReleaseError::UploadCancelled)
                    .with_outputs(outputs)
                    .with_artifacts(artifacts);
            }

            match upload_asset(client, &target.owner, &target.repo, release.id, path).await {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => {
                    if e.is_path_rejection() {
                        warn!(release_id = release.id, path = %path, error = %e, "Asset rejected");
                    } else {
                        error!(release_id = release.id, path = %path, error = %e, "Asset upload failed");
                    }
                    outputs.insert("assets_uploaded".to_string(), json!(artifacts.len()));
                    return failure(ReleaseError::AssetUpload(e))
                        .with_outputs(outputs)
                        .with_artifacts(artifacts);
                }
            }
        }

        outputs.insert("assets_uploaded".to_string(), json!(artifacts.len()));

        info!(
            owner = %target.owner,
            repo = %target.repo,
            tag = %target.tag_name,
            release_id = release.id,
            assets = artifacts.len(),
            "GitHub release published"
        );

        ExecuteResponse::success(format!(
            "Created GitHub release {} for {}/{}",
            target.tag_name, target.owner, target.repo
        ))
        .with_outputs(outputs)
        .with_artifacts(artifacts)
    }
}

fn failure(error: ReleaseError) -> ExecuteResponse {
    ExecuteResponse::failure(error.to_string())
}

/// Build the create-release payload.
///
/// The release name is the tag. The discussion category is sent only when
/// configured.
pub fn build_request(config: &PluginConfig, target: &ReleaseTarget) -> CreateReleaseRequest {
    CreateReleaseRequest {
        tag_name: target.tag_name.clone(),
        name: Some(target.tag_name.clone()),
        body: Some(target.body.clone()),
        draft: config.draft,
        prerelease: config.prerelease,
        generate_release_notes: config.generate_release_notes,
        discussion_category_name: Some(config.discussion_category.clone())
            .filter(|category| !category.is_empty()),
    }
}

fn base_outputs(config: &PluginConfig, target: &ReleaseTarget) -> BTreeMap<String, Value> {
    let mut outputs = BTreeMap::new();
    outputs.insert("tag_name".to_string(), json!(target.tag_name));
    outputs.insert("owner".to_string(), json!(target.owner));
    outputs.insert("repo".to_string(), json!(target.repo));
    outputs.insert("draft".to_string(), json!(config.draft));
    outputs.insert("prerelease".to_string(), json!(config.prerelease));
    outputs.insert("body_source".to_string(), json!(target.body_source.as_str()));

    if !config.discussion_category.is_empty() {
        outputs.insert(
            "discussion_category".to_string(),
            json!(config.discussion_category),
        );
    }
    if config.generate_release_notes {
        outputs.insert("generate_release_notes".to_string(), json!(true));
    }
    if let Some(assets) = config.assets.as_ref().filter(|a| !a.is_empty()) {
        outputs.insert("assets".to_string(), json!(assets));
    }

    outputs
}

fn insert_release_outputs(outputs: &mut BTreeMap<String, Value>, release: &Release) {
    outputs.insert("release_id".to_string(), json!(release.id));
    outputs.insert("release_url".to_string(), json!(release.html_url));
    outputs.insert("release_created".to_string(), json!(true));
}

#[cfg(test)]
#[path = "release_tests.rs"]
mod tests;
