//! # Plugin Interface
//!
//! The request/response contract between the release host and this plugin,
//! and [`GitHubPlugin`], which dispatches lifecycle hooks to the release
//! orchestrator.
//!
//! A host calls three operations: [`Plugin::info`] to discover the plugin,
//! [`Plugin::validate`] to check a configuration map, and
//! [`Plugin::execute`] once per lifecycle hook.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::assets::Artifact;
use crate::client::{ClientConfig, ClientFactory};
use crate::config::{EnvLookup, PluginConfig, ProcessEnv};
use crate::release::ReleaseOrchestrator;
use crate::validation::{validate_config, ValidationResponse};

/// Name the plugin registers under.
pub const PLUGIN_NAME: &str = "github";

// ============================================================================
// Hooks
// ============================================================================

/// A point in the host's release lifecycle.
///
/// Serialized as the kebab-case wire name. Names the host may add later are
/// preserved in [`Hook::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Hook {
    PreInit,
    PostInit,
    PrePlan,
    PostPlan,
    PreVersion,
    PostVersion,
    PreNotes,
    PostNotes,
    PreApprove,
    PostApprove,
    PrePublish,
    PostPublish,
    OnSuccess,
    OnError,
    Other(String),
}

impl Hook {
    /// Every hook the host lifecycle defines, in lifecycle order.
    pub const LIFECYCLE: [Hook; 14] = [
        Hook::PreInit,
        Hook::PostInit,
        Hook::PrePlan,
        Hook::PostPlan,
        Hook::PreVersion,
        Hook::PostVersion,
        Hook::PreNotes,
        Hook::PostNotes,
        Hook::PreApprove,
        Hook::PostApprove,
        Hook::PrePublish,
        Hook::PostPublish,
        Hook::OnSuccess,
        Hook::OnError,
    ];

    /// Wire name of the hook.
    pub fn as_str(&self) -> &str {
        match self {
            Self::PreInit => "pre-init",
            Self::PostInit => "post-init",
            Self::PrePlan => "pre-plan",
            Self::PostPlan => "post-plan",
            Self::PreVersion => "pre-version",
            Self::PostVersion => "post-version",
            Self::PreNotes => "pre-notes",
            Self::PostNotes => "post-notes",
            Self::PreApprove => "pre-approve",
            Self::PostApprove => "post-approve",
            Self::PrePublish => "pre-publish",
            Self::PostPublish => "post-publish",
            Self::OnSuccess => "on-success",
            Self::OnError => "on-error",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for Hook {
    fn from(name: &str) -> Self {
        Self::LIFECYCLE
            .iter()
            .find(|hook| hook.as_str() == name)
            .cloned()
            .unwrap_or_else(|| Self::Other(name.to_string()))
    }
}

impl From<String> for Hook {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<Hook> for String {
    fn from(hook: Hook) -> Self {
        hook.as_str().to_string()
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Protocol Types
// ============================================================================

/// Release facts supplied by the host. Missing fields default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseContext {
    pub version: String,
    pub tag_name: String,
    pub release_type: String,
    pub changelog: String,
    /// Preferred over `changelog` for the release body
    pub release_notes: String,
    pub repository_owner: String,
    pub repository_name: String,
}

/// One hook invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub hook: Hook,

    /// Raw plugin configuration; null when the host sent none
    #[serde(default)]
    pub config: Value,

    #[serde(default)]
    pub context: ReleaseContext,

    #[serde(default)]
    pub dry_run: bool,
}

/// Result of one hook invocation.
///
/// A successful response carries a message and no error; a failed one
/// carries an error and possibly the outputs gathered before the failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
}

impl ExecuteResponse {
    /// Successful response with `message`.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Self::default()
        }
    }

    /// Failed response with `error`.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            ..Self::default()
        }
    }

    pub fn with_outputs(mut self, outputs: BTreeMap<String, Value>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.artifacts = artifacts;
        self
    }
}

/// Static description of the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub hooks: Vec<Hook>,
    /// JSON Schema for the configuration map
    pub config_schema: String,
}

/// JSON Schema describing the configuration keys the plugin reads.
pub const CONFIG_SCHEMA: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "type": "object",
  "properties": {
    "token": {
      "type": "string",
      "description": "GitHub token (falls back to GITHUB_TOKEN, then GH_TOKEN)"
    },
    "owner": {
      "type": "string",
      "description": "Repository owner (defaults to the release context)"
    },
    "repo": {
      "type": "string",
      "description": "Repository name (defaults to the release context)"
    },
    "draft": {
      "type": "boolean",
      "default": false,
      "description": "Create the release as a draft"
    },
    "prerelease": {
      "type": "boolean",
      "default": false,
      "description": "Mark the release as a prerelease"
    },
    "generate_release_notes": {
      "type": "boolean",
      "default": false,
      "description": "Ask GitHub to generate release notes"
    },
    "assets": {
      "type": "array",
      "items": { "type": "string" },
      "description": "Files to upload as release assets"
    },
    "discussion_category": {
      "type": "string",
      "description": "Discussion category to create for the release"
    }
  }
}"#;

// ============================================================================
// Plugin Trait
// ============================================================================

/// Operations a release host invokes on a plugin.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Describe the plugin.
    fn info(&self) -> PluginInfo;

    /// Check a configuration map without side effects.
    async fn validate(&self, config: &Value) -> ValidationResponse;

    /// Handle one hook invocation.
    ///
    /// Anticipated failures are reported in-band with `success == false`.
    async fn execute(&self, request: ExecuteRequest, cancel: CancellationToken)
        -> ExecuteResponse;
}

/// Plugin that creates GitHub releases and uploads assets.
#[derive(Clone)]
pub struct GitHubPlugin {
    env: Arc<dyn EnvLookup>,
    client_config: ClientConfig,
}

impl GitHubPlugin {
    /// Plugin reading the process environment and talking to github.com.
    pub fn new() -> Self {
        Self {
            env: Arc::new(ProcessEnv),
            client_config: ClientConfig::default(),
        }
    }

    /// Use `env` for token fallback instead of the process environment.
    pub fn with_env(mut self, env: Arc<dyn EnvLookup>) -> Self {
        self.env = env;
        self
    }

    /// Use `config` for the API endpoints and HTTP settings.
    pub fn with_client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = config;
        self
    }

    fn orchestrator(&self) -> ReleaseOrchestrator {
        ReleaseOrchestrator::new(ClientFactory::new(
            self.client_config.clone(),
            Arc::clone(&self.env),
        ))
    }
}

impl Default for GitHubPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GitHubPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubPlugin")
            .field("client_config", &self.client_config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Plugin for GitHubPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: PLUGIN_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Create GitHub releases and upload assets".to_string(),
            author: "Relicta Team".to_string(),
            hooks: vec![Hook::PostPublish, Hook::OnSuccess, Hook::OnError],
            config_schema: CONFIG_SCHEMA.to_string(),
        }
    }

    async fn validate(&self, config: &Value) -> ValidationResponse {
        validate_config(Some(config), self.env.as_ref())
    }

    async fn execute(
        &self,
        request: ExecuteRequest,
        cancel: CancellationToken,
    ) -> ExecuteResponse {
        debug!(hook = %request.hook, dry_run = request.dry_run, "Executing hook");

        match request.hook {
            Hook::PostPublish => {
                let config = PluginConfig::resolve(Some(&request.config), self.env.as_ref());
                self.orchestrator()
                    .create_release(&config, &request.context, request.dry_run, &cancel)
                    .await
            }
            Hook::OnSuccess => {
                info!(version = %request.context.version, "Release succeeded");
                ExecuteResponse::success("Release successful")
            }
            Hook::OnError => {
                info!(version = %request.context.version, "Release failure acknowledged");
                ExecuteResponse::success("Release failed notification acknowledged")
            }
            other => {
                debug!(hook = %other, "Hook not handled");
                ExecuteResponse::success(format!("Hook {} not handled", other))
            }
        }
    }
}

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;
