//! # Relicta GitHub Core
//!
//! Release plugin that creates GitHub releases and uploads build artifacts to
//! them. A release host drives the plugin through the [`plugin::Plugin`]
//! trait, one lifecycle hook at a time.
//!
//! ## Modules
//!
//! - [`config`]: resolve the host's configuration map and environment into
//!   a typed [`PluginConfig`]
//! - [`validation`]: configuration checks reported back to the host
//! - [`client`]: token-authenticated GitHub REST client and its factory
//! - [`assets`]: asset path safety checks and uploads
//! - [`release`]: dry-run and live release orchestration
//! - [`plugin`]: the host protocol types and the hook dispatcher
//! - [`error`]: error types for each stage
//!
//! ## Example
//!
//! ```no_run
//! use relicta_github_core::{ExecuteRequest, GitHubPlugin, Hook, Plugin, ReleaseContext};
//! use serde_json::json;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let plugin = GitHubPlugin::new();
//! let request = ExecuteRequest {
//!     hook: Hook::PostPublish,
//!     config: json!({ "owner": "relicta-tech", "repo": "relicta" }),
//!     context: ReleaseContext {
//!         tag_name: "v1.2.3".to_string(),
//!         ..ReleaseContext::default()
//!     },
//!     dry_run: true,
//! };
//!
//! let response = plugin.execute(request, CancellationToken::new()).await;
//! println!("{}", response.message);
//! # }
//! ```

pub mod assets;
pub mod client;
pub mod config;
pub mod error;
pub mod plugin;
pub mod release;
pub mod validation;

// Re-export commonly used types
pub use assets::{upload_asset, validate_asset_path, Artifact};
pub use client::{ClientConfig, ClientFactory, GitHubClient};
pub use config::{EnvLookup, MapEnv, PluginConfig, ProcessEnv};
pub use error::{ApiError, AssetError, ReleaseError};
pub use plugin::{
    ExecuteRequest, ExecuteResponse, GitHubPlugin, Hook, Plugin, PluginInfo, ReleaseContext,
};
pub use release::ReleaseOrchestrator;
pub use validation::{ValidationError, ValidationResponse};
