//! # Plugin Configuration
//!
//! Resolves the untyped configuration map supplied by the release host into a
//! typed [`PluginConfig`]. Each field has its own coercion rule so that every
//! edge case (string booleans, mixed-type asset lists, absent vs empty lists)
//! is handled in exactly one place.
//!
//! Environment access goes through the [`EnvLookup`] trait so that callers and
//! tests can supply a synthetic environment instead of mutating process state.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Primary environment variable consulted for the GitHub token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Fallback environment variable consulted for the GitHub token.
pub const GH_TOKEN_ENV: &str = "GH_TOKEN";

// ============================================================================
// Environment Lookup
// ============================================================================

/// Read-only access to environment variables.
pub trait EnvLookup: Send + Sync {
    /// Get the value of `key`, or `None` if it is unset.
    fn get(&self, key: &str) -> Option<String>;
}

/// Environment lookup backed by the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Environment lookup backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable to the environment.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvLookup for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

// ============================================================================
// Configuration Record
// ============================================================================

/// Settings for one plugin invocation.
///
/// Built fresh per invocation by [`PluginConfig::resolve`] and never mutated
/// afterwards. Empty strings mean "not configured".
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginConfig {
    /// Repository owner; falls back to the release context when empty
    pub owner: String,

    /// Repository name; falls back to the release context when empty
    pub repo: String,

    /// GitHub token resolved from config or environment
    #[serde(skip_serializing)]
    pub token: String,

    /// Create the release as a draft
    pub draft: bool,

    /// Mark the release as a prerelease
    pub prerelease: bool,

    /// Ask GitHub to generate release notes
    pub generate_release_notes: bool,

    /// Asset file paths to upload
    ///
    /// `None` when the key was absent or null, `Some(vec![])` when it was an
    /// empty list.
    pub assets: Option<Vec<String>>,

    /// Discussion category to link the release to
    pub discussion_category: String,
}

impl PluginConfig {
    /// Resolve configuration from the host map and the environment.
    ///
    /// A missing, null or non-object `raw` value is treated as an empty map.
    /// This function never fails; unrecognised values fall back to each
    /// field's zero value.
    pub fn resolve(raw: Option<&Value>, env: &dyn EnvLookup) -> Self {
        let empty = Map::new();
        let map = raw.and_then(Value::as_object).unwrap_or(&empty);

        Self {
            owner: string_field(map, "owner"),
            repo: string_field(map, "repo"),
            token: resolve_token(&string_field(map, "token"), env),
            draft: bool_field(map, "draft"),
            prerelease: bool_field(map, "prerelease"),
            generate_release_notes: bool_field(map, "generate_release_notes"),
            assets: string_list_field(map, "assets"),
            discussion_category: string_field(map, "discussion_category"),
        }
    }

    /// Asset paths, empty when none are configured.
    pub fn asset_paths(&self) -> &[String] {
        self.assets.as_deref().unwrap_or(&[])
    }
}

impl std::fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("draft", &self.draft)
            .field("prerelease", &self.prerelease)
            .field("generate_release_notes", &self.generate_release_notes)
            .field("assets", &self.assets)
            .field("discussion_category", &self.discussion_category)
            .finish()
    }
}

/// Resolve the GitHub token.
///
/// Precedence, highest first: a non-empty configured token, `GITHUB_TOKEN`,
/// `GH_TOKEN`. Empty environment values are treated as unset. Returns an
/// empty string when no source provides a token.
pub fn resolve_token(configured: &str, env: &dyn EnvLookup) -> String {
    if !configured.is_empty() {
        return configured.to_string();
    }

    [GITHUB_TOKEN_ENV, GH_TOKEN_ENV]
        .iter()
        .filter_map(|key| env.get(key))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

// ============================================================================
// Field Coercion
// ============================================================================

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Accepts a JSON boolean or the exact strings "true" / "false".
fn bool_field(map: &Map<String, Value>, key: &str) -> bool {
    match map.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

/// Accepts an array, coercing each element to a string.
fn string_list_field(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match map.get(key) {
        Some(Value::Array(items)) => Some(items.iter().map(value_to_string).collect()),
        _ => None,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
