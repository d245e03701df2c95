//! Configuration validation reported back to the release host.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::{EnvLookup, PluginConfig};

/// Error code for a required value that is missing.
pub const CODE_REQUIRED: &str = "REQUIRED";

/// A single problem found in the plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Configuration key the problem relates to
    pub field: String,

    /// Human-readable description
    pub message: String,

    /// Machine-readable error code
    pub code: String,
}

/// Outcome of validating a configuration map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    /// True when no errors were found
    pub valid: bool,

    /// Problems found, in a stable order
    #[serde(default)]
    pub errors: Vec<ValidationError>,
}

impl ValidationResponse {
    /// Build a response from the collected errors.
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate the host-supplied configuration.
///
/// Only the token is mandatory here; owner and repo may still come from the
/// release context at execution time.
pub fn validate_config(raw: Option<&Value>, env: &dyn EnvLookup) -> ValidationResponse {
    let config = PluginConfig::resolve(raw, env);
    let mut errors = Vec::new();

    if config.token.is_empty() {
        errors.push(ValidationError {
            field: "token".to_string(),
            message: "GitHub token is required (set 'token' in config or the GITHUB_TOKEN / GH_TOKEN environment variable)".to_string(),
            code: CODE_REQUIRED.to_string(),
        });
    }

    debug!(error_count = errors.len(), "Configuration validated");
    ValidationResponse::from_errors(errors)
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
