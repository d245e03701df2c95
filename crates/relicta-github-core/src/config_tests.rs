//! Tests for configuration resolution.

use super::*;
use serde_json::json;

fn resolve(raw: Value) -> PluginConfig {
    PluginConfig::resolve(Some(&raw), &MapEnv::new())
}

// ============================================================================
// Defaults and Scalars
// ============================================================================

#[test]
fn test_empty_config_yields_zero_values() {
    let config = resolve(json!({}));

    assert_eq!(config, PluginConfig::default());
    assert!(config.assets.is_none());
}

#[test]
fn test_missing_config_yields_zero_values() {
    let config = PluginConfig::resolve(None, &MapEnv::new());
    assert_eq!(config, PluginConfig::default());

    let config = PluginConfig::resolve(Some(&Value::Null), &MapEnv::new());
    assert_eq!(config, PluginConfig::default());
}

#[test]
fn test_non_object_config_is_treated_as_empty() {
    let config = resolve(json!(["owner", "repo"]));
    assert_eq!(config, PluginConfig::default());
}

#[test]
fn test_full_config() {
    let config = resolve(json!({
        "owner": "relicta-tech",
        "repo": "relicta",
        "token": "ghp_test123",
        "draft": true,
        "prerelease": true,
        "generate_release_notes": true,
        "assets": ["dist/*.tar.gz", "bin/relicta"],
        "discussion_category": "Releases"
    }));

    assert_eq!(config.owner, "relicta-tech");
    assert_eq!(config.repo, "relicta");
    assert_eq!(config.token, "ghp_test123");
    assert!(config.draft);
    assert!(config.prerelease);
    assert!(config.generate_release_notes);
    assert_eq!(
        config.assets,
        Some(vec!["dist/*.tar.gz".to_string(), "bin/relicta".to_string()])
    );
    assert_eq!(config.discussion_category, "Releases");
}

#[test]
fn test_partial_config_with_env_token() {
    let env = MapEnv::new().with_var(GITHUB_TOKEN_ENV, "ghp_env");
    let raw = json!({ "owner": "my-org", "draft": true });
    let config = PluginConfig::resolve(Some(&raw), &env);

    assert_eq!(config.owner, "my-org");
    assert_eq!(config.repo, "");
    assert_eq!(config.token, "ghp_env");
    assert!(config.draft);
    assert!(!config.prerelease);
}

#[test]
fn test_empty_string_values_stay_empty() {
    let config = resolve(json!({
        "owner": "",
        "repo": "",
        "token": "",
        "discussion_category": ""
    }));

    assert_eq!(config.owner, "");
    assert_eq!(config.repo, "");
    assert_eq!(config.token, "");
    assert_eq!(config.discussion_category, "");
}

#[test]
fn test_non_string_scalar_is_ignored() {
    let config = resolve(json!({ "owner": 42, "repo": true }));
    assert_eq!(config.owner, "");
    assert_eq!(config.repo, "");
}

// ============================================================================
// Boolean Coercion
// ============================================================================

#[test]
fn test_boolean_as_string() {
    let config = resolve(json!({
        "token": "ghp_test",
        "draft": "true",
        "prerelease": "false"
    }));

    assert!(config.draft);
    assert!(!config.prerelease);
}

#[test]
fn test_boolean_string_literals_are_case_sensitive() {
    let config = resolve(json!({
        "draft": "TRUE",
        "prerelease": "True",
        "generate_release_notes": "yes"
    }));

    assert!(!config.draft);
    assert!(!config.prerelease);
    assert!(!config.generate_release_notes);
}

#[test]
fn test_boolean_other_representations_are_false() {
    let config = resolve(json!({
        "draft": 1,
        "prerelease": null,
        "generate_release_notes": ["true"]
    }));

    assert!(!config.draft);
    assert!(!config.prerelease);
    assert!(!config.generate_release_notes);
}

// ============================================================================
// Asset List Coercion
// ============================================================================

#[test]
fn test_assets_string_list() {
    let config = resolve(json!({ "assets": ["file1.txt", "file2.txt"] }));
    assert_eq!(
        config.assets,
        Some(vec!["file1.txt".to_string(), "file2.txt".to_string()])
    );
}

#[test]
fn test_assets_mixed_types_are_coerced() {
    let config = resolve(json!({ "assets": ["file1.tar.gz", 7, true] }));
    assert_eq!(
        config.assets,
        Some(vec![
            "file1.tar.gz".to_string(),
            "7".to_string(),
            "true".to_string()
        ])
    );
}

#[test]
fn test_assets_null_is_absent() {
    let config = resolve(json!({ "token": "ghp_test", "assets": null }));
    assert!(config.assets.is_none());
    assert!(config.asset_paths().is_empty());
}

#[test]
fn test_assets_empty_list_is_present_but_empty() {
    let config = resolve(json!({ "token": "ghp_test", "assets": [] }));
    assert_eq!(config.assets, Some(Vec::new()));
    assert!(config.asset_paths().is_empty());
}

#[test]
fn test_assets_wrong_type_is_absent() {
    let config = resolve(json!({ "assets": "dist/app.zip" }));
    assert!(config.assets.is_none());
}

// ============================================================================
// Token Precedence
// ============================================================================

/// Exhaustive check of {config token} x {GITHUB_TOKEN} x {GH_TOKEN}.
#[test]
fn test_token_precedence_all_combinations() {
    for config_token in [None, Some("ghp_config")] {
        for github_token in [None, Some("ghp_github")] {
            for gh_token in [None, Some("ghp_gh")] {
                let mut env = MapEnv::new();
                if let Some(value) = github_token {
                    env = env.with_var(GITHUB_TOKEN_ENV, value);
                }
                if let Some(value) = gh_token {
                    env = env.with_var(GH_TOKEN_ENV, value);
                }

                let raw = match config_token {
                    Some(token) => json!({ "token": token }),
                    None => json!({}),
                };

                let expected = config_token.or(github_token).or(gh_token).unwrap_or("");
                let config = PluginConfig::resolve(Some(&raw), &env);

                assert_eq!(
                    config.token, expected,
                    "config={:?} GITHUB_TOKEN={:?} GH_TOKEN={:?}",
                    config_token, github_token, gh_token
                );
            }
        }
    }
}

#[test]
fn test_empty_config_token_falls_back_to_env() {
    let env = MapEnv::new().with_var(GH_TOKEN_ENV, "ghp_gh_fallback");
    let raw = json!({ "token": "" });
    let config = PluginConfig::resolve(Some(&raw), &env);
    assert_eq!(config.token, "ghp_gh_fallback");
}

#[test]
fn test_empty_env_value_is_treated_as_unset() {
    let env = MapEnv::new()
        .with_var(GITHUB_TOKEN_ENV, "")
        .with_var(GH_TOKEN_ENV, "ghp_gh");
    assert_eq!(resolve_token("", &env), "ghp_gh");
}

#[test]
fn test_debug_redacts_token() {
    let config = resolve(json!({ "token": "ghp_secret_value" }));
    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("ghp_secret_value"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn test_serialize_skips_token() {
    let config = resolve(json!({ "token": "ghp_secret_value", "owner": "o" }));
    let value = serde_json::to_value(&config).unwrap();
    assert!(value.get("token").is_none());
    assert_eq!(value["owner"], "o");
}
