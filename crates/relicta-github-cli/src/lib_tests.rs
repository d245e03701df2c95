//! Tests for the relicta-github-cli library module.

use super::*;
use relicta_github_core::{ExecuteResponse, MapEnv, PluginInfo, ValidationResponse};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn offline_plugin(env: MapEnv) -> GitHubPlugin {
    GitHubPlugin::new().with_env(Arc::new(env)).with_client_config(
        ClientConfig::default()
            .with_github_api_url("http://127.0.0.1:9")
            .with_github_uploads_url("http://127.0.0.1:9"),
    )
}

async fn run_to_string(command: Commands, plugin: &GitHubPlugin) -> Result<String, CliError> {
    let mut out = Vec::new();
    run_command(&command, plugin, CancellationToken::new(), &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

// ============================================================================
// Argument Parsing
// ============================================================================

#[test]
fn test_cli_parsing_info() {
    let cli = Cli::try_parse_from(["relicta-github", "info"]).unwrap();
    assert_eq!(cli.command, Commands::Info);
    assert_eq!(cli.log_level, "info");
    assert!(!cli.json_logs);
}

#[test]
fn test_cli_parsing_validate_with_config() {
    let cli =
        Cli::try_parse_from(["relicta-github", "validate", "--config", "github.yaml"]).unwrap();
    assert_eq!(
        cli.command,
        Commands::Validate {
            config: Some(PathBuf::from("github.yaml"))
        }
    );
}

#[test]
fn test_cli_parsing_execute_and_global_flags() {
    let cli = Cli::try_parse_from([
        "relicta-github",
        "--log-level",
        "debug",
        "--json-logs",
        "--api-url",
        "https://ghe.example.com/api/v3",
        "execute",
        "-r",
        "request.json",
    ])
    .unwrap();

    assert_eq!(cli.log_level, "debug");
    assert!(cli.json_logs);
    assert_eq!(
        cli.api_url.as_deref(),
        Some("https://ghe.example.com/api/v3")
    );
    assert_eq!(
        cli.command,
        Commands::Execute {
            request: Some(PathBuf::from("request.json"))
        }
    );
}

#[test]
fn test_cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["relicta-github"]).is_err());
}

#[test]
fn test_build_plugin_applies_url_overrides() {
    let cli = Cli::try_parse_from([
        "relicta-github",
        "--api-url",
        "not a url",
        "info",
    ])
    .unwrap();

    // A malformed override only surfaces when a client is built.
    let plugin = build_plugin(&cli);
    assert_eq!(plugin.info().name, "github");
}

// ============================================================================
// Config File Loading
// ============================================================================

#[test]
fn test_load_json_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("github.json");
    fs::write(&path, r#"{"owner": "o", "draft": true}"#).unwrap();

    let value = load_config_file(&path).unwrap();
    assert_eq!(value["owner"], "o");
    assert_eq!(value["draft"], true);
}

#[test]
fn test_load_yaml_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("github.yml");
    fs::write(&path, "owner: o\nassets:\n  - dist/a.zip\n  - dist/b.zip\n").unwrap();

    let value = load_config_file(&path).unwrap();
    assert_eq!(value["owner"], "o");
    assert_eq!(value["assets"][1], "dist/b.zip");
}

#[test]
fn test_load_unknown_extension_falls_back_to_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("github.conf");
    fs::write(&path, "repo: r\n").unwrap();

    let value = load_config_file(&path).unwrap();
    assert_eq!(value["repo"], "r");
}

#[test]
fn test_load_missing_config_file() {
    let error = load_config_file(Path::new("/nonexistent/github.json")).unwrap_err();
    assert!(matches!(error, CliError::Configuration { .. }));
    assert_eq!(error.exit_code(), 1);
}

#[test]
fn test_load_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let error = load_config_file(&path).unwrap_err();
    assert!(error.to_string().contains("Invalid JSON"));
}

// ============================================================================
// Command Execution
// ============================================================================

#[tokio::test]
async fn test_info_command() {
    let output = run_to_string(Commands::Info, &offline_plugin(MapEnv::new()))
        .await
        .unwrap();
    let info: PluginInfo = serde_json::from_str(&output).unwrap();

    assert_eq!(info.name, "github");
    assert_eq!(info.hooks.len(), 3);
}

#[tokio::test]
async fn test_validate_command_without_config() {
    let output = run_to_string(
        Commands::Validate { config: None },
        &offline_plugin(MapEnv::new()),
    )
    .await
    .unwrap();
    let response: ValidationResponse = serde_json::from_str(&output).unwrap();

    assert!(!response.valid);
    assert_eq!(response.errors[0].field, "token");
}

#[tokio::test]
async fn test_validate_command_with_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("github.yaml");
    fs::write(&path, "token: ghp_file\n").unwrap();

    let output = run_to_string(
        Commands::Validate { config: Some(path) },
        &offline_plugin(MapEnv::new()),
    )
    .await
    .unwrap();
    let response: ValidationResponse = serde_json::from_str(&output).unwrap();

    assert!(response.valid);
}

#[tokio::test]
async fn test_execute_command_dry_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("request.json");
    fs::write(
        &path,
        serde_json::json!({
            "hook": "post-publish",
            "config": { "owner": "o", "repo": "r", "token": "ghp_test" },
            "context": { "version": "1.2.3", "tag_name": "v1.2.3" },
            "dry_run": true
        })
        .to_string(),
    )
    .unwrap();

    let output = run_to_string(
        Commands::Execute {
            request: Some(path),
        },
        &offline_plugin(MapEnv::new()),
    )
    .await
    .unwrap();
    let response: ExecuteResponse = serde_json::from_str(&output).unwrap();

    assert!(response.success);
    assert_eq!(response.message, "Would create GitHub release for o/r: v1.2.3");
}

#[tokio::test]
async fn test_execute_command_invalid_request() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("request.json");
    fs::write(&path, "{\"dry_run\": true}").unwrap();

    let error = run_to_string(
        Commands::Execute {
            request: Some(path),
        },
        &offline_plugin(MapEnv::new()),
    )
    .await
    .unwrap_err();

    assert!(matches!(error, CliError::InvalidRequest(_)));
    assert_eq!(error.exit_code(), 2);
}

#[tokio::test]
async fn test_execute_command_missing_request_file() {
    let error = run_to_string(
        Commands::Execute {
            request: Some(PathBuf::from("/nonexistent/request.json")),
        },
        &offline_plugin(MapEnv::new()),
    )
    .await
    .unwrap_err();

    assert!(matches!(error, CliError::Io(_)));
}
