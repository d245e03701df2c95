//! # Relicta GitHub CLI
//!
//! Command-line transport for the GitHub release plugin.
//!
//! The host talks to the plugin through three subcommands:
//! - `info` prints the plugin description
//! - `validate` checks a configuration file
//! - `execute` runs one hook invocation read from a file or stdin
//!
//! Protocol JSON is written to stdout. Logs go to stderr.

use clap::{Parser, Subcommand};
use relicta_github_core::{ClientConfig, ExecuteRequest, GitHubPlugin, Plugin};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// CLI Structure
// ============================================================================

/// Relicta GitHub plugin - create GitHub releases and upload assets
#[derive(Parser, Debug)]
#[command(name = "relicta-github")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create GitHub releases and upload assets")]
pub struct Cli {
    /// Logging level
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// GitHub API base URL (GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// GitHub upload API base URL (GitHub Enterprise)
    #[arg(long, env = "GITHUB_UPLOADS_URL")]
    pub uploads_url: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the plugin description as JSON
    Info,

    /// Validate a plugin configuration file (JSON or YAML)
    Validate {
        /// Configuration file; an empty configuration is validated when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Execute one hook invocation
    Execute {
        /// Request file; the request is read from stdin when omitted
        #[arg(short, long)]
        request: Option<PathBuf>,
    },
}

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {}: {message}", path.display())]
    Configuration { path: PathBuf, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(#[source] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Output(#[source] serde_json::Error),

    #[error("Logging initialization failed: {message}")]
    Logging { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration { .. } => 1,
            Self::InvalidRequest(_) => 2,
            Self::Output(_) => 3,
            Self::Logging { .. } => 4,
            Self::Io(_) => 5,
        }
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    let plugin = build_plugin(&cli);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            ctrl_c.cancel();
        }
    });

    let mut stdout = std::io::stdout();
    run_command(&cli.command, &plugin, cancel, &mut stdout).await
}

/// Build the plugin with endpoint overrides from the command line.
pub fn build_plugin(cli: &Cli) -> GitHubPlugin {
    let mut config = ClientConfig::default();
    if let Some(url) = &cli.api_url {
        config = config.with_github_api_url(url);
    }
    if let Some(url) = &cli.uploads_url {
        config = config.with_github_uploads_url(url);
    }
    GitHubPlugin::new().with_client_config(config)
}

/// Run one subcommand against `plugin`, writing protocol JSON to `out`.
pub async fn run_command(
    command: &Commands,
    plugin: &dyn Plugin,
    cancel: CancellationToken,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Commands::Info => write_json(out, &plugin.info()),
        Commands::Validate { config } => {
            let raw = match config {
                Some(path) => load_config_file(path)?,
                None => Value::Null,
            };
            let response = plugin.validate(&raw).await;
            debug!(valid = response.valid, "Validation complete");
            write_json(out, &response)
        }
        Commands::Execute { request } => {
            let text = match request {
                Some(path) => tokio::fs::read_to_string(path).await?,
                None => read_stdin().await?,
            };
            let request: ExecuteRequest =
                serde_json::from_str(&text).map_err(CliError::InvalidRequest)?;

            info!(hook = %request.hook, dry_run = request.dry_run, "Executing hook");
            let response = plugin.execute(request, cancel).await;
            if !response.success {
                warn!(error = %response.error, "Hook reported failure");
            }
            write_json(out, &response)
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Initialize logging based on CLI arguments
fn initialize_logging(cli: &Cli) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(format!(
                "relicta_github_core={level},relicta_github_cli={level}",
                level = cli.log_level
            ))
        })
        .map_err(|e| CliError::Logging {
            message: e.to_string(),
        })?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if cli.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| CliError::Logging {
        message: e.to_string(),
    })
}

/// Load a configuration map from a JSON or YAML file.
///
/// The format is chosen by extension; unknown extensions are tried as JSON
/// and then as YAML.
pub fn load_config_file(path: &Path) -> Result<Value, CliError> {
    let config_error = |message: String| CliError::Configuration {
        path: path.to_path_buf(),
        message,
    };

    let contents = std::fs::read_to_string(path)
        .map_err(|e| config_error(format!("Failed to read file: {}", e)))?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .map_err(|e| config_error(format!("Invalid YAML: {}", e))),
        "json" => serde_json::from_str(&contents)
            .map_err(|e| config_error(format!("Invalid JSON: {}", e))),
        _ => serde_json::from_str(&contents)
            .or_else(|_| serde_yaml::from_str(&contents))
            .map_err(|e| config_error(format!("Failed to parse as JSON or YAML: {}", e))),
    }
}

async fn read_stdin() -> Result<String, CliError> {
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    Ok(text)
}

fn write_json<T: serde::Serialize>(out: &mut dyn Write, value: &T) -> Result<(), CliError> {
    serde_json::to_writer(&mut *out, value).map_err(CliError::Output)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
