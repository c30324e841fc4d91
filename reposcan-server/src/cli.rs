//! CLI argument definitions for reposcan-server.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/reposcan/reposcan.toml";

/// Pattern search service for Azure DevOps organizations.
///
/// Accepts search requests over HTTP, scans every project, repository
/// and file of an organization concurrently, and caches the results.
#[derive(Parser, Debug)]
#[command(name = "reposcan-server")]
#[command(version, about, long_about = None)]
pub struct ServerCli {
    /// Path to reposcan.toml configuration file.
    ///
    /// When omitted, the default path is used if it exists; otherwise the
    /// server runs on built-in defaults plus environment overrides.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

impl ServerCli {
    /// Configuration file to load, if any.
    ///
    /// An explicit `--config` is always returned, even if it does not exist,
    /// so that a typo surfaces as an error instead of silently using defaults.
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                default.exists().then_some(default)
            }
        }
    }
}
