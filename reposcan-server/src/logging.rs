//! Logging initialization for reposcan-server.
//!
//! Configures `tracing-subscriber` based on the `[general]` section
//! of `RepoScanConfig`. Supports JSON structured logging and
//! human-readable pretty format on stdout, plus an optional daily
//! rolling JSON log file.

use std::path::Path;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use reposcan_core::config::GeneralConfig;

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
/// When `log_file` is set, the returned guard must be kept alive for the
/// lifetime of the process; dropping it flushes and stops the file writer.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines (default for production)
/// * `"pretty"` - Human-readable colored output (for development)
pub fn init_tracing(config: &GeneralConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let stdout_layer = match config.log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().boxed(),
        "pretty" => tracing_subscriber::fmt::layer().pretty().boxed(),
        _ => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                config.log_format
            ));
        }
    };

    let (file_layer, guard) = if config.log_file.is_empty() {
        (None, None)
    } else {
        let (directory, file_name) = split_log_path(&config.log_file)?;
        let appender = tracing_appender::rolling::daily(directory, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer);
        (Some(layer), Some(guard))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {}", e))?;

    Ok(guard)
}

/// Split a log file path into its directory and file name prefix.
///
/// A bare file name is placed in the current directory.
fn split_log_path(log_file: &str) -> Result<(&Path, &std::ffi::OsStr)> {
    let path = Path::new(log_file);
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log file '{}' has no file name", log_file))?;
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((directory, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_absolute_path() {
        let (dir, name) = split_log_path("/var/log/reposcan/server.log").unwrap();
        assert_eq!(dir, Path::new("/var/log/reposcan"));
        assert_eq!(name, "server.log");
    }

    #[test]
    fn split_bare_file_name() {
        let (dir, name) = split_log_path("server.log").unwrap();
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "server.log");
    }

    #[test]
    fn directory_only_path_is_rejected() {
        assert!(split_log_path("/var/log/..").is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let config = GeneralConfig {
            log_format: "xml".to_owned(),
            ..GeneralConfig::default()
        };
        assert!(init_tracing(&config).is_err());
    }
}
