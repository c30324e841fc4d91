//! Wiring of the production components from configuration.

use std::sync::Arc;

use anyhow::Result;

use reposcan_azure_devops::AzureDevOpsConnector;
use reposcan_cache::{CacheBackend, ResultCache};
use reposcan_core::config::RepoScanConfig;
use reposcan_core::telemetry::Telemetry;
use reposcan_scanner::{OrganizationScanner, ScanEngineConfig};

use crate::api::AppState;
use crate::cli::ServerCli;

/// Production handler state.
pub type ServerState = AppState<CacheBackend, AzureDevOpsConnector>;

/// Resolve the effective configuration.
///
/// Order: config file (or built-in defaults), environment overrides,
/// CLI overrides, then validation.
pub async fn load_config(cli: &ServerCli) -> Result<RepoScanConfig> {
    let mut config = match cli.config_path() {
        Some(path) => RepoScanConfig::from_file(&path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))?,
        None => RepoScanConfig::default(),
    };
    config.apply_env_overrides();

    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format = format.clone();
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    Ok(config)
}

/// Build the Azure DevOps connector, scanner, cache backend and façade.
///
/// No network connection is made here; the cache backend and catalog
/// connect lazily on the first request.
pub fn build_state(config: &RepoScanConfig, telemetry: Arc<dyn Telemetry>) -> Result<ServerState> {
    let connector = AzureDevOpsConnector::new(&config.catalog)
        .map_err(|e| anyhow::anyhow!("failed to create catalog connector: {}", e))?;

    let scanner = OrganizationScanner::new(
        Arc::new(connector),
        ScanEngineConfig::from_core(&config.scanner),
        Arc::clone(&telemetry),
    )
    .map_err(|e| anyhow::anyhow!("failed to create scanner: {}", e))?;

    let store = CacheBackend::from_config(&config.cache)
        .map_err(|e| anyhow::anyhow!("failed to create cache backend: {}", e))?;

    tracing::info!(
        catalog = %config.catalog.base_url,
        max_in_flight = config.scanner.max_in_flight,
        cache = store.name(),
        "search service initialized"
    );

    let cache = ResultCache::new(
        Arc::new(store),
        Arc::new(scanner),
        config.cache.ttl(),
        telemetry,
    )
    .with_partial_ttl(config.cache.partial_ttl());
    Ok(AppState::new(Arc::new(cache)))
}
