use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;

use reposcan_core::telemetry::{MetricsTelemetry, Telemetry};
use reposcan_server::cli::ServerCli;
use reposcan_server::{api, app, logging, metrics_server, serve};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ServerCli::parse();

    // 설정 로드 (파일 -> 환경변수 -> CLI -> 검증)
    let config = app::load_config(&cli).await?;

    if cli.validate {
        println!("configuration is valid");
        return Ok(());
    }

    let _log_guard = logging::init_tracing(&config.general)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "reposcan-server starting");

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    let telemetry: Arc<dyn Telemetry> = Arc::new(MetricsTelemetry);
    let state = app::build_state(&config, telemetry)?;
    let router = api::router(state, config.server.request_timeout());

    let addr = format!("{}:{}", config.server.listen_addr, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?;
    tracing::info!(listen_addr = %addr, "reposcan-server listening");

    serve::serve(
        listener,
        router,
        serve::shutdown_signal(),
        config.server.shutdown_grace(),
    )
    .await?;

    tracing::info!("reposcan-server shut down");
    Ok(())
}
