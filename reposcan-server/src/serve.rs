//! HTTP listener lifecycle with graceful shutdown.

use std::future::{Future, IntoFuture};
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serve `router` until `shutdown` resolves.
///
/// After the shutdown signal, in-flight requests get `grace` to finish.
/// Once it elapses this returns without waiting for them; their scans are
/// cancelled when the runtime shuts down.
pub async fn serve<S>(listener: TcpListener, router: Router, shutdown: S, grace: Duration) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    let grace_expired = async move {
        if signalled_rx.await.is_ok() {
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| anyhow::anyhow!("http server failed: {}", e))?;
        }
        () = grace_expired => {
            tracing::warn!(
                grace_secs = grace.as_secs(),
                "shutdown grace period elapsed, abandoning in-flight requests"
            );
        }
    }
    Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
