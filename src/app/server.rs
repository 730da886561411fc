use crate::error::CatalogError;
use axum::Router;
use std::net::SocketAddr;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Serve the addon router until SIGINT/SIGTERM or `shutdown_token` fires.
pub async fn serve(
    app: Router,
    bind: SocketAddr,
    shutdown_token: CancellationToken,
) -> Result<(), CatalogError> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| CatalogError::Bind {
            address: bind.to_string(),
            source: e,
        })?;
    info!("Catalog server listening on {}", listener.local_addr()?);
    info!("  - GET  /manifest.json");
    info!("  - GET  /catalog/{{type}}/{{id}}.json");
    info!("  - GET  /health");

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_token.cancelled_owned())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
