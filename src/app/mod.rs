mod router;
pub mod server;
mod state;
pub mod tracing;

pub use router::catalog_router;
pub use state::AppState;

use crate::config::Config;
use crate::error::CatalogError;
use tokio_util::sync::CancellationToken;

/// Application entry point. Initializes tracing and configuration, then
/// either serves the catalog or runs the one-shot `refresh` command.
pub async fn run() -> Result<(), CatalogError> {
    tracing::init_tracing();
    tracing::install_panic_hook();

    let config = Config::from_env()?;
    ::tracing::info!("Loaded settings");

    let state = AppState::from_config(&config).await?;

    // One-shot scrape for cron jobs and manual reseeding.
    if std::env::args().nth(1).as_deref() == Some("refresh") {
        let report = state.orchestrator.force_refresh().await;
        state.orchestrator.drain_exports().await;
        if report.persisted_any() {
            std::process::exit(0)
        }
        eprintln!("Refresh persisted no records");
        std::process::exit(1)
    }

    let shutdown_token = CancellationToken::new();
    let app = router::catalog_router(state.query);
    server::serve(app, config.http_bind(), shutdown_token).await?;

    state.orchestrator.drain_exports().await;
    Ok(())
}
