//! Stopwatch - a single-screen stopwatch service
//!
//! This is the main entry point for the stopwatch application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use stopwatch::{
    config::Config,
    services::{FileStore, KeyValueStore, MemoryStore, SystemClock},
    state::{AppState, TimerController},
    api::serve,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("stopwatch={},tower_http=info", config.log_level()))
        .init();

    info!("Starting stopwatch server v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn KeyValueStore> = if config.ephemeral {
        info!("Configuration: host={}, port={}, store=memory, refresh={}ms",
              config.host, config.port, config.refresh_ms);
        Arc::new(MemoryStore::new())
    } else {
        info!("Configuration: host={}, port={}, store={}, refresh={}ms",
              config.host, config.port, config.state_file.display(), config.refresh_ms);
        Arc::new(FileStore::new(&config.state_file))
    };

    // Restore the timer before accepting any user action
    let controller = Arc::new(TimerController::new(store, Arc::new(SystemClock), config.refresh_period()));
    controller.rehydrate().await;

    // Mount the screen
    let state = Arc::new(AppState::new(controller, config.port, config.host.clone()));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start                - Start the timer");
    info!("  POST /pause                - Pause the running timer");
    info!("  POST /resume               - Resume the paused timer");
    info!("  POST /toggle               - Pause or resume");
    info!("  POST /reset                - Ask to reset the timer");
    info!("  POST /reset/:id/confirm    - Confirm the reset");
    info!("  POST /reset/:id/cancel     - Cancel the reset");
    info!("  POST /lifecycle/background - App moved to background");
    info!("  POST /lifecycle/foreground - App returned to foreground");
    info!("  GET  /status               - Current display and buttons");
    info!("  GET  /health               - Health check");

    // Serve until a shutdown signal; the screen is unmounted and writes
    // flushed before this returns
    if let Err(e) = serve(listener, state, wait_for_shutdown()).await {
        tracing::error!("Server error: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on SIGINT/SIGTERM; never resolve if signals cannot be watched
async fn wait_for_shutdown() {
    if let Err(e) = shutdown_signal().await {
        tracing::error!("Failed to listen for shutdown signals: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
