// Finance Ops Back Office - Mock API Server
// REST API with Axum over in-memory seed data

use anyhow::{Context, Result};
use finops::api::{create_router, AppState};
use finops::{logging, Config, MockStore};
use tokio::net::TcpListener;
use tracing::info;

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info,tower_http=info");

    let config = Config::from_env().context("Failed to load configuration")?;
    let addr = config.bind_addr()?;

    info!("🌐 Finance Ops - Mock API Server v{}", finops::VERSION);

    let store = MockStore::seeded();
    let state = AppState::new(store, config.stream_delay);
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("🚀 Server running on http://{}", addr);
    info!("   GET   /api/close/tasks");
    info!("   PATCH /api/close/tasks/:id");
    info!("   GET   /api/recons");
    info!("   GET   /api/data-templates/bindings");
    info!("   GET   /api/revenue-cases");
    info!("   POST  /api/sse");
    info!("   Press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("✅ Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
