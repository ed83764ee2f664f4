use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use timetable::catalog::{self, Catalog, CatalogSource};
use timetable::config::PlannerConfig;
use timetable::db::SqliteStore;
use timetable::planner::Planner;
use timetable::render::ViewRenderer;
use timetable::server::create_router;
use timetable::types::AppState;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = PlannerConfig::load(config_path).context("failed to load configuration")?;
    let addr = config.socket_addr()?;

    // The server starts without a catalog; catalog routes answer 503 instead.
    let (catalog, catalog_error) = match config.catalog_source.parse::<CatalogSource>() {
        Ok(source) => match catalog::load(&source).await {
            Ok(catalog) => (catalog, None),
            Err(e) => {
                error!(error = %e, "Failed to load course catalog");
                (Catalog::empty(), Some(e.to_string()))
            }
        },
        Err(e) => {
            error!(error = %e, "Invalid catalog source");
            (Catalog::empty(), Some(e.to_string()))
        }
    };

    let store = SqliteStore::open(&config.database_path).with_context(|| {
        format!("failed to open database {}", config.database_path.display())
    })?;

    let mut planner = Planner::new(catalog, store, ViewRenderer::new())
        .with_limits(config.min_credits, config.palette_size);
    planner.restore();

    let state = Arc::new(AppState::new(planner, catalog_error));
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
