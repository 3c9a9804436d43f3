pub mod page;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::errors::LatticeResult;

/// Shared, read-only server state. Every request builds its own figure.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Arc::new(Self { config })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index).post(routes::render_form))
        .route("/api/lattice", get(routes::api_lattice))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the lattice form until ctrl-c.
pub async fn serve(config: AppConfig) -> LatticeResult<()> {
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("server listening on {addr}");

    axum::serve(listener, router(AppState::new(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
