use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};
use tracing::{info, warn};

pub mod handlers;
pub mod state;

pub use self::state::AppState;
use handlers::{
    get_earthquakes, get_fault_lines, get_legend, get_map, get_settings, health, index_html,
    refresh_map, script_js, style_css, update_settings,
};

// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_html))
        .route("/style.css", get(style_css))
        .route("/script.js", get(script_js))
        .route("/api/map", get(get_map))
        .route("/api/earthquakes", get(get_earthquakes))
        .route("/api/fault-lines", get(get_fault_lines))
        .route("/api/legend", get(get_legend))
        .route("/api/settings", get(get_settings).post(update_settings))
        .route("/api/refresh", post(refresh_map))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

/// Re-renders the map every `interval`, keeping the old snapshot on failure.
pub fn spawn_refresh_loop(state: AppState, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick fires immediately and startup already rendered once
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match state.refresh().await {
                Ok(()) => info!("🔄 Scheduled refresh complete"),
                Err(e) => warn!("⚠️  Scheduled refresh failed, keeping previous map: {:#}", e),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("⚠️  Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutting down");
}

pub async fn start_server(state: AppState, port: u16) -> Result<()> {
    let app = create_app(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;

    info!("   ✅ HTTP server started successfully at http://127.0.0.1:{}", port);
    info!("   🗺️  API endpoints:");
    info!("      - GET  /api/map - Map view (markers, fault lines, timeline, legend)");
    info!("      - GET  /api/earthquakes - Decoded earthquake features");
    info!("      - GET  /api/fault-lines - Decoded fault lines");
    info!("      - POST /api/refresh - Refetch both feeds");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
