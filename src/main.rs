use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// Import modules
mod classify;
mod constants;
mod feeds;
mod html_template;
mod layers;
mod model;
mod render;
mod server;
mod settings;

use feeds::FeedClient;
use render::MapSnapshot;
use server::{spawn_refresh_loop, start_server, AppState};
use settings::Settings;

/// Writes the rendered map as one self-contained HTML file
fn export_map(snapshot: &MapSnapshot, export_path: &Path) -> Result<()> {
    let html = html_template::render_standalone_html(&snapshot.view)?;
    if let Some(parent) = export_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(export_path, html)
        .with_context(|| format!("Failed to write {}", export_path.display()))?;
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quakemap=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    info!("🌋 QuakeMap v{} starting...", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load().context("Failed to load settings")?;
    info!("⚙️  Settings loaded from {}", Settings::config_path().display());
    if settings.mapbox_token.is_empty() {
        warn!("⚠️  mapbox_token is not set - base map tiles will not load");
    }

    let client = FeedClient::new()?;
    let port = settings.port;
    let refresh_interval = settings.refresh_interval_secs;
    let export_path = settings.export_path.clone();

    let app_state = AppState::new(settings, client);

    // First render; the server still comes up if the feeds are unreachable
    info!("🌐 Fetching earthquake and fault-line feeds...");
    match app_state.refresh().await {
        Ok(()) => {
            if let (Some(path), Some(snapshot)) = (export_path, app_state.current()) {
                let path = Path::new(&path);
                match export_map(&snapshot, path) {
                    Ok(()) => info!("💾 Standalone map written to {}", path.display()),
                    Err(e) => error!("❌ Export failed: {:#}", e),
                }
            }
        }
        Err(e) => {
            error!("❌ Initial render failed: {:#}", e);
            warn!("   The map will be empty until POST /api/refresh succeeds");
        }
    }

    if refresh_interval > 0 {
        info!("🔄 Refreshing feeds every {}s", refresh_interval);
        spawn_refresh_loop(app_state.clone(), Duration::from_secs(refresh_interval));
    }

    start_server(app_state, port).await?;

    Ok(())
}
