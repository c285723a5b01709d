use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use tracing::{error, info};

use crate::classify::{legend_entries, LegendEntry};
use crate::html_template::asset_text;
use crate::layers::MapView;
use crate::model::{EarthquakeFeature, FaultLineFeature};
use crate::render::MapSnapshot;
use crate::settings::Settings;

use super::state::AppState;

fn current_snapshot(state: &AppState) -> Result<MapSnapshot, StatusCode> {
    state.current().ok_or(StatusCode::SERVICE_UNAVAILABLE)
}

fn embedded(name: &str) -> Result<String, StatusCode> {
    asset_text(name).map_err(|e| {
        error!("❌ {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub async fn index_html() -> Result<Html<String>, StatusCode> {
    Ok(Html(embedded("index.html")?))
}

pub async fn style_css() -> Result<Response, StatusCode> {
    let content = embedded("style.css")?;
    Ok(([(header::CONTENT_TYPE, "text/css")], content).into_response())
}

pub async fn script_js() -> Result<Response, StatusCode> {
    let content = embedded("script.js")?;
    Ok(([(header::CONTENT_TYPE, "application/javascript")], content).into_response())
}

// API endpoint with the drawable map view
pub async fn get_map(State(state): State<AppState>) -> Result<Json<MapView>, StatusCode> {
    Ok(Json(current_snapshot(&state)?.view))
}

pub async fn get_earthquakes(
    State(state): State<AppState>,
) -> Result<Json<Vec<EarthquakeFeature>>, StatusCode> {
    Ok(Json(current_snapshot(&state)?.data.earthquakes))
}

pub async fn get_fault_lines(
    State(state): State<AppState>,
) -> Result<Json<Vec<FaultLineFeature>>, StatusCode> {
    Ok(Json(current_snapshot(&state)?.data.fault_lines))
}

pub async fn get_legend() -> Json<Vec<LegendEntry>> {
    Json(legend_entries())
}

pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    let settings = state.settings.lock().unwrap();
    Json((*settings).clone())
}

// API endpoint to update settings; feed changes apply on the next refresh
pub async fn update_settings(
    State(state): State<AppState>,
    Json(new_settings): Json<Settings>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut settings = state.settings.lock().unwrap();
    *settings = new_settings;

    if let Err(e) = settings.save() {
        error!("❌ Failed to save settings: {:#}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let response = serde_json::json!({
        "status": "success",
        "message": "Settings updated successfully"
    });

    Ok(Json(response))
}

// API endpoint to refetch both feeds now
pub async fn refresh_map(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    info!("🔄 Refresh requested");

    if let Err(e) = state.refresh().await {
        error!("❌ Refresh failed: {:#}", e);
        return Err(StatusCode::BAD_GATEWAY);
    }

    let snapshot = current_snapshot(&state)?;
    let response = serde_json::json!({
        "status": "success",
        "earthquakes": snapshot.view.overlays.earthquakes.len(),
        "fault_lines": snapshot.view.overlays.fault_lines.len(),
        "rendered_at": snapshot.rendered_at,
    });

    Ok(Json(response))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let rendered_at = state.snapshot.read().unwrap().as_ref().map(|s| s.rendered_at);
    Json(serde_json::json!({
        "status": "ok",
        "map_ready": rendered_at.is_some(),
        "rendered_at": rendered_at,
    }))
}
