use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::feeds::{FeedClient, FeedConfig, FeedData};
use crate::layers::{build_map_view, MapOptions, MapView};

/// Result of one render pass: the drawable view plus the features it came from
#[derive(Debug, Clone)]
pub struct MapSnapshot {
    pub view: MapView,
    pub data: FeedData,
    pub rendered_at: DateTime<Utc>,
}

impl MapSnapshot {
    pub fn from_data(data: FeedData, options: &MapOptions) -> Self {
        let view = build_map_view(&data.earthquakes, &data.fault_lines, options);
        Self {
            view,
            data,
            rendered_at: Utc::now(),
        }
    }
}

/// Fetch → transform → assemble.
pub async fn render_map(
    client: &FeedClient,
    feeds: &FeedConfig,
    options: &MapOptions,
) -> Result<MapSnapshot> {
    let start = std::time::Instant::now();
    let data = client
        .fetch_all(feeds)
        .await
        .context("Failed to fetch map feeds")?;

    let snapshot = MapSnapshot::from_data(data, options);
    info!(
        "🗺️  Map rendered in {:?}: {} markers, {} fault lines, {} timeline entries",
        start.elapsed(),
        snapshot.view.overlays.earthquakes.len(),
        snapshot.view.overlays.fault_lines.len(),
        snapshot.view.timeline.entries.len()
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::MagnitudeColor;
    use crate::feeds::test_support::spawn_feed_server;

    #[tokio::test]
    async fn renders_from_live_endpoints() {
        let base = spawn_feed_server().await;
        let feeds = FeedConfig {
            earthquake_url: format!("{}/quakes.geojson", base),
            fault_lines_url: format!("{}/faults.json", base),
        };
        let client = FeedClient::new().unwrap();

        let snapshot = render_map(&client, &feeds, &MapOptions::default())
            .await
            .unwrap();

        let markers = &snapshot.view.overlays.earthquakes;
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].color, MagnitudeColor::Orange);
        assert_eq!(markers[0].radius, 22.5);
        assert_eq!(markers[1].color, MagnitudeColor::GreenYellow);
        assert_eq!(snapshot.view.overlays.fault_lines.len(), 1);
        assert_eq!(snapshot.data.earthquakes.len(), 2);
    }

    #[tokio::test]
    async fn feed_failure_is_reported() {
        let base = spawn_feed_server().await;
        let feeds = FeedConfig {
            earthquake_url: format!("{}/broken", base),
            fault_lines_url: format!("{}/faults.json", base),
        };
        let client = FeedClient::new().unwrap();

        let err = render_map(&client, &feeds, &MapOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to fetch map feeds"));
    }
}
