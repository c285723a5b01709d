use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{
    choose_color, legend_entries, marker_size, timeline_interval, LegendEntry, MagnitudeColor,
    TimeInterval,
};
use crate::constants::*;
use crate::model::{EarthquakeFeature, FaultLineFeature, Position};

/// Leaflet order: [lat, lng]
pub type LatLng = [f64; 2];

fn lat_lng((lon, lat): Position) -> LatLng {
    [lat, lon]
}

/// Knobs the page cannot work out by itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapOptions {
    pub mapbox_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleMarker {
    pub lat_lng: LatLng,
    pub color: MagnitudeColor,
    pub fill_color: MagnitudeColor,
    pub fill_opacity: f64,
    pub radius: f64,
    pub popup_html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub lat_lngs: Vec<LatLng>,
    pub weight: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub marker: CircleMarker,
    pub interval: TimeInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineLayer {
    pub entries: Vec<TimelineEntry>,
    /// Earliest start to latest end, `None` when there is nothing to animate
    pub range: Option<TimeInterval>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub name: String,
    pub url_template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlays {
    pub earthquakes: Vec<CircleMarker>,
    pub fault_lines: Vec<Polyline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerControl {
    pub base_layers: Vec<String>,
    pub overlays: Vec<String>,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub position: String,
    pub entries: Vec<LegendEntry>,
}

/// Everything the page needs to draw the map, precomputed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub element_id: String,
    pub center: LatLng,
    pub zoom: u8,
    pub scroll_wheel_zoom: bool,
    pub base_layers: Vec<TileLayer>,
    pub overlays: Overlays,
    pub timeline: TimelineLayer,
    /// Layer names switched on at load
    pub initial_layers: Vec<String>,
    pub layer_control: LayerControl,
    pub legend: Legend,
}

/// Renders epoch milliseconds the way a browser prints a UTC `Date`.
pub fn format_timestamp(time_millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(time_millis) {
        Some(dt) => dt
            .format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)")
            .to_string(),
        None => time_millis.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn popup_html(quake: &EarthquakeFeature) -> String {
    format!(
        "<h3>{}</h3><hr><p>{}</p><hr><p>Magnitude: {}</p>",
        escape_html(&quake.place),
        format_timestamp(quake.time_millis),
        quake.magnitude
    )
}

pub fn quake_marker(quake: &EarthquakeFeature) -> CircleMarker {
    let color = choose_color(quake.magnitude);
    CircleMarker {
        lat_lng: lat_lng(quake.coordinates),
        color,
        fill_color: color,
        fill_opacity: MARKER_FILL_OPACITY,
        // Negative magnitudes exist in the feed; Leaflet cannot draw a negative radius
        radius: marker_size(quake.magnitude).max(0.0),
        popup_html: popup_html(quake),
    }
}

pub fn fault_polyline(fault: &FaultLineFeature) -> Polyline {
    Polyline {
        lat_lngs: fault.coordinates.iter().copied().map(lat_lng).collect(),
        weight: FAULT_LINE_WEIGHT,
        color: FAULT_LINE_COLOR.to_string(),
    }
}

pub fn build_timeline(quakes: &[EarthquakeFeature]) -> TimelineLayer {
    let entries: Vec<TimelineEntry> = quakes
        .iter()
        .map(|quake| TimelineEntry {
            marker: quake_marker(quake),
            interval: timeline_interval(quake),
        })
        .collect();

    let range = entries
        .iter()
        .map(|e| e.interval)
        .reduce(|acc, i| TimeInterval {
            start: acc.start.min(i.start),
            end: acc.end.max(i.end),
        });

    TimelineLayer { entries, range }
}

pub fn base_layers(options: &MapOptions) -> Vec<TileLayer> {
    BASE_LAYER_STYLES
        .iter()
        .map(|(name, style)| TileLayer {
            name: name.to_string(),
            url_template: MAPBOX_TILE_TEMPLATE
                .replace("{style}", style)
                .replace("{token}", &options.mapbox_token),
        })
        .collect()
}

/// Assembles the full map view from already decoded features.
pub fn build_map_view(
    quakes: &[EarthquakeFeature],
    faults: &[FaultLineFeature],
    options: &MapOptions,
) -> MapView {
    let base_layers = base_layers(options);
    let base_names: Vec<String> = base_layers.iter().map(|l| l.name.clone()).collect();
    let overlay_names = vec![
        EARTHQUAKES_OVERLAY.to_string(),
        FAULT_LINES_OVERLAY.to_string(),
    ];

    // Outdoors + fault lines on load
    let initial_layers = vec![base_names[0].clone(), FAULT_LINES_OVERLAY.to_string()];

    MapView {
        element_id: MAP_ELEMENT_ID.to_string(),
        center: [MAP_CENTER.0, MAP_CENTER.1],
        zoom: MAP_ZOOM,
        scroll_wheel_zoom: false,
        base_layers,
        overlays: Overlays {
            earthquakes: quakes.iter().map(quake_marker).collect(),
            fault_lines: faults.iter().map(fault_polyline).collect(),
        },
        timeline: build_timeline(quakes),
        initial_layers,
        layer_control: LayerControl {
            base_layers: base_names,
            overlays: overlay_names,
            collapsed: true,
        },
        legend: Legend {
            position: "bottomright".to_string(),
            entries: legend_entries(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quake(magnitude: f64, place: &str, time_millis: i64) -> EarthquakeFeature {
        EarthquakeFeature {
            coordinates: (-120.5, 35.25),
            magnitude,
            place: place.to_string(),
            time_millis,
        }
    }

    #[test]
    fn single_quake_end_to_end() {
        let quakes = vec![quake(4.5, "Test", 1_000_000)];
        let view = build_map_view(&quakes, &[], &MapOptions::default());

        let marker = &view.overlays.earthquakes[0];
        assert_eq!(marker.color, MagnitudeColor::Orange);
        assert_eq!(marker.fill_color, MagnitudeColor::Orange);
        assert_eq!(marker.radius, 22.5);
        assert_eq!(marker.lat_lng, [35.25, -120.5]);
        assert!(marker.popup_html.contains("Test"));
        assert!(marker.popup_html.contains("Magnitude: 4.5"));

        let entry = &view.timeline.entries[0];
        assert_eq!(entry.interval.start, 1_000_000);
        assert_eq!(entry.interval.end, 46_000_000);
        assert_eq!(entry.marker, *marker);
        assert_eq!(view.timeline.range, Some(entry.interval));
    }

    #[test]
    fn empty_feeds_still_build_every_layer() {
        let view = build_map_view(&[], &[], &MapOptions::default());

        assert!(view.overlays.earthquakes.is_empty());
        assert!(view.overlays.fault_lines.is_empty());
        assert!(view.timeline.entries.is_empty());
        assert_eq!(view.timeline.range, None);

        let names: Vec<&str> = view.base_layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Outdoors", "Satellite", "Dark Map"]);
        assert_eq!(view.layer_control.overlays, ["Earthquakes", "Fault Lines"]);
        assert!(view.layer_control.collapsed);
        assert_eq!(view.legend.entries.len(), 6);
        assert_eq!(view.legend.position, "bottomright");
    }

    #[test]
    fn view_uses_fixed_camera() {
        let view = build_map_view(&[], &[], &MapOptions::default());
        assert_eq!(view.element_id, "map");
        assert_eq!(view.center, [39.8283, -98.5785]);
        assert_eq!(view.zoom, 3);
        assert!(!view.scroll_wheel_zoom);
        assert_eq!(view.initial_layers, ["Outdoors", "Fault Lines"]);
    }

    #[test]
    fn tile_urls_carry_style_and_token() {
        let options = MapOptions {
            mapbox_token: "pk.test".to_string(),
        };
        let layers = base_layers(&options);
        assert_eq!(
            layers[1].url_template,
            "https://api.mapbox.com/styles/v1/mapbox/satellite-v9/tiles/256/{z}/{x}/{y}?access_token=pk.test"
        );
        assert!(layers[2].url_template.contains("dark-v9"));
    }

    #[test]
    fn fault_lines_swap_to_lat_lng() {
        let fault = FaultLineFeature {
            coordinates: vec![(-124.0, 40.0), (-121.0, 36.0)],
        };
        let line = fault_polyline(&fault);
        assert_eq!(line.lat_lngs, vec![[40.0, -124.0], [36.0, -121.0]]);
        assert_eq!(line.weight, 2);
        assert_eq!(line.color, "blue");
    }

    #[test]
    fn negative_magnitude_draws_zero_radius() {
        let marker = quake_marker(&quake(-0.6, "Geysers", 0));
        assert_eq!(marker.radius, 0.0);
        assert_eq!(marker.color, MagnitudeColor::GreenYellow);
    }

    #[test]
    fn popup_escapes_place_and_formats_time() {
        let html = popup_html(&quake(2.0, "<b>Ridge</b> & co", 1_000_000));
        assert!(html.starts_with("<h3>&lt;b&gt;Ridge&lt;/b&gt; &amp; co</h3>"));
        assert!(html.contains("<p>Thu Jan 01 1970 00:16:40 GMT+0000"));
        assert!(html.ends_with("<p>Magnitude: 2</p>"));
    }

    #[test]
    fn timeline_range_spans_all_quakes() {
        let quakes = vec![quake(1.0, "a", 5_000), quake(3.0, "b", 1_000)];
        let timeline = build_timeline(&quakes);
        assert_eq!(
            timeline.range,
            Some(TimeInterval {
                start: 1_000,
                end: 30_001_000
            })
        );
    }
}
