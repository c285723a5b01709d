// Port configuration
pub const DEFAULT_PORT: u16 = 3001;

// Feed endpoints
pub const EARTHQUAKE_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson";
pub const FAULT_LINES_FEED_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

// HTTP client
pub const HTTP_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = concat!("quakemap/", env!("CARGO_PKG_VERSION"));

// Map view
pub const MAP_ELEMENT_ID: &str = "map";
pub const MAP_CENTER: (f64, f64) = (39.8283, -98.5785); // (lat, lng), geographic centre of the contiguous US
pub const MAP_ZOOM: u8 = 3;

// Marker styling
pub const MARKER_RADIUS_SCALE: f64 = 5.0;
pub const MARKER_FILL_OPACITY: f64 = 1.0;
pub const FAULT_LINE_WEIGHT: u32 = 2;
pub const FAULT_LINE_COLOR: &str = "blue";

// Timeline: how long (ms) a quake stays visible per unit of magnitude
pub const TIMELINE_MS_PER_MAGNITUDE: f64 = 10_000_000.0;

// Mapbox raster tiles, {style} and {token} are substituted per base layer
pub const MAPBOX_TILE_TEMPLATE: &str =
    "https://api.mapbox.com/styles/v1/mapbox/{style}/tiles/256/{z}/{x}/{y}?access_token={token}";

// (label, mapbox style id)
pub const BASE_LAYER_STYLES: &[(&str, &str)] = &[
    ("Outdoors", "outdoors-v10"),
    ("Satellite", "satellite-v9"),
    ("Dark Map", "dark-v9"),
];

pub const EARTHQUAKES_OVERLAY: &str = "Earthquakes";
pub const FAULT_LINES_OVERLAY: &str = "Fault Lines";

pub const UNKNOWN_PLACE: &str = "Unknown location";
