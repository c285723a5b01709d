use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::UNKNOWN_PLACE;

/// (longitude, latitude), GeoJSON axis order
pub type Position = (f64, f64);

// One earthquake from the USGS summary feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthquakeFeature {
    pub coordinates: Position,
    pub magnitude: f64,
    pub place: String,
    pub time_millis: i64, // epoch milliseconds
}

// One plate boundary segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultLineFeature {
    pub coordinates: Vec<Position>,
}

// Wire structures, only the fields we read

#[derive(Deserialize)]
struct FeatureCollection<P> {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default = "Vec::new")]
    features: Vec<RawFeature<P>>,
}

#[derive(Deserialize)]
struct RawFeature<P> {
    geometry: Option<Geometry>,
    properties: Option<P>,
    #[serde(default)]
    id: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point {
        coordinates: Vec<f64>,
    },
    LineString {
        coordinates: Vec<Vec<f64>>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize)]
struct QuakeProperties {
    mag: Option<f64>,
    place: Option<String>,
    time: Option<i64>,
}

#[derive(Deserialize)]
struct IgnoredProperties {}

fn parse_collection<P: DeserializeOwned>(
    bytes: &[u8],
    what: &str,
) -> Result<FeatureCollection<P>> {
    let collection: FeatureCollection<P> = serde_json::from_slice(bytes)
        .with_context(|| format!("Failed to parse {} feed as GeoJSON", what))?;
    if collection.kind != "FeatureCollection" {
        bail!(
            "{} feed is a '{}', expected a FeatureCollection",
            what,
            collection.kind
        );
    }
    Ok(collection)
}

fn to_position(raw: &[f64]) -> Option<Position> {
    // Extra elements (depth, altitude) are ignored
    match raw {
        [lon, lat, ..] => Some((*lon, *lat)),
        _ => None,
    }
}

fn to_line(raw: &[Vec<f64>]) -> Option<Vec<Position>> {
    raw.iter().map(|p| to_position(p)).collect()
}

fn describe_id(id: &Option<serde_json::Value>) -> String {
    id.as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<no id>".to_string())
}

/// Decodes the earthquake feed. Features without a point, magnitude or
/// time are skipped; a missing place name becomes "Unknown location".
pub fn decode_earthquakes(bytes: &[u8]) -> Result<Vec<EarthquakeFeature>> {
    let collection: FeatureCollection<QuakeProperties> = parse_collection(bytes, "earthquake")?;
    let total = collection.features.len();

    let mut quakes = Vec::with_capacity(total);
    for feature in collection.features {
        let id = describe_id(&feature.id);
        let coordinates = match &feature.geometry {
            Some(Geometry::Point { coordinates }) => to_position(coordinates),
            _ => None,
        };
        let Some(coordinates) = coordinates else {
            warn!("⚠️  Skipping earthquake {}: no point geometry", id);
            continue;
        };
        let Some(props) = feature.properties else {
            warn!("⚠️  Skipping earthquake {}: no properties", id);
            continue;
        };
        let (Some(magnitude), Some(time_millis)) = (props.mag, props.time) else {
            warn!("⚠️  Skipping earthquake {}: missing magnitude or time", id);
            continue;
        };

        quakes.push(EarthquakeFeature {
            coordinates,
            magnitude,
            place: props.place.unwrap_or_else(|| UNKNOWN_PLACE.to_string()),
            time_millis,
        });
    }

    debug!("Decoded {} of {} earthquake features", quakes.len(), total);
    Ok(quakes)
}

/// Decodes the fault-line feed. Every line of a MultiLineString becomes
/// its own feature.
pub fn decode_fault_lines(bytes: &[u8]) -> Result<Vec<FaultLineFeature>> {
    let collection: FeatureCollection<IgnoredProperties> = parse_collection(bytes, "fault line")?;
    let total = collection.features.len();

    let mut lines = Vec::with_capacity(total);
    for feature in collection.features {
        let id = describe_id(&feature.id);
        match feature.geometry {
            Some(Geometry::LineString { coordinates }) => match to_line(&coordinates) {
                Some(coordinates) => lines.push(FaultLineFeature { coordinates }),
                None => warn!("⚠️  Skipping fault line {}: malformed position", id),
            },
            Some(Geometry::MultiLineString { coordinates }) => {
                for part in &coordinates {
                    match to_line(part) {
                        Some(coordinates) => lines.push(FaultLineFeature { coordinates }),
                        None => warn!("⚠️  Skipping part of fault line {}: malformed position", id),
                    }
                }
            }
            _ => warn!("⚠️  Skipping fault line {}: not a line geometry", id),
        }
    }

    debug!("Decoded {} fault lines from {} features", lines.len(), total);
    Ok(lines)
}
