use serde::{Deserialize, Serialize};

use crate::constants::{MARKER_RADIUS_SCALE, TIMELINE_MS_PER_MAGNITUDE};
use crate::model::EarthquakeFeature;

/// Colour bucket for a magnitude, serialized as the CSS colour name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnitudeColor {
    GreenYellow,
    YellowGreen,
    Yellow,
    Gold,
    Orange,
    Red,
}

impl MagnitudeColor {
    pub fn as_str(self) -> &'static str {
        match self {
            MagnitudeColor::GreenYellow => "greenyellow",
            MagnitudeColor::YellowGreen => "yellowgreen",
            MagnitudeColor::Yellow => "yellow",
            MagnitudeColor::Gold => "gold",
            MagnitudeColor::Orange => "orange",
            MagnitudeColor::Red => "red",
        }
    }
}

impl std::fmt::Display for MagnitudeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the colour bucket for a magnitude.
///
/// Thresholds are strict: a magnitude of exactly 5 is still orange.
/// Anything at or below 1 (and NaN) lands in the default bucket.
pub fn choose_color(magnitude: f64) -> MagnitudeColor {
    if magnitude > 5.0 {
        MagnitudeColor::Red
    } else if magnitude > 4.0 {
        MagnitudeColor::Orange
    } else if magnitude > 3.0 {
        MagnitudeColor::Gold
    } else if magnitude > 2.0 {
        MagnitudeColor::Yellow
    } else if magnitude > 1.0 {
        MagnitudeColor::YellowGreen
    } else {
        MagnitudeColor::GreenYellow
    }
}

/// Circle radius in pixels, linear in magnitude
pub fn marker_size(magnitude: f64) -> f64 {
    magnitude * MARKER_RADIUS_SCALE
}

/// Window (epoch ms) during which a quake is shown on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: i64,
    pub end: i64,
}

/// Stronger quakes linger longer: `end = start + magnitude * 10_000_000` ms.
///
/// The float-to-int cast saturates and the add saturates too, so an absurd
/// magnitude from the feed pins `end` to the i64 range instead of wrapping.
pub fn timeline_interval(feature: &EarthquakeFeature) -> TimeInterval {
    let duration = (feature.magnitude * TIMELINE_MS_PER_MAGNITUDE).round() as i64;
    TimeInterval {
        start: feature.time_millis,
        end: feature.time_millis.saturating_add(duration),
    }
}

// Legend rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub grade: u8,
    pub label: String,
    pub color: MagnitudeColor,
}

const LEGEND_GRADES: [u8; 6] = [0, 1, 2, 3, 4, 5];

/// One row per bucket; the swatch uses the colour of `grade + 1` so each
/// row shows the colour of the range above its lower bound.
pub fn legend_entries() -> Vec<LegendEntry> {
    LEGEND_GRADES
        .iter()
        .enumerate()
        .map(|(i, &grade)| {
            let label = match LEGEND_GRADES.get(i + 1) {
                Some(next) => format!("{}\u{2013}{}", grade, next),
                None => format!("{}+", grade),
            };
            LegendEntry {
                grade,
                label,
                color: choose_color(f64::from(grade) + 1.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quake(magnitude: f64, time_millis: i64) -> EarthquakeFeature {
        EarthquakeFeature {
            coordinates: (-122.0, 37.0),
            magnitude,
            place: "Somewhere".to_string(),
            time_millis,
        }
    }

    #[test]
    fn color_boundaries_are_strict() {
        assert_eq!(choose_color(1.0), MagnitudeColor::GreenYellow);
        assert_eq!(choose_color(1.01), MagnitudeColor::YellowGreen);
        assert_eq!(choose_color(2.0), MagnitudeColor::YellowGreen);
        assert_eq!(choose_color(3.0), MagnitudeColor::Yellow);
        assert_eq!(choose_color(4.0), MagnitudeColor::Gold);
        assert_eq!(choose_color(5.0), MagnitudeColor::Orange);
        assert_eq!(choose_color(5.01), MagnitudeColor::Red);
    }

    #[test]
    fn color_default_bucket_covers_low_and_odd_values() {
        assert_eq!(choose_color(0.0), MagnitudeColor::GreenYellow);
        assert_eq!(choose_color(-1.3), MagnitudeColor::GreenYellow);
        assert_eq!(choose_color(f64::NAN), MagnitudeColor::GreenYellow);
        assert_eq!(choose_color(9.5), MagnitudeColor::Red);
    }

    #[test]
    fn color_buckets_are_monotonic() {
        let order = [
            MagnitudeColor::GreenYellow,
            MagnitudeColor::YellowGreen,
            MagnitudeColor::Yellow,
            MagnitudeColor::Gold,
            MagnitudeColor::Orange,
            MagnitudeColor::Red,
        ];
        let rank = |c: MagnitudeColor| order.iter().position(|&o| o == c).unwrap();

        let mut previous = 0;
        for step in 0..=80 {
            let m = step as f64 * 0.1;
            let current = rank(choose_color(m));
            assert!(current >= previous, "bucket went down at magnitude {}", m);
            previous = current;
        }
    }

    #[test]
    fn color_serializes_as_css_name() {
        let json = serde_json::to_string(&MagnitudeColor::GreenYellow).unwrap();
        assert_eq!(json, "\"greenyellow\"");
        assert_eq!(MagnitudeColor::Gold.to_string(), "gold");
    }

    #[test]
    fn marker_size_is_linear() {
        assert_eq!(marker_size(0.0), 0.0);
        assert_eq!(marker_size(1.0), 5.0);
        assert_eq!(marker_size(4.5), 22.5);
        assert_eq!(marker_size(-0.4), -2.0);
        assert!(marker_size(3.2) < marker_size(3.3));
    }

    #[test]
    fn interval_length_scales_with_magnitude() {
        let interval = timeline_interval(&quake(4.5, 1_000_000));
        assert_eq!(interval.start, 1_000_000);
        assert_eq!(interval.end - interval.start, 45_000_000);

        let interval = timeline_interval(&quake(0.0, 1_700_000_000_000));
        assert_eq!(interval.start, interval.end);
    }

    #[test]
    fn huge_magnitude_saturates_interval_end() {
        let interval = timeline_interval(&quake(1e18, 1_700_000_000_000));
        assert_eq!(interval.start, 1_700_000_000_000);
        assert_eq!(interval.end, i64::MAX);

        let interval = timeline_interval(&quake(-1e18, -1_700_000_000_000));
        assert_eq!(interval.end, i64::MIN);

        let interval = timeline_interval(&quake(f64::INFINITY, 0));
        assert_eq!(interval.end, i64::MAX);
    }

    #[test]
    fn legend_has_six_rows() {
        let entries = legend_entries();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0].label, "0\u{2013}1");
        assert_eq!(entries[0].color, MagnitudeColor::GreenYellow);
        assert_eq!(entries[4].color, MagnitudeColor::Orange);
        assert_eq!(entries[5].label, "5+");
        assert_eq!(entries[5].color, MagnitudeColor::Red);
    }
}
