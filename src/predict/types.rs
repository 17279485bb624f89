use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::Display;

/// Rendering hint attached to markers and footprint vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MarkerColor {
    #[strum(serialize = "color=white")]
    White,
    #[strum(serialize = "color=blue")]
    Blue,
    #[strum(serialize = "color=yellow")]
    Yellow,
}

/// Illumination state reported by the server for a satellite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Visibility {
    /// `D`: sunlit
    Daylight,
    /// `N`: in eclipse
    Night,
    /// `V`: optically visible from the station
    Visible,
    Other(String),
}

impl Visibility {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "D" => Visibility::Daylight,
            "N" => Visibility::Night,
            "V" => Visibility::Visible,
            other => Visibility::Other(other.to_string()),
        }
    }

    pub fn color(&self) -> Option<MarkerColor> {
        match self {
            Visibility::Daylight => Some(MarkerColor::White),
            Visibility::Night => Some(MarkerColor::Blue),
            Visibility::Visible => Some(MarkerColor::Yellow),
            Visibility::Other(_) => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Daylight => f.write_str("D"),
            Visibility::Night => f.write_str("N"),
            Visibility::Visible => f.write_str("V"),
            Visibility::Other(code) => f.write_str(code),
        }
    }
}

/// Station position and callsign, longitude already in signed degrees east.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundStation {
    pub callsign: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

/// One satellite as reported by `GET_SAT`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatelliteObservation {
    pub name: String,
    /// Sub-satellite longitude as sent by the server (0..360, west positive).
    pub sub_longitude_west_deg: f64,
    /// Sub-satellite longitude in signed degrees east.
    pub sub_longitude_deg: f64,
    pub sub_latitude_deg: f64,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub next_event_time: i64,
    pub footprint_km: f64,
    /// Zero or negative when the server has no range for it.
    pub slant_range_km: f64,
    pub altitude_km: f64,
    pub velocity_km_s: f64,
    pub orbit_number: i64,
    pub visibility: Visibility,
    pub trailer: String,
}

impl SatelliteObservation {
    pub fn in_range(&self) -> bool {
        self.slant_range_km > 0.0
    }

    pub fn next_event(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.next_event_time, 0)
    }
}
