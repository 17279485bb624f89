use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use super::overlay::OverlayPaths;
use crate::geo::EARTH_RADIUS_KM;
use crate::predict::{GroundStation, SatelliteObservation};
use crate::render::Renderer;

pub const MIN_CIRCLE_RADIUS: u32 = 50;
const DEFAULT_INTERVAL_SECS: u64 = 20;
const INTERVAL_RANGE: RangeInclusive<u64> = 5..=120;

/// Seconds between renderer invocations; 5..=120, otherwise 20.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateInterval(u64);

impl UpdateInterval {
    pub fn clamped(secs: u64) -> Self {
        if INTERVAL_RANGE.contains(&secs) {
            Self(secs)
        } else {
            Self(DEFAULT_INTERVAL_SECS)
        }
    }

    pub fn secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for UpdateInterval {
    fn default() -> Self {
        Self(DEFAULT_INTERVAL_SECS)
    }
}

/// Everything the poll loop needs, already validated.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub host: String,
    pub service: String,
    pub track: Option<String>,
    pub zoom: bool,
    pub interval: UpdateInterval,
    pub renderer: Renderer,
    pub extra: String,
    pub render: bool,
    pub once: bool,
    pub paths: OverlayPaths,
    pub global_config: PathBuf,
}

/// Map state carried from one poll cycle to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSession {
    pub tracked_name: Option<String>,
    pub zoom_enabled: bool,
    pub map_center_latitude: f64,
    pub map_center_longitude: f64,
    pub circle_radius: u32,
    pub circle_drawn: bool,
    pub update_interval: UpdateInterval,
}

impl TrackingSession {
    pub fn new(tracked_name: Option<String>, zoom_enabled: bool, interval: UpdateInterval) -> Self {
        Self {
            tracked_name: tracked_name.filter(|name| !name.is_empty()),
            zoom_enabled,
            map_center_latitude: 0.0,
            map_center_longitude: 0.0,
            circle_radius: MIN_CIRCLE_RADIUS,
            circle_drawn: false,
            update_interval: interval,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.track.clone(), config.zoom, config.interval)
    }

    pub fn is_tracking(&self, name: &str) -> bool {
        self.tracked_name.as_deref() == Some(name)
    }

    pub(super) fn begin_cycle(&mut self, station: &GroundStation) {
        self.map_center_latitude = station.latitude_deg;
        self.map_center_longitude = station.longitude_deg;
        self.circle_radius = MIN_CIRCLE_RADIUS;
        self.circle_drawn = false;
    }

    pub(super) fn center_on(&mut self, sat: &SatelliteObservation) {
        self.map_center_latitude = sat.sub_latitude_deg;
        self.map_center_longitude = sat.sub_longitude_deg;
        self.circle_radius = if self.zoom_enabled {
            zoom_radius(sat.footprint_km)
        } else {
            MIN_CIRCLE_RADIUS
        };
    }
}

/// Renderer radius that keeps a footprint filling the view.
pub fn zoom_radius(footprint_km: f64) -> u32 {
    if footprint_km <= 0.0 {
        return MIN_CIRCLE_RADIUS;
    }
    let radius = (100.0 * EARTH_RADIUS_KM / footprint_km).round();
    (radius as u32).max(MIN_CIRCLE_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_outside_range_falls_back_to_default() {
        assert_eq!(UpdateInterval::clamped(4).secs(), 20);
        assert_eq!(UpdateInterval::clamped(5).secs(), 5);
        assert_eq!(UpdateInterval::clamped(120).secs(), 120);
        assert_eq!(UpdateInterval::clamped(121).secs(), 20);
        assert_eq!(UpdateInterval::clamped(0).secs(), 20);
        assert_eq!(UpdateInterval::default().as_duration(), Duration::from_secs(20));
    }

    #[test]
    fn zoom_radius_never_drops_below_minimum() {
        assert_eq!(zoom_radius(4000.0), 159);
        assert_eq!(zoom_radius(20000.0), MIN_CIRCLE_RADIUS);
        assert_eq!(zoom_radius(0.0), MIN_CIRCLE_RADIUS);
    }

    #[test]
    fn empty_track_name_means_none() {
        let session = TrackingSession::new(Some(String::new()), false, UpdateInterval::default());
        assert_eq!(session.tracked_name, None);
        assert!(!session.is_tracking(""));
    }
}
