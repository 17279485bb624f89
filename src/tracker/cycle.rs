use super::error::TrackerError;
use super::overlay::{Footprint, Marker, Overlay};
use super::session::TrackingSession;
use crate::predict::{GroundStation, Predict, SatelliteObservation};

/// Satellites whose next event is closer than this get a footprint even below the horizon.
const LOOKAHEAD_SECS: i64 = 300;

/// Result of one successful poll cycle.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub session: TrackingSession,
    pub station: GroundStation,
    pub satellites: Vec<SatelliteObservation>,
    pub overlay: Overlay,
}

/// Queries station, satellite list and every satellite, and derives the overlay.
///
/// Any failed request fails the whole cycle; `session` is left untouched then.
pub fn run_cycle<P: Predict>(
    client: &P,
    session: &TrackingSession,
) -> Result<CycleOutcome, TrackerError> {
    let station = client.get_qth()?;
    let mut session = session.clone();
    session.begin_cycle(&station);

    let names = client.get_list()?;
    if names.is_empty() {
        return Err(TrackerError::EmptySatelliteList);
    }

    let mut overlay = Overlay::new(Marker::station(&station));
    let mut satellites = Vec::with_capacity(names.len());

    for name in &names {
        let sat = client.get_sat(name)?;
        log::debug!(
            "{}: lat={} lon={} az={} el={} next={} footprint={} range={} alt={} vel={} orbit={} vis={}",
            sat.name,
            sat.sub_latitude_deg,
            sat.sub_longitude_deg,
            sat.azimuth_deg,
            sat.elevation_deg,
            sat.next_event()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| sat.next_event_time.to_string()),
            sat.footprint_km,
            sat.slant_range_km,
            sat.altitude_km,
            sat.velocity_km_s,
            sat.orbit_number,
            sat.visibility
        );

        if sat.in_range() {
            if session.is_tracking(&sat.name) {
                session.center_on(&sat);
                overlay.add_footprint(Footprint::of(&sat));
            } else if !session.zoom_enabled {
                let now = client.get_time()?;
                if sat.elevation_deg >= 0.0 || sat.next_event_time - now < LOOKAHEAD_SECS {
                    overlay.add_footprint(Footprint::of(&sat));
                }
            }
            overlay.add_marker(Marker::satellite(&sat));
        }

        satellites.push(sat);
    }

    session.circle_drawn = overlay.has_footprints();

    Ok(CycleOutcome {
        session,
        station,
        satellites,
        overlay,
    })
}
