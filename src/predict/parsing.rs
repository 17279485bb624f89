use std::str::FromStr;

use super::error::PredictError;
use super::types::{GroundStation, SatelliteObservation, Visibility};
use crate::geo::convert_longitude;

const QTH_FIELDS: usize = 4;
const SAT_FIELDS: usize = 13;

pub fn parse_qth(reply: &str) -> Result<GroundStation, PredictError> {
    let fields: Vec<&str> = reply.splitn(QTH_FIELDS, '\n').collect();
    if fields.len() < QTH_FIELDS {
        return Err(PredictError::Arity {
            command: "GET_QTH".into(),
            expected: QTH_FIELDS,
            found: fields.len(),
        });
    }

    Ok(GroundStation {
        callsign: fields[0].to_string(),
        latitude_deg: number("latitude", fields[1])?,
        longitude_deg: convert_longitude(west_longitude("longitude", fields[2])?),
    })
}

/// Satellite names in server order, blank lines dropped.
pub fn parse_list(reply: &str) -> Vec<String> {
    reply
        .split('\n')
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

pub fn parse_sat(reply: &str) -> Result<SatelliteObservation, PredictError> {
    let fields: Vec<&str> = reply.splitn(SAT_FIELDS, '\n').collect();
    if fields.len() < SAT_FIELDS {
        return Err(PredictError::Arity {
            command: "GET_SAT".into(),
            expected: SAT_FIELDS,
            found: fields.len(),
        });
    }

    let sub_longitude_west_deg = west_longitude("sub-satellite longitude", fields[1])?;

    Ok(SatelliteObservation {
        name: fields[0].to_string(),
        sub_longitude_west_deg,
        sub_longitude_deg: convert_longitude(sub_longitude_west_deg),
        sub_latitude_deg: number("sub-satellite latitude", fields[2])?,
        azimuth_deg: number("azimuth", fields[3])?,
        elevation_deg: number("elevation", fields[4])?,
        next_event_time: number("next event time", fields[5])?,
        footprint_km: number("footprint", fields[6])?,
        slant_range_km: number("slant range", fields[7])?,
        altitude_km: number("altitude", fields[8])?,
        velocity_km_s: number("velocity", fields[9])?,
        orbit_number: number("orbit number", fields[10])?,
        visibility: Visibility::from_code(fields[11]),
        trailer: fields[12].to_string(),
    })
}

pub fn parse_time(reply: &str) -> Result<i64, PredictError> {
    number("server time", reply)
}

fn number<T: FromStr>(field: &'static str, value: &str) -> Result<T, PredictError> {
    value.trim().parse().map_err(|_| PredictError::Field {
        field,
        value: value.to_string(),
    })
}

/// Server longitudes are west-positive degrees in [0, 360).
fn west_longitude(field: &'static str, value: &str) -> Result<f64, PredictError> {
    let longitude: f64 = number(field, value)?;
    if !(0.0..360.0).contains(&longitude) {
        return Err(PredictError::Field {
            field,
            value: value.to_string(),
        });
    }
    Ok(longitude)
}
