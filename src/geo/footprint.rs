use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::{convert_longitude, quadrant_arccos, EARTH_RADIUS_KM};
use crate::predict::{MarkerColor, Visibility};

const AZIMUTH_STEPS: u16 = 360;

/// One point on the boundary of a satellite footprint, in signed degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeCircleVertex {
    pub latitude: f64,
    pub longitude: f64,
    pub color: Option<MarkerColor>,
}

/// Walks the footprint boundary one azimuth degree at a time, 0..359.
///
/// The sub-satellite point is held in radians in the server's
/// west-positive convention; vertices come out converted.
#[derive(Debug, Clone)]
pub struct RangeCircle {
    sub_lat: f64,
    sub_long: f64,
    beta: f64,
    color: Option<MarkerColor>,
    azimuth: u16,
}

/// Footprint polygon around a sub-satellite point.
///
/// `sub_long_deg` is in the server's 0..360 west-positive convention.
/// Odd azimuth samples carry the visibility color when there is one.
pub fn range_circle(
    sub_lat_deg: f64,
    sub_long_deg: f64,
    footprint_km: f64,
    visibility: &Visibility,
) -> RangeCircle {
    RangeCircle {
        sub_lat: sub_lat_deg.to_radians(),
        sub_long: sub_long_deg.to_radians(),
        beta: 0.5 * footprint_km / EARTH_RADIUS_KM,
        color: visibility.color(),
        azimuth: 0,
    }
}

impl RangeCircle {
    /// Half-angle subtended by the footprint at the Earth's center, in radians.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    fn vertex(&self, azimuth: u16) -> RangeCircleVertex {
        let a = f64::from(azimuth).to_radians();
        let (sin_sub_lat, cos_sub_lat) = self.sub_lat.sin_cos();
        let (sin_beta, cos_beta) = self.beta.sin_cos();

        let range_lat = (sin_sub_lat * cos_beta + a.cos() * sin_beta * cos_sub_lat)
            .clamp(-1.0, 1.0)
            .asin();
        let num = cos_beta - sin_sub_lat * range_lat.sin();
        let den = cos_sub_lat * range_lat.cos();

        let range_long = if azimuth == 0 && self.beta > FRAC_PI_2 - self.sub_lat {
            // over the near pole
            self.sub_long + PI
        } else if azimuth == 180 && self.beta > FRAC_PI_2 + self.sub_lat {
            // over the far pole
            self.sub_long + PI
        } else if (num / den).abs() > 1.0 {
            self.sub_long
        } else if azimuth <= 180 {
            self.sub_long - quadrant_arccos(num, den)
        } else {
            self.sub_long + quadrant_arccos(num, den)
        };

        // Non-finite input stays NaN instead of looping.
        let mut range_long = range_long.rem_euclid(TAU);
        if range_long >= TAU {
            range_long = 0.0;
        }

        RangeCircleVertex {
            latitude: range_lat.to_degrees(),
            longitude: convert_longitude(range_long.to_degrees()),
            color: if azimuth % 2 == 1 { self.color } else { None },
        }
    }
}

impl Iterator for RangeCircle {
    type Item = RangeCircleVertex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.azimuth >= AZIMUTH_STEPS {
            return None;
        }
        let vertex = self.vertex(self.azimuth);
        self.azimuth += 1;
        Some(vertex)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(AZIMUTH_STEPS.saturating_sub(self.azimuth));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RangeCircle {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn footprint_for_beta(beta_deg: f64) -> f64 {
        2.0 * EARTH_RADIUS_KM * beta_deg.to_radians()
    }

    #[test]
    fn yields_one_vertex_per_degree() {
        let circle = range_circle(45.0, 100.0, 4000.0, &Visibility::Visible);
        assert_eq!(circle.len(), 360);
        assert_eq!(circle.count(), 360);
    }

    #[test]
    fn vertices_stay_on_the_globe() {
        let cases = [
            (0.0, 0.0, 500.0),
            (10.0, 100.0, 4000.0),
            (-60.0, 359.0, 6000.0),
            (85.0, 180.0, 5000.0),
            (-89.0, 20.0, 12000.0),
            (90.0, 45.0, 3000.0),
        ];
        for (lat, lon, footprint) in cases {
            for vertex in range_circle(lat, lon, footprint, &Visibility::Daylight) {
                assert!(
                    vertex.longitude > -180.0 && vertex.longitude <= 180.0,
                    "longitude {} for ({}, {}, {})",
                    vertex.longitude,
                    lat,
                    lon,
                    footprint
                );
                assert!(
                    (-90.0..=90.0).contains(&vertex.latitude),
                    "latitude {} for ({}, {}, {})",
                    vertex.latitude,
                    lat,
                    lon,
                    footprint
                );
            }
        }
    }

    #[test]
    fn odd_azimuths_carry_the_visibility_color() {
        let vertices: Vec<_> = range_circle(30.0, 200.0, 3000.0, &Visibility::Night).collect();
        for (azimuth, vertex) in vertices.iter().enumerate() {
            if azimuth % 2 == 1 {
                assert_eq!(vertex.color, Some(MarkerColor::Blue));
            } else {
                assert_eq!(vertex.color, None);
            }
        }
    }

    #[test]
    fn unknown_visibility_is_never_colored() {
        let other = Visibility::Other("X".to_string());
        assert!(range_circle(30.0, 200.0, 3000.0, &other).all(|v| v.color.is_none()));
    }

    #[test]
    fn small_footprint_at_origin_is_a_circle() {
        let footprint = 500.0;
        let beta_deg = (0.5 * footprint / EARTH_RADIUS_KM).to_degrees();
        let vertices: Vec<_> = range_circle(0.0, 0.0, footprint, &Visibility::Visible).collect();

        // due north
        assert_relative_eq!(vertices[0].latitude, beta_deg, epsilon = 1e-9);
        assert_relative_eq!(vertices[0].longitude, 0.0, epsilon = 1e-5);

        // due east
        assert_relative_eq!(vertices[90].latitude, 0.0, epsilon = 1e-9);
        assert_relative_eq!(vertices[90].longitude, beta_deg, epsilon = 1e-6);

        // due south and west
        assert_relative_eq!(vertices[180].latitude, -beta_deg, epsilon = 1e-9);
        assert_relative_eq!(vertices[270].longitude, -beta_deg, epsilon = 1e-6);
    }

    #[test]
    fn footprint_over_near_pole_flips_meridian() {
        let sub_long: f64 = 30.0;
        let circle = range_circle(80.0, sub_long, footprint_for_beta(20.0), &Visibility::Daylight);
        assert!(circle.beta() > FRAC_PI_2 - 80f64.to_radians());

        let north = circle.clone().next().map(|v| v.longitude);
        let expected = convert_longitude((sub_long.to_radians() + PI).to_degrees());
        assert_relative_eq!(north.unwrap_or(f64::NAN), expected, epsilon = 1e-9);
        assert_relative_eq!(expected, 150.0, epsilon = 1e-9);
    }

    #[test]
    fn footprint_over_far_pole_flips_meridian() {
        let sub_long: f64 = 300.0;
        let vertices: Vec<_> =
            range_circle(-80.0, sub_long, footprint_for_beta(20.0), &Visibility::Daylight)
                .collect();
        // 300 + 180 wraps once to 120 west, i.e. 120 east negated
        assert_relative_eq!(vertices[180].longitude, -120.0, epsilon = 1e-9);
    }

    #[test]
    fn unbounded_longitude_still_yields_every_vertex() {
        for sub_long in [1e20, f64::INFINITY, f64::NAN, -725.0] {
            let vertices: Vec<_> =
                range_circle(10.0, sub_long, 3000.0, &Visibility::Visible).collect();
            assert_eq!(vertices.len(), 360);
        }
        let wrapped: Vec<_> = range_circle(10.0, -725.0, 3000.0, &Visibility::Visible).collect();
        let direct: Vec<_> = range_circle(10.0, 355.0, 3000.0, &Visibility::Visible).collect();
        assert_relative_eq!(wrapped[90].longitude, direct[90].longitude, epsilon = 1e-6);
    }

    #[test]
    fn wraps_across_the_zero_meridian() {
        let vertices: Vec<_> = range_circle(0.0, 1.0, 1000.0, &Visibility::Visible).collect();
        let beta_deg = (0.5 * 1000.0 / EARTH_RADIUS_KM).to_degrees();
        // east of a point 1 degree west lands beyond the meridian
        assert_relative_eq!(vertices[90].longitude, beta_deg - 1.0, epsilon = 1e-6);
        assert_relative_eq!(vertices[270].longitude, -1.0 - beta_deg, epsilon = 1e-6);
    }
}
