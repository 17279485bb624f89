mod convert;
mod footprint;

pub use convert::{convert_longitude, quadrant_arccos};
pub use footprint::{range_circle, RangeCircleVertex};

/// Earth radius used for footprint geometry, in km.
pub const EARTH_RADIUS_KM: f64 = 6378.16;
