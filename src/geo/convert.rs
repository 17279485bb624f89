use std::f64::consts::PI;

/// Converts a longitude from the server's 0..360 west-positive convention
/// to signed degrees east in (-180, 180].
///
/// Inputs are expected to already lie in [0, 360); nothing is normalized.
pub fn convert_longitude(longitude: f64) -> f64 {
    if longitude < 180.0 {
        -longitude
    } else {
        360.0 - longitude
    }
}

/// Arccosine of `numerator / denominator` that keeps the sign of the
/// denominator, similar to what `atan2` does for the tangent.
///
/// Returns `acos` for a positive denominator, `PI + acos` for a negative
/// one and 0 when the denominator is zero.
pub fn quadrant_arccos(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        (numerator / denominator).acos()
    } else if denominator < 0.0 {
        PI + (numerator / denominator).acos()
    } else {
        0.0
    }
}
