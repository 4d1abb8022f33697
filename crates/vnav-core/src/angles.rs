//! Flight path angle math.
//!
//! Angles are in degrees with descent positive; distances and altitudes share
//! one linear unit (meters throughout the engine).

pub const METERS_PER_FOOT: f64 = 0.3048;

pub fn feet_to_meters(feet: f64) -> f64 {
    feet * METERS_PER_FOOT
}

pub fn meters_to_feet(meters: f64) -> f64 {
    meters / METERS_PER_FOOT
}

/// Angle needed to change altitude by `altitude_delta` over `distance`.
pub fn fpa_for_distance(distance: f64, altitude_delta: f64) -> f64 {
    (altitude_delta / distance).atan().to_degrees()
}

/// Altitude change produced by flying `distance` at `fpa_deg`.
pub fn altitude_for_distance(fpa_deg: f64, distance: f64) -> f64 {
    fpa_deg.to_radians().tan() * distance
}

/// Round to one decimal place, the precision restrictions are compared at.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fpa_and_altitude_are_inverse() {
        let distance = 10_000.0;
        let fpa = fpa_for_distance(distance, 524.08);
        assert!((fpa - 3.0).abs() < 0.001);
        assert!((altitude_for_distance(fpa, distance) - 524.08).abs() < 1e-6);
    }

    #[test]
    fn zero_distance_is_vertical() {
        assert!((fpa_for_distance(0.0, 100.0) - 90.0).abs() < 1e-9);
        assert!(fpa_for_distance(0.0, 0.0).is_nan());
    }

    #[test]
    fn tenth_rounding_matches_restriction_precision() {
        assert_eq!(round_to_tenth(1524.04), 1524.0);
        assert_eq!(round_to_tenth(1524.06), 1524.1);
        assert!(round_to_tenth(f64::INFINITY).is_infinite());
    }

    #[test]
    fn feet_conversion() {
        assert!((feet_to_meters(10_000.0) - 3048.0).abs() < 1e-9);
        assert!((meters_to_feet(3048.0) - 10_000.0).abs() < 1e-9);
    }
}
