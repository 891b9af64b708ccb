//! Angle utilities: axis folding and compass conversions.
//!
//! Image space is x right, y down, with north at the top of the image, so a
//! compass bearing of 0° points to decreasing `y` and 90° to increasing `x`.

use std::f64::consts::PI;

/// Normalizes an angle into the range [0, π). Lines and rectangle axes are
/// π-periodic.
#[inline]
pub fn normalize_half_pi(angle: f64) -> f64 {
    let norm = angle.rem_euclid(PI);
    if norm >= PI - 1e-9 {
        0.0
    } else {
        norm
    }
}

/// Normalizes degrees into [0, 360).
#[inline]
pub fn normalize_compass_deg(deg: f64) -> f64 {
    let norm = deg.rem_euclid(360.0);
    if norm >= 360.0 - 1e-9 {
        0.0
    } else {
        norm
    }
}

/// Smallest unsigned difference between two bearings, in [0, 180].
#[inline]
pub fn compass_deviation_deg(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Compass bearing (degrees, [0, 360)) of an image-space direction.
#[inline]
pub fn bearing_of_direction(dx: f64, dy: f64) -> f64 {
    normalize_compass_deg(dx.atan2(-dy).to_degrees())
}

/// Compass bearing of an undirected axis given by its image-space angle
/// (`atan2(dy, dx)`), folded into [0, 180).
#[inline]
pub fn axis_bearing_deg(image_angle: f64) -> f64 {
    let bearing = bearing_of_direction(image_angle.cos(), image_angle.sin());
    let folded = bearing.rem_euclid(180.0);
    if folded >= 180.0 - 1e-9 {
        0.0
    } else {
        folded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn normalize_half_pi_basic() {
        assert!(approx_eq(normalize_half_pi(0.5), 0.5));
        assert!(approx_eq(
            normalize_half_pi(-std::f64::consts::FRAC_PI_4),
            3.0 * std::f64::consts::FRAC_PI_4
        ));
        assert!(approx_eq(normalize_half_pi(PI), 0.0));
    }

    #[test]
    fn compass_deviation_wraps() {
        assert!(approx_eq(compass_deviation_deg(350.0, 10.0), 20.0));
        assert!(approx_eq(compass_deviation_deg(0.0, 180.0), 180.0));
        assert!(approx_eq(compass_deviation_deg(-90.0, 270.0), 0.0));
    }

    #[test]
    fn bearings_follow_image_axes() {
        assert!(approx_eq(bearing_of_direction(0.0, -1.0), 0.0));
        assert!(approx_eq(bearing_of_direction(1.0, 0.0), 90.0));
        assert!(approx_eq(bearing_of_direction(0.0, 1.0), 180.0));
        assert!(approx_eq(bearing_of_direction(-1.0, 0.0), 270.0));
    }

    #[test]
    fn axis_bearing_folds_antipodes() {
        // Horizontal axis is east-west, vertical axis is north-south.
        assert!(approx_eq(axis_bearing_deg(0.0), 90.0));
        assert!(approx_eq(axis_bearing_deg(PI), 90.0));
        assert!(approx_eq(axis_bearing_deg(std::f64::consts::FRAC_PI_2), 0.0));
        assert!(approx_eq(axis_bearing_deg(-std::f64::consts::FRAC_PI_4), 45.0));
    }
}
