//! Orbital-to-absolute coordinate conversion and distance math.
//! Pure functions, no state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Rounded to the two fractional digits the decimal columns store.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            x: round_decimal(self.x),
            y: round_decimal(self.y),
            z: round_decimal(self.z),
        }
    }

    /// True when every axis differs by at most `tolerance`.
    pub fn approx_eq(self, other: Point3, tolerance: f64) -> bool {
        // Slack absorbs the representation error of two-digit decimals.
        let limit = tolerance + 1e-9;
        (self.x - other.x).abs() <= limit
            && (self.y - other.y).abs() <= limit
            && (self.z - other.z).abs() <= limit
    }
}

/// Position of a body relative to its system origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    pub distance: f64,
    pub angle_deg: f64,
    pub inclination_deg: f64,
}

impl Orbit {
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            distance: round_decimal(self.distance),
            angle_deg: round_decimal(self.angle_deg),
            inclination_deg: round_decimal(self.inclination_deg),
        }
    }
}

/// Round half away from zero to two fractional digits.
pub fn round_decimal(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Absolute position of a body at (`distance`, `angle_deg`, `inclination_deg`)
/// around `origin`.
pub fn to_absolute(origin: Point3, distance: f64, angle_deg: f64, inclination_deg: f64) -> Point3 {
    let angle = angle_deg.to_radians();
    let inclination = inclination_deg.to_radians();
    Point3 {
        x: origin.x + distance * angle.cos(),
        y: origin.y + distance * angle.sin() * inclination.cos(),
        z: origin.z + distance * angle.sin() * inclination.sin(),
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point3, b: Point3) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Stored (rounded) absolute position of a body on `orbit` around `origin`.
///
/// Generation and repair both go through this, so a freshly repaired planet
/// compares equal to what the next scan derives.
pub fn orbit_position(origin: Point3, orbit: Orbit) -> Point3 {
    to_absolute(origin, orbit.distance, orbit.angle_deg, orbit.inclination_deg).rounded()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Point3, expected: Point3) {
        assert!(
            actual.approx_eq(expected, 1e-6),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn zero_angle_lies_on_x_axis() {
        let p = to_absolute(Point3::ORIGIN, 10.0, 0.0, 45.0);
        assert_close(p, Point3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn right_angle_without_inclination_lies_on_y_axis() {
        let p = to_absolute(Point3::ORIGIN, 10.0, 90.0, 0.0);
        assert_close(p, Point3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn full_inclination_tilts_into_z() {
        let p = to_absolute(Point3::ORIGIN, 10.0, 90.0, 90.0);
        assert_close(p, Point3::new(0.0, 0.0, 10.0));
        let q = to_absolute(Point3::ORIGIN, 10.0, 90.0, -90.0);
        assert_close(q, Point3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn offset_by_origin() {
        let origin = Point3::new(100.0, 100.0, 100.0);
        let p = to_absolute(origin, 5.0, 180.0, 0.0);
        assert_close(p, Point3::new(95.0, 100.0, 100.0));
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 12.0);
        assert!((distance(a, b) - 13.0).abs() < 1e-12);
        assert!((distance(b, a) - 13.0).abs() < 1e-12);
        assert!(distance(b, b).abs() < 1e-12);
    }

    #[test]
    fn round_decimal_keeps_two_digits() {
        assert!((round_decimal(1.236) - 1.24).abs() < 1e-12);
        assert!((round_decimal(-1.236) + 1.24).abs() < 1e-12);
        assert!((round_decimal(42.0) - 42.0).abs() < 1e-12);
    }

    #[test]
    fn orbit_position_is_rounded() {
        let origin = Point3::new(1.111, 2.222, 3.333);
        let p = orbit_position(
            origin,
            Orbit {
                distance: 7.0,
                angle_deg: 33.0,
                inclination_deg: 12.0,
            },
        );
        assert_close(p, p.rounded());
    }

    #[test]
    fn approx_eq_respects_tolerance() {
        let a = Point3::new(1.0, 1.0, 1.0);
        assert!(a.approx_eq(Point3::new(1.01, 0.99, 1.0), 0.01));
        assert!(!a.approx_eq(Point3::new(1.02, 1.0, 1.0), 0.01));
    }
}
