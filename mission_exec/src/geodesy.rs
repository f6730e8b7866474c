//! # Geodesy utilities
//!
//! Stateless great-circle maths on a spherical earth model. All angles at the
//! public interface are in decimal degrees, all distances in meters. Every
//! other module in this library builds on these functions.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point on the earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees, positive north, in [-90, 90].
    pub lat_deg: f64,

    /// Longitude in decimal degrees, positive east, in [-180, 180].
    pub lon_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GeoPoint {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat_deg, self.lon_deg)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Great-circle distance between two points in meters (haversine formula).
///
/// Symmetric in its arguments, and zero iff the points are equal.
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat_deg.to_radians();
    let lat_b = b.lat_deg.to_radians();
    let dlat = (b.lat_deg - a.lat_deg).to_radians();
    let dlon = (b.lon_deg - a.lon_deg).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Initial bearing from `a` to `b` in degrees clockwise from true north,
/// in [0, 360).
///
/// When `a == b` the bearing is undefined; zero is returned.
pub fn bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat_deg.to_radians();
    let lat_b = b.lat_deg.to_radians();
    let dlon = (b.lon_deg - a.lon_deg).to_radians();

    let y = dlon.sin() * lat_b.cos();
    let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * dlon.cos();

    let bearing_deg = y.atan2(x).to_degrees();

    (bearing_deg + 360.0) % 360.0
}

/// Normalise an angle in degrees into the range (-180, 180].
pub fn normalize_angle(angle_deg: f64) -> f64 {
    let mut angle = angle_deg % 360.0;
    if angle > 180.0 {
        angle -= 360.0;
    } else if angle <= -180.0 {
        angle += 360.0;
    }
    angle
}

/// The destination point reached by travelling `distance_m` meters from
/// `point` along the given initial bearing.
///
/// Inverse of [`distance`]/[`bearing`] to within numerical tolerance for
/// short (< 10 km) distances.
pub fn offset(point: GeoPoint, distance_m: f64, bearing_deg: f64) -> GeoPoint {
    let lat = point.lat_deg.to_radians();
    let lon = point.lon_deg.to_radians();
    let brg = bearing_deg.to_radians();
    let ang = distance_m / EARTH_RADIUS_M;

    let new_lat = (lat.sin() * ang.cos() + lat.cos() * ang.sin() * brg.cos()).asin();

    let new_lon = lon
        + (brg.sin() * ang.sin() * lat.cos()).atan2(ang.cos() - lat.sin() * new_lat.sin());

    GeoPoint::new(new_lat.to_degrees(), new_lon.to_degrees())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_distance_symmetry_and_identity() {
        let a = GeoPoint::new(51.5074, -0.1278);
        let b = GeoPoint::new(48.8566, 2.3522);

        assert_eq!(distance(a, b), distance(b, a));
        assert_eq!(distance(a, a), 0.0);

        // London to Paris is roughly 344 km
        let d = distance(a, b);
        assert!((d - 344_000.0).abs() < 5_000.0, "got {}", d);
    }

    #[test]
    fn test_distance_short_segment() {
        // 0.001 deg of longitude at the equator is about 111.3 m
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 0.001);

        let d = distance(a, b);
        assert!((d - 111.3).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_bearing_cardinals() {
        let origin = GeoPoint::new(0.0, 0.0);

        assert!((bearing(origin, GeoPoint::new(1.0, 0.0)) - 0.0).abs() < 1e-6);
        assert!((bearing(origin, GeoPoint::new(0.0, 1.0)) - 90.0).abs() < 1e-6);
        assert!((bearing(origin, GeoPoint::new(-1.0, 0.0)) - 180.0).abs() < 1e-6);
        assert!((bearing(origin, GeoPoint::new(0.0, -1.0)) - 270.0).abs() < 1e-6);

        // Coincident points must not panic, convention is zero
        assert_eq!(bearing(origin, origin), 0.0);
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(180.0), 180.0);
        assert_eq!(normalize_angle(-180.0), 180.0);
        assert_eq!(normalize_angle(190.0), -170.0);
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(-190.0), 170.0);
        assert_eq!(normalize_angle(720.0 + 45.0), 45.0);
    }

    #[test]
    fn test_offset_round_trip() {
        let start = GeoPoint::new(52.2053, 0.1218);

        for &(dist, brg) in &[(10.0, 0.0), (500.0, 45.0), (5_000.0, 137.5), (9_999.0, 270.0)] {
            let dest = offset(start, dist, brg);

            assert!((distance(start, dest) - dist).abs() < 0.01 * dist.max(1.0));
            assert!((normalize_angle(bearing(start, dest) - brg)).abs() < 0.1);
        }
    }
}
