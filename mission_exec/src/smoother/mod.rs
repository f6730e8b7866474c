//! # Path smoother module
//!
//! Turns the pathfinder's angular grid output into something a wheeled
//! vehicle can actually drive. Two independent transforms are provided:
//!
//! 1. [`Smoother::smooth`] densifies each waypoint pair into evenly spaced
//!    sub-points and bends the interior of each segment towards the turn,
//!    with a sine-bell weighting so segment endpoints stay fixed.
//! 2. [`Smoother::constrain`] enforces physical limits on a dense path,
//!    dropping points that make segments shorter than the minimum length and
//!    spreading turns that exceed the maximum turn rate over inserted arcs.
//!
//! A curvature estimator is also exposed for path-quality diagnostics.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use crate::geodesy::{self, GeoPoint};
use util::maths::lerp;

pub use params::Params;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Rough meters per degree of latitude, used only to scale the number of
/// interpolation points, not for any geodesic calculation.
const METERS_PER_DEGREE: f64 = 111_000.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The path smoother.
pub struct Smoother {
    params: Params,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Smoother {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Densify and smooth a waypoint sequence.
    ///
    /// Each consecutive pair is linearly interpolated into sub-points, with
    /// the count scaled by segment length over the configured resolution.
    /// Interior sub-points are then offset perpendicular to the local bearing
    /// by an amount proportional to the turn angle at the segment's vertices,
    /// attenuated by a sine bell so offsets vanish at segment endpoints. The
    /// first and last points of the whole path are never moved.
    pub fn smooth(&self, waypoints: &[GeoPoint]) -> Vec<GeoPoint> {
        if waypoints.len() < 2 || self.params.smoothing_factor <= 0.0 {
            return waypoints.to_vec();
        }

        let mut smooth_path: Vec<GeoPoint> = Vec::new();

        for i in 0..waypoints.len() - 1 {
            let current = waypoints[i];
            let next = waypoints[i + 1];

            let segment = self.interpolate_segment(current, next);

            // Skip the segment's first point after the first segment, it is
            // the same as the previous segment's last point
            let skip = if smooth_path.is_empty() { 0 } else { 1 };

            if i + 2 < waypoints.len() {
                let prev = if i > 0 { waypoints[i - 1] } else { current };
                let next_next = waypoints[i + 2];

                let bent = self.bend_segment(prev, current, next, next_next, segment);
                smooth_path.extend(bent.into_iter().skip(skip));
            } else {
                smooth_path.extend(segment.into_iter().skip(skip));
            }
        }

        debug!(
            "Smoothed path: {} waypoints -> {} points",
            waypoints.len(),
            smooth_path.len()
        );

        smooth_path
    }

    /// Filter a dense path against physical constraints.
    ///
    /// Points whose preceding segment is shorter than the minimum length are
    /// dropped. Where the turn rate between retained points exceeds the
    /// maximum, an arc of intermediate points spreads the turn over more
    /// distance. The first and last points are always retained.
    pub fn constrain(&self, points: &[GeoPoint]) -> Vec<GeoPoint> {
        if points.len() < 3 {
            return points.to_vec();
        }

        let mut constrained = vec![points[0]];

        for i in 1..points.len() - 1 {
            let prev = *constrained.last().unwrap();
            let current = points[i];
            let next = points[i + 1];

            let segment_length = geodesy::distance(prev, current);

            if segment_length < self.params.min_segment_length_m {
                continue;
            }

            if constrained.len() >= 2 {
                let before_prev = constrained[constrained.len() - 2];
                let turn_rate = turn_rate(before_prev, prev, current, segment_length);

                if turn_rate.abs() > self.params.max_turn_rate_deg_per_m {
                    let arc = self.turn_arc(prev, current, next);
                    constrained.extend(arc);
                    continue;
                }
            }

            constrained.push(current);
        }

        constrained.push(points[points.len() - 1]);

        debug!(
            "Constraint filtering: {} -> {} points",
            points.len(),
            constrained.len()
        );

        constrained
    }

    /// Signed curvature (1/radius, meters^-1) at each path point.
    ///
    /// Positive for right-hand turns, negative for left. The first and last
    /// points have zero curvature by convention.
    pub fn curvature(&self, points: &[GeoPoint]) -> Vec<f64> {
        if points.len() < 3 {
            return vec![0.0; points.len()];
        }

        let mut curvatures = vec![0.0];

        for i in 1..points.len() - 1 {
            curvatures.push(point_curvature(points[i - 1], points[i], points[i + 1]));
        }

        curvatures.push(0.0);

        curvatures
    }

    /// Evenly spaced linear interpolation between two points, endpoints
    /// included.
    fn interpolate_segment(&self, start: GeoPoint, end: GeoPoint) -> Vec<GeoPoint> {
        let distance = geodesy::distance(start, end);

        let num_points = ((distance / (self.params.resolution_deg * METERS_PER_DEGREE)) as usize)
            .max(2);

        (0..num_points)
            .map(|i| {
                let t = i as f64 / (num_points - 1) as f64;
                GeoPoint::new(
                    lerp(start.lat_deg, end.lat_deg, t),
                    lerp(start.lon_deg, end.lon_deg, t),
                )
            })
            .collect()
    }

    /// Offset a segment's interior points towards the turn at its vertices.
    fn bend_segment(
        &self,
        prev: GeoPoint,
        current: GeoPoint,
        next: GeoPoint,
        next_next: GeoPoint,
        segment: Vec<GeoPoint>,
    ) -> Vec<GeoPoint> {
        let bearing_in = geodesy::bearing(prev, current);
        let bearing_seg = geodesy::bearing(current, next);
        let bearing_out = geodesy::bearing(next, next_next);

        let turn_in = geodesy::normalize_angle(bearing_seg - bearing_in);
        let turn_out = geodesy::normalize_angle(bearing_out - bearing_seg);

        // Offset magnitude scales with how sharply the path turns at either
        // end of this segment
        let intensity =
            self.params.smoothing_factor * (turn_in.abs() + turn_out.abs()) / 360.0;
        let offset_deg = intensity * self.params.resolution_deg;

        let mid_bearing = geodesy::normalize_angle((bearing_in + bearing_seg) / 2.0);
        let perp_bearing = geodesy::normalize_angle(mid_bearing + 90.0);

        let offset_lat = offset_deg * perp_bearing.to_radians().cos();
        let offset_lon = offset_deg * perp_bearing.to_radians().sin();

        let last = segment.len() - 1;

        segment
            .into_iter()
            .enumerate()
            .map(|(i, point)| {
                if i == 0 || i == last {
                    return point;
                }

                // Sine bell: zero at segment endpoints, maximum at midpoint
                let t = i as f64 / last as f64;
                let bell = (t * std::f64::consts::PI).sin();

                GeoPoint::new(
                    point.lat_deg + offset_lat * bell,
                    point.lon_deg + offset_lon * bell,
                )
            })
            .collect()
    }

    /// Arc of intermediate points spreading a sharp turn at `current`.
    fn turn_arc(&self, prev: GeoPoint, current: GeoPoint, next: GeoPoint) -> Vec<GeoPoint> {
        let bearing_in = geodesy::bearing(prev, current);
        let bearing_out = geodesy::bearing(current, next);

        let turn_angle = geodesy::normalize_angle(bearing_out - bearing_in);

        if turn_angle.abs() < self.params.max_turn_rate_deg_per_m {
            return vec![current];
        }

        let num_points =
            ((turn_angle.abs() / self.params.max_turn_rate_deg_per_m) as usize).max(3);

        (0..num_points)
            .map(|i| {
                let t = i as f64 / (num_points - 1) as f64;
                let bearing = bearing_in + t * turn_angle;
                geodesy::offset(current, self.params.turn_arc_radius_m, bearing)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Turn rate in degrees per meter at `b`, given the approach through `a` and
/// the preceding segment length.
fn turn_rate(a: GeoPoint, b: GeoPoint, c: GeoPoint, segment_length_m: f64) -> f64 {
    if segment_length_m <= 0.0 {
        return 0.0;
    }

    let turn_angle = geodesy::normalize_angle(geodesy::bearing(b, c) - geodesy::bearing(a, b));

    turn_angle / segment_length_m
}

/// Signed curvature at `b` approximated from the turn angle over the average
/// of the adjoining segment lengths.
fn point_curvature(a: GeoPoint, b: GeoPoint, c: GeoPoint) -> f64 {
    let d1 = geodesy::distance(a, b);
    let d2 = geodesy::distance(b, c);

    if d1 == 0.0 || d2 == 0.0 {
        return 0.0;
    }

    let turn_angle = geodesy::normalize_angle(geodesy::bearing(b, c) - geodesy::bearing(a, b));

    turn_angle.to_radians() / ((d1 + d2) / 2.0)
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            smoothing_factor: 0.3,
            resolution_deg: 0.0001,
            max_turn_rate_deg_per_m: 45.0,
            min_segment_length_m: 1.0,
            turn_arc_radius_m: 10.0,
        }
    }

    #[test]
    fn test_smooth_preserves_endpoints() {
        let smoother = Smoother::new(test_params());
        let waypoints = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.001, 0.001),
            GeoPoint::new(0.0, 0.002),
        ];

        let path = smoother.smooth(&waypoints);

        assert_eq!(path[0], waypoints[0]);
        assert_eq!(*path.last().unwrap(), *waypoints.last().unwrap());
        assert!(path.len() > waypoints.len());
    }

    #[test]
    fn test_smooth_degenerate_inputs() {
        let smoother = Smoother::new(test_params());

        assert!(smoother.smooth(&[]).is_empty());

        let single = vec![GeoPoint::new(1.0, 1.0)];
        assert_eq!(smoother.smooth(&single), single);
    }

    #[test]
    fn test_smooth_disabled_by_zero_factor() {
        let mut params = test_params();
        params.smoothing_factor = 0.0;
        let smoother = Smoother::new(params);

        let waypoints = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.001, 0.001)];

        assert_eq!(smoother.smooth(&waypoints), waypoints);
    }

    #[test]
    fn test_straight_path_not_bent() {
        let smoother = Smoother::new(test_params());

        // Points due east along the equator, all turn angles are zero so no
        // point should move off the line
        let waypoints = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.0, 0.002),
            GeoPoint::new(0.0, 0.003),
        ];

        let path = smoother.smooth(&waypoints);

        for point in &path {
            assert!(point.lat_deg.abs() < 1e-9, "point off line: {}", point);
        }
    }

    #[test]
    fn test_constrain_drops_short_segments() {
        let smoother = Smoother::new(test_params());

        // Middle two points are well under the 1 m minimum from their
        // predecessors
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.000001),
            GeoPoint::new(0.0, 0.000002),
            GeoPoint::new(0.0, 0.001),
        ];

        let constrained = smoother.constrain(&points);

        assert_eq!(constrained.len(), 2);
        assert_eq!(constrained[0], points[0]);
        assert_eq!(constrained[1], points[3]);
    }

    #[test]
    fn test_constrain_keeps_endpoints() {
        let smoother = Smoother::new(test_params());
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0001, 0.0001),
            GeoPoint::new(0.0, 0.0002),
        ];

        let constrained = smoother.constrain(&points);

        assert_eq!(constrained[0], points[0]);
        assert_eq!(*constrained.last().unwrap(), *points.last().unwrap());
    }

    #[test]
    fn test_curvature_zero_at_ends_and_on_straights() {
        let smoother = Smoother::new(test_params());
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.0, 0.002),
        ];

        let curvatures = smoother.curvature(&points);

        assert_eq!(curvatures.len(), points.len());
        assert_eq!(curvatures[0], 0.0);
        assert_eq!(*curvatures.last().unwrap(), 0.0);
        assert!(curvatures[1].abs() < 1e-9);
    }

    #[test]
    fn test_curvature_sign_follows_turn_direction() {
        let smoother = Smoother::new(test_params());

        // Heading east then turning south is a right-hand turn
        let right_turn = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(-0.001, 0.001),
        ];

        // Heading east then turning north is a left-hand turn
        let left_turn = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.001, 0.001),
        ];

        assert!(smoother.curvature(&right_turn)[1] > 0.0);
        assert!(smoother.curvature(&left_turn)[1] < 0.0);
    }
}
