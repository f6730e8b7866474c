//! # Trajectory tracking module
//!
//! Trajectory tracking keeps the vehicle on the planned path. Given a live
//! position and an active path segment it produces the two error signals the
//! guidance loop runs on:
//!
//! - the cross-track error, the signed perpendicular distance from the
//!   vehicle to the segment's extended line (positive right of path), and
//! - the heading error between the vehicle's heading and the bearing to a
//!   look-ahead point further down the path.
//!
//! Steering demands are produced with the pure pursuit algorithm. The module
//! also exposes along-track and whole-path progress calculations used by the
//! mission orchestrator.
//!
//! All functions here are pure. The tracker owns no mission state, only its
//! tolerance parameters.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::geodesy::{self, GeoPoint};
use util::maths::clamp;

pub use params::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The trajectory tracker.
pub struct TrajCtrl {
    params: Params,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajCtrl {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Signed perpendicular distance in meters from `position` to the
    /// extended line through the segment.
    ///
    /// Positive means right of the path, negative left, looking along the
    /// direction of travel.
    pub fn cross_track_error(
        &self,
        position: GeoPoint,
        seg_start: GeoPoint,
        seg_end: GeoPoint,
    ) -> f64 {
        let dist_to_start = geodesy::distance(seg_start, position);
        let bearing_to_pos = geodesy::bearing(seg_start, position);
        let path_bearing = geodesy::bearing(seg_start, seg_end);

        let angle_diff = geodesy::normalize_angle(bearing_to_pos - path_bearing);

        dist_to_start * angle_diff.to_radians().sin()
    }

    /// Distance in meters travelled along the segment's direction, projected
    /// from `position`. Negative if the vehicle is behind the segment start.
    pub fn along_track_distance(
        &self,
        position: GeoPoint,
        seg_start: GeoPoint,
        seg_end: GeoPoint,
    ) -> f64 {
        let dist_to_start = geodesy::distance(seg_start, position);
        let bearing_to_pos = geodesy::bearing(seg_start, position);
        let path_bearing = geodesy::bearing(seg_start, seg_end);

        let angle_diff = geodesy::normalize_angle(bearing_to_pos - path_bearing);

        dist_to_start * angle_diff.to_radians().cos()
    }

    /// Pure pursuit steering angle in degrees towards `target`, signed like
    /// the heading error (positive = steer right).
    pub fn pure_pursuit_steering(
        &self,
        position: GeoPoint,
        heading_deg: f64,
        target: GeoPoint,
    ) -> f64 {
        let distance = geodesy::distance(position, target);
        let bearing_to_target = geodesy::bearing(position, target);

        let heading_error = geodesy::normalize_angle(bearing_to_target - heading_deg);

        // Stretch the look-ahead out to the target if it is beyond the
        // configured distance, the chord ratio must stay <= 1
        let look_ahead = self.params.look_ahead_m.max(distance);

        if look_ahead <= 0.0 {
            return 0.0;
        }

        let ratio = clamp(
            heading_error.to_radians().sin().abs() * distance / look_ahead,
            0.0,
            1.0,
        );

        let steering = (2.0 * ratio.asin()).to_degrees();

        if heading_error < 0.0 {
            -steering
        } else {
            steering
        }
    }

    /// The first path point at or beyond the look-ahead distance, scanning
    /// forward from the point closest to the vehicle.
    ///
    /// Falls back to the final path point when no point is far enough ahead,
    /// and `None` only for an empty path.
    pub fn find_look_ahead_point(
        &self,
        position: GeoPoint,
        path_points: &[GeoPoint],
    ) -> Option<GeoPoint> {
        if path_points.is_empty() {
            return None;
        }

        let mut closest_idx = 0;
        let mut min_distance = f64::INFINITY;

        for (i, &point) in path_points.iter().enumerate() {
            let distance = geodesy::distance(position, point);
            if distance < min_distance {
                min_distance = distance;
                closest_idx = i;
            }
        }

        for &point in &path_points[closest_idx..] {
            if geodesy::distance(position, point) >= self.params.look_ahead_m {
                return Some(point);
            }
        }

        path_points.last().copied()
    }

    /// Heading correction in degrees, with a deadband below the heading
    /// tolerance to avoid oscillation around the setpoint.
    pub fn heading_correction(&self, current_heading_deg: f64, desired_heading_deg: f64) -> f64 {
        let heading_error = geodesy::normalize_angle(desired_heading_deg - current_heading_deg);

        if heading_error.abs() < self.params.heading_tolerance_deg {
            0.0
        } else {
            heading_error
        }
    }

    /// True if both error signals are within their configured tolerances.
    pub fn is_on_track(&self, cross_track_error_m: f64, heading_error_deg: f64) -> bool {
        cross_track_error_m.abs() <= self.params.cross_track_tolerance_m
            && heading_error_deg.abs() <= self.params.heading_tolerance_deg
    }

    /// Minimum distance in meters from `position` to the segment itself (not
    /// its extended line).
    pub fn point_to_segment_distance(
        &self,
        position: GeoPoint,
        seg_start: GeoPoint,
        seg_end: GeoPoint,
    ) -> f64 {
        let along_track = self.along_track_distance(position, seg_start, seg_end);
        let segment_length = geodesy::distance(seg_start, seg_end);

        if along_track < 0.0 {
            geodesy::distance(position, seg_start)
        } else if along_track > segment_length {
            geodesy::distance(position, seg_end)
        } else {
            self.cross_track_error(position, seg_start, seg_end).abs()
        }
    }

    /// Progress along a dense path as a percentage in [0, 100], plus the
    /// index of the closest path segment.
    ///
    /// Progress is the length of all segments before the closest one plus the
    /// along-track projection within it, over the total path length.
    pub fn path_progress(&self, position: GeoPoint, path_points: &[GeoPoint]) -> (f64, usize) {
        if path_points.len() < 2 {
            return (0.0, 0);
        }

        let mut min_distance = f64::INFINITY;
        let mut closest_segment = 0;

        for i in 0..path_points.len() - 1 {
            let distance =
                self.point_to_segment_distance(position, path_points[i], path_points[i + 1]);

            if distance < min_distance {
                min_distance = distance;
                closest_segment = i;
            }
        }

        let total_length: f64 = path_points
            .windows(2)
            .map(|p| geodesy::distance(p[0], p[1]))
            .sum();

        if total_length <= 0.0 {
            return (0.0, closest_segment);
        }

        let mut travelled: f64 = path_points[..=closest_segment]
            .windows(2)
            .map(|p| geodesy::distance(p[0], p[1]))
            .sum();

        let along_track = self.along_track_distance(
            position,
            path_points[closest_segment],
            path_points[closest_segment + 1],
        );
        travelled += along_track.max(0.0);

        let progress = clamp(travelled / total_length * 100.0, 0.0, 100.0);

        (progress, closest_segment)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geodesy::offset;

    fn test_tracker() -> TrajCtrl {
        TrajCtrl::new(Params {
            look_ahead_m: 3.0,
            cross_track_tolerance_m: 1.0,
            heading_tolerance_deg: 5.0,
        })
    }

    #[test]
    fn test_cross_track_sign_convention() {
        let tc = test_tracker();

        // Segment running due north
        let start = GeoPoint::new(0.0, 0.0);
        let end = GeoPoint::new(0.01, 0.0);
        let mid = GeoPoint::new(0.005, 0.0);

        // 3 m due east of the path midpoint is right of path, so positive
        let east = offset(mid, 3.0, 90.0);
        let cte = tc.cross_track_error(east, start, end);
        assert!((cte - 3.0).abs() < 0.1, "got {}", cte);

        // 3 m due west is left of path, so negative
        let west = offset(mid, 3.0, 270.0);
        let cte = tc.cross_track_error(west, start, end);
        assert!((cte + 3.0).abs() < 0.1, "got {}", cte);

        // On the line it is zero
        let cte = tc.cross_track_error(mid, start, end);
        assert!(cte.abs() < 0.01, "got {}", cte);
    }

    #[test]
    fn test_along_track_distance() {
        let tc = test_tracker();

        let start = GeoPoint::new(0.0, 0.0);
        let end = GeoPoint::new(0.0, 0.01);

        // 100 m along the segment
        let ahead = offset(start, 100.0, 90.0);
        let at = tc.along_track_distance(ahead, start, end);
        assert!((at - 100.0).abs() < 0.5, "got {}", at);

        // Behind the start the projection is negative
        let behind = offset(start, 50.0, 270.0);
        let at = tc.along_track_distance(behind, start, end);
        assert!((at + 50.0).abs() < 0.5, "got {}", at);
    }

    #[test]
    fn test_pure_pursuit_steering_sign_and_range() {
        let tc = test_tracker();
        let position = GeoPoint::new(0.0, 0.0);

        // Target dead ahead gives no steering
        let ahead = offset(position, 10.0, 0.0);
        let steer = tc.pure_pursuit_steering(position, 0.0, ahead);
        assert!(steer.abs() < 0.1, "got {}", steer);

        // Target to the right steers right, to the left steers left
        let right = offset(position, 10.0, 45.0);
        assert!(tc.pure_pursuit_steering(position, 0.0, right) > 0.0);

        let left = offset(position, 10.0, 315.0);
        assert!(tc.pure_pursuit_steering(position, 0.0, left) < 0.0);

        // asin clamp bounds the output to [-180, 180]
        let beside = offset(position, 100.0, 90.0);
        let steer = tc.pure_pursuit_steering(position, 0.0, beside);
        assert!(steer <= 180.0 && steer >= -180.0);
    }

    #[test]
    fn test_find_look_ahead_point() {
        let tc = test_tracker();
        let position = GeoPoint::new(0.0, 0.0);

        // Points spaced about 1.1 m apart heading east
        let path: Vec<GeoPoint> = (0..10)
            .map(|i| GeoPoint::new(0.0, i as f64 * 0.00001))
            .collect();

        let target = tc.find_look_ahead_point(position, &path).unwrap();

        // The chosen point must be at or beyond the look-ahead distance
        assert!(geodesy::distance(position, target) >= tc.params.look_ahead_m);

        // A short path falls back to its final point
        let short_path = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.00001)];
        let target = tc.find_look_ahead_point(position, &short_path).unwrap();
        assert_eq!(target, short_path[1]);

        assert!(tc.find_look_ahead_point(position, &[]).is_none());
    }

    #[test]
    fn test_heading_correction_deadband() {
        let tc = test_tracker();

        // Errors under the 5 degree tolerance are zeroed
        assert_eq!(tc.heading_correction(0.0, 3.0), 0.0);
        assert_eq!(tc.heading_correction(0.0, -4.9), 0.0);

        // Larger errors pass through, normalised
        assert_eq!(tc.heading_correction(0.0, 10.0), 10.0);
        assert_eq!(tc.heading_correction(350.0, 10.0), 20.0);
        assert_eq!(tc.heading_correction(10.0, 350.0), -20.0);
    }

    #[test]
    fn test_is_on_track() {
        let tc = test_tracker();

        assert!(tc.is_on_track(0.5, 2.0));
        assert!(tc.is_on_track(-1.0, -5.0));
        assert!(!tc.is_on_track(1.5, 0.0));
        assert!(!tc.is_on_track(0.0, 6.0));
    }

    #[test]
    fn test_point_to_segment_distance() {
        let tc = test_tracker();

        let start = GeoPoint::new(0.0, 0.0);
        let end = GeoPoint::new(0.0, 0.001);
        let mid = GeoPoint::new(0.0, 0.0005);

        // Beside the segment the distance is the perpendicular distance
        let beside = offset(mid, 5.0, 0.0);
        let d = tc.point_to_segment_distance(beside, start, end);
        assert!((d - 5.0).abs() < 0.1, "got {}", d);

        // Before the start it is the distance to the start
        let before = offset(start, 7.0, 270.0);
        let d = tc.point_to_segment_distance(before, start, end);
        assert!((d - 7.0).abs() < 0.1, "got {}", d);

        // After the end it is the distance to the end
        let after = offset(end, 9.0, 90.0);
        let d = tc.point_to_segment_distance(after, start, end);
        assert!((d - 9.0).abs() < 0.1, "got {}", d);
    }

    #[test]
    fn test_path_progress() {
        let tc = test_tracker();

        let path = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.0, 0.002),
        ];

        // At the start progress is zero
        let (progress, seg) = tc.path_progress(path[0], &path);
        assert!(progress < 1.0, "got {}", progress);
        assert_eq!(seg, 0);

        // At the midpoint progress is about half
        let (progress, seg) = tc.path_progress(path[1], &path);
        assert!((progress - 50.0).abs() < 2.0, "got {}", progress);
        assert!(seg <= 1);

        // At the end progress is complete
        let (progress, _) = tc.path_progress(path[2], &path);
        assert!(progress > 99.0, "got {}", progress);

        // Degenerate path
        assert_eq!(tc.path_progress(path[0], &path[..1]), (0.0, 0));
    }
}
