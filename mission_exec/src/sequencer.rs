//! # Waypoint sequencer
//!
//! Greedy nearest-neighbour ordering of an unordered set of target points.
//! This is the cheap TSP approximation used when the operator asks for a
//! distance-optimised visit order instead of their original input order.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::geodesy::{self, GeoPoint};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Order `points` by repeatedly visiting the nearest unvisited point,
/// starting the search from `start`.
///
/// `start` itself is not included in the output. When `return_to_start` is
/// set, `start` is appended as the final point so the route closes back on
/// itself.
///
/// Ties in distance are broken by input order (the earlier point wins), so
/// the output is fully deterministic for a given input. Returns an empty
/// vector for empty input.
pub fn sequence(points: &[GeoPoint], start: GeoPoint, return_to_start: bool) -> Vec<GeoPoint> {
    if points.is_empty() {
        return Vec::new();
    }

    let mut ordered = Vec::with_capacity(points.len() + return_to_start as usize);
    let mut remaining: Vec<GeoPoint> = points.to_vec();
    let mut current = start;

    while !remaining.is_empty() {
        let mut nearest_idx = 0;
        let mut nearest_dist = geodesy::distance(current, remaining[0]);

        // Strict < keeps the earliest point on ties
        for (i, &point) in remaining.iter().enumerate().skip(1) {
            let dist = geodesy::distance(current, point);
            if dist < nearest_dist {
                nearest_idx = i;
                nearest_dist = dist;
            }
        }

        current = remaining.remove(nearest_idx);
        ordered.push(current);
    }

    if return_to_start {
        ordered.push(start);
    }

    ordered
}

/// Total great-circle length in meters of the polyline through `points`.
///
/// Zero for fewer than two points.
pub fn total_distance(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| geodesy::distance(pair[0], pair[1]))
        .sum()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sequence_orders_by_distance() {
        let start = GeoPoint::new(0.0, 0.0);
        let far = GeoPoint::new(0.0, 0.03);
        let mid = GeoPoint::new(0.0, 0.02);
        let near = GeoPoint::new(0.0, 0.01);

        let ordered = sequence(&[far, mid, near], start, false);

        assert_eq!(ordered, vec![near, mid, far]);
    }

    #[test]
    fn test_sequence_deterministic_on_ties() {
        let start = GeoPoint::new(0.0, 0.0);

        // East and west points equidistant from the start, the earlier input
        // must win every time
        let east = GeoPoint::new(0.0, 0.01);
        let west = GeoPoint::new(0.0, -0.01);

        for _ in 0..10 {
            let ordered = sequence(&[east, west], start, false);
            assert_eq!(ordered, vec![east, west]);
        }

        let ordered = sequence(&[west, east], start, false);
        assert_eq!(ordered, vec![west, east]);
    }

    #[test]
    fn test_sequence_return_to_start() {
        let start = GeoPoint::new(0.0, 0.0);
        let a = GeoPoint::new(0.0, 0.01);

        let ordered = sequence(&[a], start, true);

        assert_eq!(ordered, vec![a, start]);
    }

    #[test]
    fn test_sequence_empty() {
        let start = GeoPoint::new(0.0, 0.0);

        assert!(sequence(&[], start, false).is_empty());
        assert!(sequence(&[], start, true).is_empty());
    }

    #[test]
    fn test_total_distance() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 0.001);
        let c = GeoPoint::new(0.0, 0.002);

        assert_eq!(total_distance(&[]), 0.0);
        assert_eq!(total_distance(&[a]), 0.0);

        let total = total_distance(&[a, b, c]);
        let direct = geodesy::distance(a, b) + geodesy::distance(b, c);
        assert!((total - direct).abs() < 1e-9);
    }

    #[test]
    fn test_sequence_no_worse_than_reverse_order() {
        let start = GeoPoint::new(0.0, 0.0);
        let points = vec![
            GeoPoint::new(0.0, 0.04),
            GeoPoint::new(0.0, 0.01),
            GeoPoint::new(0.0, 0.03),
            GeoPoint::new(0.0, 0.02),
        ];

        let ordered = sequence(&points, start, false);

        let mut greedy_route = vec![start];
        greedy_route.extend(&ordered);
        let mut worst_route = vec![start];
        worst_route.extend(points.iter().rev());

        assert!(total_distance(&greedy_route) <= total_distance(&worst_route));
    }
}
