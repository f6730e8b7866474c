//! # Grid pathfinder module
//!
//! A* search over an implicit 8-connected lat/lon grid. The grid is anchored
//! at the start point and spaced by the configured resolution in degrees, so
//! no map data is needed, the graph is generated on the fly. Costs are
//! geodesic distances in meters, with the straight-line distance to the goal
//! as the heuristic (admissible since no grid path can be shorter than the
//! great circle).
//!
//! The search is deliberately degrade-not-fail: if the open set empties or
//! the iteration budget runs out the result is the direct line from start to
//! goal, flagged degraded so consumers can tell a searched path from a
//! fallback one.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use log::warn;
use ordered_float::NotNan;

// Internal
use crate::geodesy::{self, GeoPoint, EARTH_RADIUS_M};

pub use params::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The grid pathfinder.
pub struct Pathfinder {
    params: Params,
}

/// The outcome of a pathfinding request.
#[derive(Debug, Clone)]
pub struct PathResult {
    /// The path from start to goal, start and goal included.
    pub points: Vec<GeoPoint>,

    /// True if any leg of the search failed and was replaced by the direct
    /// straight line.
    pub degraded: bool,
}

/// A grid cell, identified by its integer offset from the start point.
///
/// Keying the search maps on integer offsets rather than the floating point
/// coordinates avoids hash misses from accumulated rounding.
type Cell = (i64, i64);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pathfinder {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Find a path from `start` to `goal`.
    pub fn find_path(&self, start: GeoPoint, goal: GeoPoint) -> PathResult {
        let (points, degraded) = self.search(start, goal);
        PathResult { points, degraded }
    }

    /// Find a path from `start` to `goal` passing through each via point in
    /// order.
    ///
    /// Legs are searched independently and spliced, with the duplicated
    /// junction point between consecutive legs removed. The result is
    /// degraded if any leg degraded.
    pub fn find_path_via(&self, start: GeoPoint, goal: GeoPoint, via: &[GeoPoint]) -> PathResult {
        let mut full_path: Vec<GeoPoint> = Vec::new();
        let mut degraded = false;
        let mut current_start = start;

        for &target in via.iter().chain(std::iter::once(&goal)) {
            if target == current_start {
                continue;
            }

            let (leg, leg_degraded) = self.search(current_start, target);
            degraded |= leg_degraded;

            // Skip the junction point already present from the previous leg
            let skip = if full_path.is_empty() { 0 } else { 1 };
            full_path.extend(leg.into_iter().skip(skip));

            current_start = target;
        }

        if full_path.is_empty() {
            full_path.push(start);
        }

        PathResult {
            points: full_path,
            degraded,
        }
    }

    /// Single-leg A* search. Returns the path and whether it degraded to the
    /// direct line.
    fn search(&self, start: GeoPoint, goal: GeoPoint) -> (Vec<GeoPoint>, bool) {
        let res = self.params.grid_resolution_deg;

        // Goal tolerance of two cells in meters. Exact equality can never be
        // reached when the goal doesn't sit on the grid.
        let goal_tol_m = 2.0 * res.to_radians() * EARTH_RADIUS_M;

        let mut open_set: BinaryHeap<Reverse<(NotNan<f64>, Cell)>> = BinaryHeap::new();
        let mut g_score: HashMap<Cell, f64> = HashMap::new();
        let mut came_from: HashMap<Cell, Cell> = HashMap::new();

        let start_cell: Cell = (0, 0);
        let h_start = geodesy::distance(start, goal);

        g_score.insert(start_cell, 0.0);
        open_set.push(Reverse((heap_key(h_start), start_cell)));

        let mut iterations = 0;

        while let Some(Reverse((_, current))) = open_set.pop() {
            let current_pos = self.cell_to_point(start, current);

            if geodesy::distance(current_pos, goal) <= goal_tol_m {
                let mut path = self.reconstruct(start, &came_from, current);
                // Snap the final point onto the goal itself, unless it is
                // already there (coincident start and goal)
                if path.last() != Some(&goal) {
                    path.push(goal);
                }
                return (path, false);
            }

            iterations += 1;
            if iterations > self.params.max_iterations {
                break;
            }

            let current_g = match g_score.get(&current) {
                Some(&g) => g,
                None => continue,
            };

            // 8-connected neighbours
            for dlat in -1..=1i64 {
                for dlon in -1..=1i64 {
                    if dlat == 0 && dlon == 0 {
                        continue;
                    }

                    let neighbour = (current.0 + dlat, current.1 + dlon);
                    let neighbour_pos = self.cell_to_point(start, neighbour);

                    let tentative_g = current_g + geodesy::distance(current_pos, neighbour_pos);

                    let better = match g_score.get(&neighbour) {
                        Some(&g) => tentative_g < g,
                        None => true,
                    };

                    if better {
                        g_score.insert(neighbour, tentative_g);
                        came_from.insert(neighbour, current);

                        let f = tentative_g + geodesy::distance(neighbour_pos, goal);
                        open_set.push(Reverse((heap_key(f), neighbour)));
                    }
                }
            }
        }

        warn!(
            "Pathfinding from {} to {} failed, degrading to direct path",
            start, goal
        );

        (vec![start, goal], true)
    }

    fn cell_to_point(&self, start: GeoPoint, cell: Cell) -> GeoPoint {
        GeoPoint::new(
            start.lat_deg + cell.0 as f64 * self.params.grid_resolution_deg,
            start.lon_deg + cell.1 as f64 * self.params.grid_resolution_deg,
        )
    }

    fn reconstruct(&self, start: GeoPoint, came_from: &HashMap<Cell, Cell>, end: Cell) -> Vec<GeoPoint> {
        let mut cells = vec![end];
        let mut current = end;

        while let Some(&parent) = came_from.get(&current) {
            cells.push(parent);
            current = parent;
        }

        cells
            .into_iter()
            .rev()
            .map(|c| self.cell_to_point(start, c))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Wrap an f-cost for use as a heap key.
///
/// Costs are sums and products of finite inputs so cannot be NaN, but the
/// heap needs a total order, fall back to infinity rather than panic.
fn heap_key(cost: f64) -> NotNan<f64> {
    NotNan::new(cost).unwrap_or_else(|_| NotNan::new(f64::INFINITY).unwrap())
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            grid_resolution_deg: 0.0001,
            max_iterations: 10000,
        }
    }

    #[test]
    fn test_find_path_endpoints() {
        let pf = Pathfinder::new(test_params());
        let start = GeoPoint::new(0.0, 0.0);
        let goal = GeoPoint::new(0.0, 0.001);

        let result = pf.find_path(start, goal);

        assert!(!result.degraded);
        assert_eq!(result.points[0], start);
        assert_eq!(*result.points.last().unwrap(), goal);
        assert!(result.points.len() >= 2);
    }

    #[test]
    fn test_path_length_close_to_direct() {
        let pf = Pathfinder::new(test_params());
        let start = GeoPoint::new(0.0, 0.0);
        let goal = GeoPoint::new(0.001, 0.001);

        let result = pf.find_path(start, goal);

        let direct = geodesy::distance(start, goal);
        let path_len: f64 = result
            .points
            .windows(2)
            .map(|p| geodesy::distance(p[0], p[1]))
            .sum();

        // Grid paths can overshoot but never undershoot the great circle,
        // and the goal tolerance bounds the overshoot
        assert!(path_len >= direct - 1.0);
        assert!(path_len < direct * 1.5 + 100.0);
    }

    #[test]
    fn test_degrades_when_budget_exhausted() {
        let pf = Pathfinder::new(Params {
            grid_resolution_deg: 0.0001,
            max_iterations: 2,
        });
        let start = GeoPoint::new(0.0, 0.0);
        let goal = GeoPoint::new(0.01, 0.01);

        let result = pf.find_path(start, goal);

        assert!(result.degraded);
        assert_eq!(result.points, vec![start, goal]);
    }

    #[test]
    fn test_via_points_spliced_without_duplicates() {
        let pf = Pathfinder::new(test_params());
        let start = GeoPoint::new(0.0, 0.0);
        let via = GeoPoint::new(0.0, 0.001);
        let goal = GeoPoint::new(0.0, 0.002);

        let result = pf.find_path_via(start, goal, &[via]);

        assert_eq!(result.points[0], start);
        assert_eq!(*result.points.last().unwrap(), goal);

        // The junction must appear exactly once
        let via_count = result.points.iter().filter(|&&p| p == via).count();
        assert_eq!(via_count, 1);

        // No consecutive duplicate points anywhere
        for pair in result.points.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_coincident_start_and_goal() {
        let pf = Pathfinder::new(test_params());
        let p = GeoPoint::new(1.0, 1.0);

        let result = pf.find_path(p, p);

        assert!(!result.degraded);
        assert_eq!(result.points, vec![p]);
    }
}
