//! Pathfinder parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for grid pathfinding
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Spacing between adjacent search grid nodes in degrees.
    pub grid_resolution_deg: f64,

    /// Maximum number of nodes to expand before the search gives up and
    /// degrades to a straight line.
    pub max_iterations: usize,
}
