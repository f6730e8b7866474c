//! Path smoother parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for path smoothing and constraint filtering
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Smoothing intensity in [0, 1]. Zero disables smoothing entirely.
    pub smoothing_factor: f64,

    /// Target spacing of densified path points in degrees.
    pub resolution_deg: f64,

    /// Maximum turn rate in degrees of heading change per meter travelled.
    pub max_turn_rate_deg_per_m: f64,

    /// Minimum length of a path segment in meters, shorter segments are
    /// collapsed during constraint filtering.
    pub min_segment_length_m: f64,

    /// Radius in meters of the arcs inserted to spread sharp turns.
    pub turn_arc_radius_m: f64,
}
