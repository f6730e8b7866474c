//! Mission manager parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::{pathfinder, smoother, traj_ctrl};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the mission manager and its subsystems
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Planned vehicle speed in meters/second when the operator does not
    /// specify one.
    pub default_speed_ms: f64,

    /// Distance to a target waypoint below which it counts as reached, in
    /// meters.
    pub waypoint_reach_threshold_m: f64,

    /// Cross-track error above which a deviation event is raised, in meters.
    pub deviation_threshold_m: f64,

    /// Number of deviation events above which a warning is logged.
    pub max_deviation_count: usize,

    /// Mission timeout sent to the vehicle, in seconds.
    pub mission_timeout_s: f64,

    /// Pathfinder parameters.
    pub pathfinder: pathfinder::Params,

    /// Path smoother parameters.
    pub smoother: smoother::Params,

    /// Trajectory tracking parameters.
    pub traj_ctrl: traj_ctrl::Params,
}
