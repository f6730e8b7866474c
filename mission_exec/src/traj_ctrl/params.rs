//! Trajectory tracking parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory tracking
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Pure pursuit look-ahead distance in meters.
    pub look_ahead_m: f64,

    /// Maximum cross-track error for the vehicle to be considered on track,
    /// in meters.
    pub cross_track_tolerance_m: f64,

    /// Maximum heading error for the vehicle to be considered on track, in
    /// degrees. Also the deadband below which heading corrections are zeroed.
    pub heading_tolerance_deg: f64,
}
