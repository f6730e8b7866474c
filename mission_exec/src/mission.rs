//! # Mission data model
//!
//! The shared data structures describing a mission: validated waypoints, the
//! costed plan produced by the planner, the live progress record maintained
//! while the vehicle drives, and the post-mission analytics report.
//!
//! Everything here is serialisable so plans and progress can be archived in
//! the session directory and sent over the telemetry link.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use crate::geodesy::{self, GeoPoint};
use comms_if::mission::{
    MissionParamsPayload, MissionStartPayload, SegmentPayload, WaypointPayload,
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The lifecycle state of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionStatus {
    /// No mission loaded.
    Idle,

    /// A plan is being computed.
    Planning,

    /// A plan exists but execution has not started.
    Planned,

    /// The vehicle is executing the plan.
    Active,

    /// Execution is suspended and can be resumed.
    Paused,

    /// All waypoints were reached.
    Completed,

    /// Execution was stopped before completion.
    Aborted,
}

/// Errors in building or validating mission data.
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("No waypoints provided")]
    NoWaypoints,

    #[error("Too many waypoints: {0} (max: {max})", max = MAX_WAYPOINTS)]
    TooManyWaypoints(usize),

    #[error("Duplicate waypoints detected")]
    DuplicateWaypoints,

    #[error("Invalid latitude at waypoint {index}: {value}")]
    InvalidLatitude { index: usize, value: f64 },

    #[error("Invalid longitude at waypoint {index}: {value}")]
    InvalidLongitude { index: usize, value: f64 },

    #[error(
        "Segment {index} too long: {length_m:.0} m (max: {max_m:.0} m)",
        max_m = MAX_SEGMENT_LENGTH_M
    )]
    SegmentTooLong { index: usize, length_m: f64 },
}

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum number of waypoints in a single mission.
pub const MAX_WAYPOINTS: usize = 50;

/// Maximum allowed distance between consecutive waypoints in meters.
pub const MAX_SEGMENT_LENGTH_M: f64 = 10_000.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A validated mission waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

/// A single leg of the planned route between two consecutive waypoints,
/// costed at the planned speed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PathSegment {
    pub start: GeoPoint,
    pub end: GeoPoint,

    /// Great-circle length in meters.
    pub distance_m: f64,

    /// Initial bearing in degrees from true north.
    pub bearing_deg: f64,

    /// Time to traverse at the planned speed, in seconds.
    pub estimated_time_s: f64,
}

/// A complete costed mission plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionPlan {
    pub mission_id: String,

    /// Waypoints in visit order.
    pub waypoints: Vec<Waypoint>,

    /// The dense searched-and-smoothed path the vehicle will track.
    pub planned_path: Vec<GeoPoint>,

    /// One costed segment per consecutive waypoint pair.
    pub path_segments: Vec<PathSegment>,

    pub total_distance_m: f64,
    pub estimated_duration_s: f64,
    pub average_speed_ms: f64,

    /// Cross-track error threshold sent to the vehicle, in meters.
    pub cte_threshold_m: f64,

    /// Mission timeout sent to the vehicle, in seconds.
    pub mission_timeout_s: f64,

    /// `"nearest_neighbor"` or `"original_order"`.
    pub optimization_method: String,

    /// True if any pathfinding leg degraded to a straight line.
    pub degraded: bool,

    pub created: DateTime<Utc>,
}

/// The live progress record for an executing mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionProgress {
    pub current_position: GeoPoint,
    pub current_waypoint_index: usize,
    pub target_waypoint: Option<Waypoint>,

    pub distance_to_target_m: f64,
    pub cross_track_error_m: f64,

    /// Completed waypoints over total waypoints, in [0, 100].
    pub completion_percent: f64,

    pub total_segments: usize,

    pub elapsed_time_s: f64,
    pub estimated_time_remaining_s: f64,

    pub current_speed_ms: f64,
    pub average_speed_ms: f64,

    pub status: MissionStatus,
    pub deviation_count: usize,

    pub last_update: DateTime<Utc>,
}

/// Post-mission performance analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionAnalytics {
    pub mission_id: String,

    /// The path the vehicle actually drove, from the position history.
    pub actual_path: Vec<GeoPoint>,

    pub completion_time_s: f64,
    pub planned_duration_s: f64,
    pub average_speed_ms: f64,
    pub max_cross_track_error_m: f64,

    pub waypoints_reached: usize,
    pub total_waypoints: usize,
    pub deviation_count: usize,

    pub mission_success: bool,

    /// Weighted 0-100 score combining time efficiency, waypoint completion
    /// and deviation penalty.
    pub efficiency_rating: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    /// Build a waypoint, rejecting out-of-range coordinates.
    pub fn new(lat_deg: f64, lon_deg: f64) -> Result<Self, MissionError> {
        if !(-90.0..=90.0).contains(&lat_deg) {
            return Err(MissionError::InvalidLatitude {
                index: 0,
                value: lat_deg,
            });
        }
        if !(-180.0..=180.0).contains(&lon_deg) {
            return Err(MissionError::InvalidLongitude {
                index: 0,
                value: lon_deg,
            });
        }

        Ok(Self { lat_deg, lon_deg })
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat_deg, self.lon_deg)
    }
}

impl PathSegment {
    /// Cost the leg between two points at the given speed.
    pub fn from_points(start: GeoPoint, end: GeoPoint, speed_ms: f64) -> Self {
        let distance_m = geodesy::distance(start, end);
        let bearing_deg = geodesy::bearing(start, end);
        let estimated_time_s = if speed_ms > 0.0 {
            distance_m / speed_ms
        } else {
            0.0
        };

        Self {
            start,
            end,
            distance_m,
            bearing_deg,
            estimated_time_s,
        }
    }
}

impl MissionPlan {
    /// One line plan summary for logging.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} waypoints, {} segments, {:.1} m, {:.0} s ({})",
            self.mission_id,
            self.waypoints.len(),
            self.path_segments.len(),
            self.total_distance_m,
            self.estimated_duration_s,
            self.optimization_method,
        )
    }

    /// The start command to send to the vehicle for this plan.
    pub fn to_start_payload(&self) -> MissionStartPayload {
        MissionStartPayload {
            mission_id: self.mission_id.clone(),
            command: MissionStartPayload::COMMAND.into(),
            waypoints: self
                .waypoints
                .iter()
                .map(|wp| WaypointPayload {
                    lat: wp.lat_deg,
                    lon: wp.lon_deg,
                })
                .collect(),
            path_segments: self
                .path_segments
                .iter()
                .map(|seg| SegmentPayload {
                    start_lat: seg.start.lat_deg,
                    start_lon: seg.start.lon_deg,
                    end_lat: seg.end.lat_deg,
                    end_lon: seg.end.lon_deg,
                    distance: seg.distance_m,
                    bearing: seg.bearing_deg,
                    speed: self.average_speed_ms,
                })
                .collect(),
            parameters: MissionParamsPayload {
                speed_mps: self.average_speed_ms,
                cte_threshold_m: self.cte_threshold_m,
                mission_timeout_s: self.mission_timeout_s as u64,
                total_distance_m: self.total_distance_m,
                estimated_duration_s: self.estimated_duration_s as u64,
                optimization_method: self.optimization_method.clone(),
            },
        }
    }
}

impl MissionProgress {
    /// One line progress summary for logging.
    pub fn summary(&self) -> String {
        format!(
            "wp {} ({:.1} m to target), {:.1}% complete, cte {:.2} m, {} deviations",
            self.current_waypoint_index + 1,
            self.distance_to_target_m,
            self.completion_percent,
            self.cross_track_error_m,
            self.deviation_count,
        )
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Validate a waypoint sequence before planning.
///
/// Checks that the sequence is non-empty, within the waypoint cap, free of
/// exact duplicates, entirely within valid coordinate ranges, and has no
/// consecutive pair further apart than the segment length cap.
pub fn validate_waypoints(waypoints: &[Waypoint]) -> Result<(), MissionError> {
    if waypoints.is_empty() {
        return Err(MissionError::NoWaypoints);
    }

    if waypoints.len() > MAX_WAYPOINTS {
        return Err(MissionError::TooManyWaypoints(waypoints.len()));
    }

    for (i, wp) in waypoints.iter().enumerate() {
        if !(-90.0..=90.0).contains(&wp.lat_deg) {
            return Err(MissionError::InvalidLatitude {
                index: i,
                value: wp.lat_deg,
            });
        }
        if !(-180.0..=180.0).contains(&wp.lon_deg) {
            return Err(MissionError::InvalidLongitude {
                index: i,
                value: wp.lon_deg,
            });
        }
    }

    // Exact duplicates only, nearby waypoints are legitimate
    for (i, a) in waypoints.iter().enumerate() {
        for b in waypoints.iter().skip(i + 1) {
            if a == b {
                return Err(MissionError::DuplicateWaypoints);
            }
        }
    }

    for (i, pair) in waypoints.windows(2).enumerate() {
        let length_m = geodesy::distance(pair[0].point(), pair[1].point());
        if length_m > MAX_SEGMENT_LENGTH_M {
            return Err(MissionError::SegmentTooLong { index: i, length_m });
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geodesy::offset;

    fn waypoint_chain(count: usize, spacing_deg: f64) -> Vec<Waypoint> {
        (0..count)
            .map(|i| Waypoint {
                lat_deg: 0.0,
                lon_deg: i as f64 * spacing_deg,
            })
            .collect()
    }

    #[test]
    fn test_waypoint_validation() {
        assert!(Waypoint::new(45.0, 90.0).is_ok());
        assert!(Waypoint::new(90.0, 180.0).is_ok());
        assert!(Waypoint::new(90.1, 0.0).is_err());
        assert!(Waypoint::new(0.0, -180.1).is_err());
    }

    #[test]
    fn test_validate_waypoint_count_boundaries() {
        assert!(matches!(
            validate_waypoints(&[]),
            Err(MissionError::NoWaypoints)
        ));

        // Exactly at the cap is fine, one over is not
        assert!(validate_waypoints(&waypoint_chain(50, 0.001)).is_ok());
        assert!(matches!(
            validate_waypoints(&waypoint_chain(51, 0.001)),
            Err(MissionError::TooManyWaypoints(51))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let wp = Waypoint {
            lat_deg: 1.0,
            lon_deg: 1.0,
        };
        let other = Waypoint {
            lat_deg: 1.0,
            lon_deg: 1.001,
        };

        assert!(matches!(
            validate_waypoints(&[wp, other, wp]),
            Err(MissionError::DuplicateWaypoints)
        ));
    }

    #[test]
    fn test_validate_segment_length_boundary() {
        let start = GeoPoint::new(0.0, 0.0);

        // A millimetre inside the 10 km cap passes. The offset/distance round
        // trip is accurate to well under a millimetre at this range, so the
        // margin cannot flip the comparison.
        let near = offset(start, MAX_SEGMENT_LENGTH_M - 0.001, 90.0);
        let waypoints = vec![
            Waypoint {
                lat_deg: start.lat_deg,
                lon_deg: start.lon_deg,
            },
            Waypoint {
                lat_deg: near.lat_deg,
                lon_deg: near.lon_deg,
            },
        ];
        assert!(validate_waypoints(&waypoints).is_ok());

        // One metre over fails
        let far = offset(start, MAX_SEGMENT_LENGTH_M + 1.0, 90.0);
        let waypoints = vec![
            Waypoint {
                lat_deg: start.lat_deg,
                lon_deg: start.lon_deg,
            },
            Waypoint {
                lat_deg: far.lat_deg,
                lon_deg: far.lon_deg,
            },
        ];
        assert!(matches!(
            validate_waypoints(&waypoints),
            Err(MissionError::SegmentTooLong { index: 0, .. })
        ));
    }

    #[test]
    fn test_path_segment_costing() {
        let start = GeoPoint::new(0.0, 0.0);
        let end = GeoPoint::new(0.0, 0.001);

        let seg = PathSegment::from_points(start, end, 2.0);

        assert!((seg.distance_m - 111.3).abs() < 1.0);
        assert!((seg.bearing_deg - 90.0).abs() < 0.1);
        assert!((seg.estimated_time_s - seg.distance_m / 2.0).abs() < 1e-9);

        // Zero speed must not divide by zero
        let seg = PathSegment::from_points(start, end, 0.0);
        assert_eq!(seg.estimated_time_s, 0.0);
    }

    #[test]
    fn test_start_payload_matches_plan() {
        let waypoints = waypoint_chain(2, 0.001);
        let segments: Vec<PathSegment> = waypoints
            .windows(2)
            .map(|pair| PathSegment::from_points(pair[0].point(), pair[1].point(), 1.0))
            .collect();

        let plan = MissionPlan {
            mission_id: "mission_1".into(),
            waypoints: waypoints.clone(),
            planned_path: waypoints.iter().map(|wp| wp.point()).collect(),
            path_segments: segments.clone(),
            total_distance_m: segments[0].distance_m,
            estimated_duration_s: segments[0].estimated_time_s,
            average_speed_ms: 1.0,
            cte_threshold_m: 2.0,
            mission_timeout_s: 3600.0,
            optimization_method: "original_order".into(),
            degraded: false,
            created: Utc::now(),
        };

        let payload = plan.to_start_payload();

        assert_eq!(payload.command, "start_mission");
        assert_eq!(payload.waypoints.len(), 2);
        assert_eq!(payload.path_segments.len(), 1);
        assert_eq!(payload.parameters.optimization_method, "original_order");
        assert_eq!(payload.parameters.mission_timeout_s, 3600);
    }
}
