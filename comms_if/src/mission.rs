//! # Mission command payloads
//!
//! Payloads sent down to the vehicle when a mission is started. The field
//! names match the vehicle firmware's JSON schema exactly, so these structs
//! must not be renamed without a matching firmware change.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A waypoint in vehicle wire format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointPayload {
    pub lat: f64,
    pub lon: f64,
}

/// A single planned path segment in vehicle wire format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SegmentPayload {
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,

    /// Segment length in meters.
    pub distance: f64,

    /// Segment bearing in degrees from true north.
    pub bearing: f64,

    /// Commanded speed over this segment in meters/second.
    pub speed: f64,
}

/// The parameters block of a mission start command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionParamsPayload {
    pub speed_mps: f64,
    pub cte_threshold_m: f64,
    pub mission_timeout_s: u64,
    pub total_distance_m: f64,
    pub estimated_duration_s: u64,
    pub optimization_method: String,
}

/// The complete mission start command sent to the vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionStartPayload {
    pub mission_id: String,

    /// Always `"start_mission"`, kept explicit so the vehicle can dispatch on
    /// the command field alone.
    pub command: String,

    pub waypoints: Vec<WaypointPayload>,
    pub path_segments: Vec<SegmentPayload>,
    pub parameters: MissionParamsPayload,
}

impl MissionStartPayload {
    pub const COMMAND: &'static str = "start_mission";
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_payload_wire_format() {
        let payload = MissionStartPayload {
            mission_id: "mission_0".into(),
            command: MissionStartPayload::COMMAND.into(),
            waypoints: vec![WaypointPayload { lat: 1.0, lon: 2.0 }],
            path_segments: vec![SegmentPayload {
                start_lat: 1.0,
                start_lon: 2.0,
                end_lat: 1.1,
                end_lon: 2.1,
                distance: 100.0,
                bearing: 45.0,
                speed: 1.0,
            }],
            parameters: MissionParamsPayload {
                speed_mps: 1.0,
                cte_threshold_m: 2.0,
                mission_timeout_s: 3600,
                total_distance_m: 100.0,
                estimated_duration_s: 100,
                optimization_method: "original_order".into(),
            },
        };

        let json = serde_json::to_value(&payload).unwrap();

        // Field names are part of the vehicle firmware contract
        assert_eq!(json["command"], "start_mission");
        assert_eq!(json["waypoints"][0]["lat"], 1.0);
        assert_eq!(json["path_segments"][0]["start_lat"], 1.0);
        assert_eq!(json["parameters"]["speed_mps"], 1.0);
    }
}
