//! # Vehicle telemetry types
//!
//! The navigation feed delivered by the vehicle. The transport layer is
//! responsible for rejecting malformed payloads; by the time a sample reaches
//! this type it is structurally sound, but may still be flagged invalid (for
//! example while the GPS has no fix). Consumers must treat an invalid sample
//! as a no-op, not an error.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single position-and-heading sample from the vehicle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Latitude in decimal degrees, positive north.
    pub lat_deg: f64,

    /// Longitude in decimal degrees, positive east.
    pub lon_deg: f64,

    /// Heading in degrees clockwise from true north, in [0, 360).
    pub heading_deg: f64,

    /// Ground speed in meters/second.
    pub speed_ms: f64,

    /// Whether this sample carries a usable position fix.
    pub valid: bool,

    /// Time the sample was received by the control station.
    pub received: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TelemetrySample {
    /// Build a valid sample from a position and heading.
    pub fn new(lat_deg: f64, lon_deg: f64, heading_deg: f64, speed_ms: f64) -> Self {
        Self {
            lat_deg,
            lon_deg,
            heading_deg,
            speed_ms,
            valid: true,
            received: Utc::now(),
        }
    }

    /// A sample explicitly marked invalid, for use when the vehicle has no fix.
    pub fn invalid() -> Self {
        Self {
            lat_deg: 0.0,
            lon_deg: 0.0,
            heading_deg: 0.0,
            speed_ms: 0.0,
            valid: false,
            received: Utc::now(),
        }
    }

    /// True if this sample's position can be used for navigation.
    ///
    /// The all-zeros position is rejected as it is the vehicle's
    /// no-fix placeholder.
    pub fn has_valid_position(&self) -> bool {
        self.valid
            && (-90.0..=90.0).contains(&self.lat_deg)
            && (-180.0..=180.0).contains(&self.lon_deg)
            && (self.lat_deg != 0.0 || self.lon_deg != 0.0)
    }
}
