//! # Communications Interface
//!
//! This crate defines the data structures shared between the mission core and
//! its external collaborators: the telemetry feed coming up from the vehicle
//! and the command payloads sent down to it. The transport itself (sockets,
//! serialisation framing, retries) lives outside this workspace; everything
//! crossing that boundary must be expressed as one of these typed records.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod mission;
pub mod telemetry;
