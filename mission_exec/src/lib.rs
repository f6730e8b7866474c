//! # Mission planning and trajectory tracking library
//!
//! This library is the navigation core of the control station. It converts a
//! sparse set of operator-supplied waypoints into a concrete, time-estimated
//! path, monitors the vehicle's execution of that path in real time, and
//! produces post-mission performance analytics.
//!
//! The main modules are, leaf first:
//!
//! - [`geodesy`] - great-circle distance/bearing/offset maths on a spherical
//!   earth model, used by everything else.
//! - [`sequencer`] - greedy nearest-neighbour ordering of unordered targets.
//! - [`pathfinder`] - A* search over an implicit lat/lon grid.
//! - [`smoother`] - path densification, curvature reduction and constraint
//!   filtering.
//! - [`traj_ctrl`] - cross-track/along-track error, pure pursuit steering and
//!   path progress calculations.
//! - [`mission`] - the mission data model (plans, progress, analytics).
//! - [`mission_mgr`] - the top level state machine tying the above together
//!   with the live telemetry feed.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod geodesy;
pub mod mission;
pub mod mission_mgr;
pub mod pathfinder;
pub mod sequencer;
pub mod smoother;
pub mod traj_ctrl;
