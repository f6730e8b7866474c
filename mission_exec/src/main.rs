//! Mission executive entry point.
//!
//! # Architecture
//!
//! The executive initialises a session and the mission manager, plans a
//! demonstration mission, then drives the manager's two entry points from a
//! simple loop:
//!
//!     - Initialise session, logging and parameters
//!     - Plan the mission from the demo waypoint set
//!     - Start the mission
//!     - Main loop:
//!         - Simulated telemetry acquisition
//!         - Mission manager position update
//!         - Mission manager periodic tick (1 Hz)
//!         - Event draining and reporting
//!
//! In the full control station the simulated telemetry source is replaced by
//! the vehicle's live feed, the rest of the loop is unchanged.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use mission_lib::geodesy::{self, GeoPoint};
use mission_lib::mission::Waypoint;
use mission_lib::mission_mgr::{MissionEvent, MissionMgr};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::telemetry::TelemetrySample;
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.10;

/// Period between periodic mission manager ticks.
const TICK_PERIOD_S: f64 = 1.0;

/// Distance the simulated vehicle covers each cycle in meters.
const SIM_STEP_M: f64 = 1.0;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise color_eyre and the session
    color_eyre::install()?;

    let session =
        Session::new("mission_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Mission Executive\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE MISSION MANAGER ----

    let mut mission_mgr =
        MissionMgr::init("mission_mgr.toml").wrap_err("Failed to initialise mission manager")?;

    let events = mission_mgr.subscribe();

    info!("Mission manager parameters loaded");

    // ---- PLAN DEMO MISSION ----

    let start_position = GeoPoint::new(52.2053, 0.1218);

    let waypoints = vec![
        Waypoint::new(52.2058, 0.1220).map_err(|e| eyre!("Invalid waypoint: {}", e))?,
        Waypoint::new(52.2061, 0.1213).map_err(|e| eyre!("Invalid waypoint: {}", e))?,
        Waypoint::new(52.2055, 0.1208).map_err(|e| eyre!("Invalid waypoint: {}", e))?,
    ];

    if !mission_mgr.plan_mission(&waypoints, Some(start_position), true, None, 2.0) {
        return Err(eyre!("Mission planning failed"));
    }

    let (planned_path, start_payload) = match mission_mgr.current_plan() {
        Some(plan) => (plan.planned_path.clone(), plan.to_start_payload()),
        None => return Err(eyre!("No plan available after planning")),
    };

    // In the full control station this command goes down the vehicle link
    debug!(
        "Vehicle start command: {}",
        serde_json::to_string(&start_payload).wrap_err("Failed to serialise start command")?
    );

    if !mission_mgr.start(start_position) {
        return Err(eyre!("Failed to start mission"));
    }

    // ---- MAIN LOOP ----

    let mut sim_position = start_position;
    let mut sim_path_idx = 0;
    let mut last_tick = Instant::now();

    loop {
        let cycle_start = Instant::now();

        // Simulated telemetry acquisition: step towards the next path point
        let telemetry =
            step_simulated_vehicle(&mut sim_position, &mut sim_path_idx, &planned_path);

        mission_mgr.update_position(&telemetry);

        // Periodic tick at 1 Hz, independent of telemetry rate
        if last_tick.elapsed().as_secs_f64() >= TICK_PERIOD_S {
            mission_mgr.tick();
            last_tick = Instant::now();
        }

        // Drain and report events
        let mut finished = false;
        for event in events.try_iter() {
            match event {
                MissionEvent::WaypointReached { index } => {
                    info!("Reached waypoint {}", index + 1)
                }
                MissionEvent::ProgressUpdated(progress) => {
                    info!("Progress: {}", progress.summary())
                }
                MissionEvent::DeviationDetected {
                    cross_track_error_m,
                } => warn!("Path deviation: cte {:.2} m", cross_track_error_m),
                MissionEvent::Completed(analytics) => {
                    info!(
                        "Mission complete: {}/{} waypoints, efficiency {:.1}",
                        analytics.waypoints_reached,
                        analytics.total_waypoints,
                        analytics.efficiency_rating
                    );
                    finished = true;
                }
                MissionEvent::Aborted { reason } => {
                    warn!("Mission aborted: {}", reason);
                    finished = true;
                }
                MissionEvent::Error { message } => warn!("Mission error: {}", message),
                _ => (),
            }
        }

        if finished {
            break;
        }

        // Sleep out the rest of the cycle
        let elapsed = cycle_start.elapsed().as_secs_f64();
        if elapsed < CYCLE_PERIOD_S {
            thread::sleep(Duration::from_secs_f64(CYCLE_PERIOD_S - elapsed));
        }
    }

    info!("Mission executive finished");

    session.exit();

    Ok(())
}

/// Advance the simulated vehicle one step along the planned path, returning
/// the telemetry sample the vehicle would produce there.
fn step_simulated_vehicle(
    position: &mut GeoPoint,
    path_idx: &mut usize,
    path: &[GeoPoint],
) -> TelemetrySample {
    if path.is_empty() {
        return TelemetrySample::invalid();
    }

    // Advance the target index past any path points already within one step
    while *path_idx < path.len() - 1
        && geodesy::distance(*position, path[*path_idx]) <= SIM_STEP_M
    {
        *path_idx += 1;
    }

    let target = path[*path_idx];

    let heading = geodesy::bearing(*position, target);
    let remaining = geodesy::distance(*position, target);

    *position = geodesy::offset(*position, SIM_STEP_M.min(remaining), heading);

    TelemetrySample::new(
        position.lat_deg,
        position.lon_deg,
        heading,
        SIM_STEP_M / CYCLE_PERIOD_S,
    )
}
