//! # Mission manager module
//!
//! The mission manager is the top level state machine tying planning and
//! tracking together. It owns the pathfinder, smoother and trajectory
//! tracker, the current plan and progress records, and publishes lifecycle
//! events to any number of subscribers.
//!
//! A mission moves through `Idle -> Planning -> Planned -> Active` with
//! `Active <-> Paused`, terminating in `Completed` or `Aborted`, and any
//! terminal or planned state can be cleared back to `Idle`.
//!
//! The manager is single threaded by design. The owner drives it through two
//! entry points, [`MissionMgr::update_position`] on every telemetry sample
//! and [`MissionMgr::tick`] at a nominal 1 Hz, and since both take `&mut
//! self` neither can observe the other's partial updates.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod events;
pub mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::sync::mpsc::Receiver;
use thiserror::Error;

// Internal
use crate::geodesy::{self, GeoPoint};
use crate::mission::{
    validate_waypoints, MissionAnalytics, MissionPlan, MissionProgress, MissionStatus,
    PathSegment, Waypoint,
};
use crate::pathfinder::Pathfinder;
use crate::sequencer;
use crate::smoother::Smoother;
use crate::traj_ctrl::TrajCtrl;
use util::maths::clamp;
use util::session;

pub use events::{EventHub, MissionEvent};
pub use params::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The mission manager.
pub struct MissionMgr {
    params: Params,

    pathfinder: Pathfinder,
    smoother: Smoother,
    traj_ctrl: TrajCtrl,

    plan: Option<MissionPlan>,
    progress: Option<MissionProgress>,

    mission_start: Option<DateTime<Utc>>,
    position_history: Vec<GeoPoint>,
    max_cte_m: f64,

    ticking: bool,

    events: EventHub,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur during mission manager initialisation.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Failed to load mission manager parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MissionMgr {
    /// Initialise the manager from the given parameter file.
    pub fn init(params_path: &str) -> Result<Self, InitError> {
        let params: Params =
            util::params::load(params_path).map_err(InitError::ParamLoadError)?;

        Ok(Self::new(params))
    }

    pub fn new(params: Params) -> Self {
        let pathfinder = Pathfinder::new(params.pathfinder.clone());
        let smoother = Smoother::new(params.smoother.clone());
        let traj_ctrl = TrajCtrl::new(params.traj_ctrl.clone());

        info!("Mission manager initialised");

        Self {
            params,
            pathfinder,
            smoother,
            traj_ctrl,
            plan: None,
            progress: None,
            mission_start: None,
            position_history: Vec::new(),
            max_cte_m: 0.0,
            ticking: false,
            events: EventHub::new(),
        }
    }

    /// Register a subscriber for mission events.
    pub fn subscribe(&mut self) -> Receiver<MissionEvent> {
        self.events.subscribe()
    }

    /// The current mission status.
    pub fn status(&self) -> MissionStatus {
        match (&self.progress, &self.plan) {
            (Some(progress), _) => progress.status,
            (None, Some(_)) => MissionStatus::Planned,
            (None, None) => MissionStatus::Idle,
        }
    }

    pub fn current_plan(&self) -> Option<&MissionPlan> {
        self.plan.as_ref()
    }

    pub fn current_progress(&self) -> Option<&MissionProgress> {
        self.progress.as_ref()
    }

    /// Plan a mission through the given waypoints.
    ///
    /// Validates the waypoint sequence, optionally reorders it with the
    /// nearest-neighbour sequencer, builds a dense searched-and-smoothed path
    /// and costs each consecutive leg at the planned speed. On success the
    /// plan replaces any previous one and a `PlanReady` event is published.
    /// On failure the previous plan is left untouched, an `Error` event is
    /// published and `false` is returned.
    pub fn plan_mission(
        &mut self,
        waypoints: &[Waypoint],
        start_position: Option<GeoPoint>,
        optimize_order: bool,
        speed_ms: Option<f64>,
        cte_threshold_m: f64,
    ) -> bool {
        if let Err(e) = validate_waypoints(waypoints) {
            let message = format!("Waypoint validation failed: {}", e);
            error!("{}", message);
            self.events.publish(MissionEvent::Error { message });
            return false;
        }

        let mut sequenced = false;
        let ordered: Vec<Waypoint> = if optimize_order && waypoints.len() > 1 {
            match start_position {
                Some(start) => {
                    let points: Vec<GeoPoint> = waypoints.iter().map(|wp| wp.point()).collect();
                    sequenced = true;
                    sequencer::sequence(&points, start, false)
                        .iter()
                        .map(|p| Waypoint {
                            lat_deg: p.lat_deg,
                            lon_deg: p.lon_deg,
                        })
                        .collect()
                }
                None => {
                    warn!("No start position provided, keeping original waypoint order");
                    waypoints.to_vec()
                }
            }
        } else {
            waypoints.to_vec()
        };

        // The full coordinate chain the vehicle will drive, start position
        // first if known
        let mut chain: Vec<GeoPoint> = Vec::with_capacity(ordered.len() + 1);
        if let Some(start) = start_position {
            chain.push(start);
        }
        chain.extend(ordered.iter().map(|wp| wp.point()));

        let (planned_path, degraded) = if chain.len() >= 2 {
            let result = self.pathfinder.find_path_via(
                chain[0],
                *chain.last().unwrap(),
                &chain[1..chain.len() - 1],
            );
            let smoothed = self.smoother.smooth(&result.points);
            (self.smoother.constrain(&smoothed), result.degraded)
        } else {
            (chain.clone(), false)
        };

        let speed_ms = speed_ms.unwrap_or(self.params.default_speed_ms);

        let path_segments: Vec<PathSegment> = chain
            .windows(2)
            .map(|pair| PathSegment::from_points(pair[0], pair[1], speed_ms))
            .collect();

        let total_distance_m: f64 = path_segments.iter().map(|s| s.distance_m).sum();
        let estimated_duration_s: f64 = path_segments.iter().map(|s| s.estimated_time_s).sum();

        let plan = MissionPlan {
            mission_id: format!("mission_{}", Utc::now().timestamp()),
            waypoints: ordered,
            planned_path,
            path_segments,
            total_distance_m,
            estimated_duration_s,
            average_speed_ms: speed_ms,
            cte_threshold_m,
            mission_timeout_s: self.params.mission_timeout_s,
            optimization_method: if sequenced {
                "nearest_neighbor".into()
            } else {
                "original_order".into()
            },
            degraded,
            created: Utc::now(),
        };

        info!("Mission planned: {}", plan.summary());
        if degraded {
            warn!("Plan contains degraded (straight line) path legs");
        }

        session::save_with_timestamp("plans/mission_plan.json", plan.clone());

        self.events.publish(MissionEvent::PlanReady(plan.clone()));
        self.plan = Some(plan);

        true
    }

    /// Start executing the current plan from the given position.
    ///
    /// Only permitted from the planned state: fails if there is no plan, if a
    /// mission is already running or paused, or if a finished mission has not
    /// been cleared.
    pub fn start(&mut self, current_position: GeoPoint) -> bool {
        if self.status() != MissionStatus::Planned {
            let message = format!(
                "Cannot start mission from the {:?} state",
                self.status()
            );
            error!("{}", message);
            self.events.publish(MissionEvent::Error { message });
            return false;
        }

        // The planned state guarantees a plan is present
        let plan = match &self.plan {
            Some(plan) => plan.clone(),
            None => return false,
        };

        self.progress = Some(MissionProgress {
            current_position,
            current_waypoint_index: 0,
            target_waypoint: plan.waypoints.first().copied(),
            distance_to_target_m: 0.0,
            cross_track_error_m: 0.0,
            completion_percent: 0.0,
            total_segments: plan.path_segments.len(),
            elapsed_time_s: 0.0,
            estimated_time_remaining_s: plan.estimated_duration_s,
            current_speed_ms: 0.0,
            average_speed_ms: 0.0,
            status: MissionStatus::Active,
            deviation_count: 0,
            last_update: Utc::now(),
        });

        self.mission_start = Some(Utc::now());
        self.position_history = vec![current_position];
        self.max_cte_m = 0.0;
        self.ticking = true;

        info!("Mission {} started", plan.mission_id);
        self.events.publish(MissionEvent::Started(plan));

        true
    }

    /// Process a new telemetry sample.
    ///
    /// No-op unless a mission is active and the sample carries a valid
    /// position. Advances the target waypoint on arrival, raises deviation
    /// events when the cross-track error exceeds the threshold and finalises
    /// the mission when the last waypoint is reached.
    pub fn update_position(&mut self, telemetry: &comms_if::telemetry::TelemetrySample) {
        if self.status() != MissionStatus::Active {
            return;
        }
        if !telemetry.has_valid_position() {
            return;
        }

        let position = GeoPoint::new(telemetry.lat_deg, telemetry.lon_deg);

        self.position_history.push(position);

        let progress = match &mut self.progress {
            Some(p) => p,
            None => return,
        };

        progress.current_position = position;
        progress.current_speed_ms = telemetry.speed_ms;
        progress.last_update = Utc::now();

        let mut reached = false;
        if let Some(target) = progress.target_waypoint {
            progress.distance_to_target_m = geodesy::distance(position, target.point());
            reached =
                progress.distance_to_target_m <= self.params.waypoint_reach_threshold_m;
        }

        if reached {
            self.handle_waypoint_reached();
        }

        // The mission may have completed above
        if self.status() != MissionStatus::Active {
            return;
        }

        self.update_cross_track(position);
        self.update_completion_percent();

        if let Some(progress) = &self.progress {
            self.events
                .publish(MissionEvent::ProgressUpdated(progress.clone()));
        }
    }

    /// Periodic metrics update, driven by the owner at a nominal 1 Hz.
    ///
    /// Recomputes elapsed time, average speed over the whole position
    /// history, and the estimated time remaining extrapolated from the
    /// completion percentage.
    pub fn tick(&mut self) {
        if self.status() != MissionStatus::Active || !self.ticking {
            return;
        }

        let start = match self.mission_start {
            Some(s) => s,
            None => return,
        };

        let elapsed_s = match util::time::duration_to_seconds(Utc::now() - start) {
            Some(s) => s,
            None => return,
        };

        let travelled_m = sequencer::total_distance(&self.position_history);

        if let Some(progress) = &mut self.progress {
            progress.elapsed_time_s = elapsed_s;

            if elapsed_s > 0.0 {
                progress.average_speed_ms = travelled_m / elapsed_s;
            }

            if progress.completion_percent > 0.0 {
                let estimated_total_s =
                    elapsed_s / (progress.completion_percent / 100.0);
                progress.estimated_time_remaining_s =
                    (estimated_total_s - elapsed_s).max(0.0);
            }
        }
    }

    /// Suspend an active mission. No-op in any other state.
    pub fn pause(&mut self) {
        if self.status() != MissionStatus::Active {
            return;
        }

        if let Some(progress) = &mut self.progress {
            progress.status = MissionStatus::Paused;
        }
        self.ticking = false;

        info!("Mission paused");
    }

    /// Resume a paused mission. No-op in any other state.
    pub fn resume(&mut self) {
        if self.status() != MissionStatus::Paused {
            return;
        }

        if let Some(progress) = &mut self.progress {
            progress.status = MissionStatus::Active;
        }
        self.ticking = true;

        info!("Mission resumed");
    }

    /// Abort an active or paused mission.
    pub fn abort(&mut self, reason: &str) {
        match self.status() {
            MissionStatus::Active | MissionStatus::Paused => (),
            _ => return,
        }

        if let Some(progress) = &mut self.progress {
            progress.status = MissionStatus::Aborted;
        }
        self.ticking = false;

        info!("Mission aborted: {}", reason);
        self.events.publish(MissionEvent::Aborted {
            reason: reason.to_string(),
        });
    }

    /// Replan with new waypoints, restarting automatically if a mission was
    /// active so no mission is lost mid-flight.
    pub fn replan(&mut self, new_waypoints: &[Waypoint], current_position: GeoPoint) -> bool {
        info!("Replanning mission with {} waypoints", new_waypoints.len());

        let was_active = self.status() == MissionStatus::Active;

        let cte_threshold_m = self
            .plan
            .as_ref()
            .map(|p| p.cte_threshold_m)
            .unwrap_or(self.params.waypoint_reach_threshold_m);

        let success = self.plan_mission(
            new_waypoints,
            Some(current_position),
            true,
            None,
            cte_threshold_m,
        );

        if success && was_active {
            // Drop the in-flight progress so the machine is back in the
            // planned state before restarting
            self.progress = None;
            self.start(current_position);
        }

        success
    }

    /// Discard the current plan and progress, returning to idle.
    pub fn clear(&mut self) {
        self.plan = None;
        self.progress = None;
        self.mission_start = None;
        self.position_history.clear();
        self.max_cte_m = 0.0;
        self.ticking = false;

        info!("Mission state cleared");
    }

    /// Advance to the next waypoint, or finalise the mission if the last one
    /// was just reached.
    fn handle_waypoint_reached(&mut self) {
        let total_waypoints = match &self.plan {
            Some(plan) => plan.waypoints.len(),
            None => return,
        };

        let current_idx = match &self.progress {
            Some(progress) => progress.current_waypoint_index,
            None => return,
        };

        self.events
            .publish(MissionEvent::WaypointReached { index: current_idx });

        let next_idx = current_idx + 1;

        if next_idx < total_waypoints {
            if let (Some(progress), Some(plan)) = (&mut self.progress, &self.plan) {
                progress.current_waypoint_index = next_idx;
                progress.target_waypoint = plan.waypoints.get(next_idx).copied();
            }
            info!("Moving to waypoint {}", next_idx + 1);
        } else {
            self.complete_mission();
        }
    }

    /// Recompute the cross-track error against the active path segment and
    /// raise deviation events as needed.
    fn update_cross_track(&mut self, position: GeoPoint) {
        let segment = match self.current_segment() {
            Some(segment) => segment,
            None => return,
        };

        let cte_m = self
            .traj_ctrl
            .cross_track_error(position, segment.start, segment.end);

        if cte_m.abs() > self.max_cte_m {
            self.max_cte_m = cte_m.abs();
        }

        let mut deviated = false;
        if let Some(progress) = &mut self.progress {
            progress.cross_track_error_m = cte_m;

            if cte_m.abs() > self.params.deviation_threshold_m {
                progress.deviation_count += 1;
                deviated = true;

                if progress.deviation_count > self.params.max_deviation_count {
                    warn!(
                        "Excessive path deviations: {} (cte {:.2} m)",
                        progress.deviation_count, cte_m
                    );
                }
            }
        }

        if deviated {
            self.events.publish(MissionEvent::DeviationDetected {
                cross_track_error_m: cte_m,
            });
        }
    }

    /// The path segment the vehicle should currently be tracking.
    fn current_segment(&self) -> Option<PathSegment> {
        let plan = self.plan.as_ref()?;
        let progress = self.progress.as_ref()?;

        if plan.path_segments.is_empty() {
            return None;
        }

        let idx = progress
            .current_waypoint_index
            .min(plan.path_segments.len() - 1);

        plan.path_segments.get(idx).copied()
    }

    fn update_completion_percent(&mut self) {
        let total_waypoints = match &self.plan {
            Some(plan) => plan.waypoints.len(),
            None => return,
        };

        if total_waypoints == 0 {
            return;
        }

        if let Some(progress) = &mut self.progress {
            progress.completion_percent =
                progress.current_waypoint_index as f64 / total_waypoints as f64 * 100.0;
        }
    }

    /// Finalise a completed mission and publish its analytics.
    fn complete_mission(&mut self) {
        if let Some(progress) = &mut self.progress {
            progress.status = MissionStatus::Completed;
            progress.completion_percent = 100.0;
            progress.current_waypoint_index += 1;
            progress.target_waypoint = None;
            progress.distance_to_target_m = 0.0;
        }
        self.ticking = false;

        if let Some(analytics) = self.generate_analytics() {
            info!(
                "Mission {} completed, efficiency rating {:.1}",
                analytics.mission_id, analytics.efficiency_rating
            );

            session::save_with_timestamp("analytics/mission_analytics.json", analytics.clone());

            self.events.publish(MissionEvent::Completed(analytics));
        }
    }

    /// Post-mission performance metrics.
    ///
    /// The efficiency rating combines time efficiency, waypoint completion
    /// ratio and a deviation penalty with fixed 40/40/20 weights, clamped to
    /// [0, 100].
    fn generate_analytics(&self) -> Option<MissionAnalytics> {
        let plan = self.plan.as_ref()?;
        let progress = self.progress.as_ref()?;

        let total_waypoints = plan.waypoints.len();
        let waypoints_reached = progress.current_waypoint_index.min(total_waypoints);

        let completion_time_s = progress.elapsed_time_s;

        let time_efficiency = if completion_time_s > 0.0 {
            plan.estimated_duration_s / completion_time_s * 100.0
        } else {
            0.0
        };

        let waypoint_efficiency = if total_waypoints > 0 {
            waypoints_reached as f64 / total_waypoints as f64 * 100.0
        } else {
            0.0
        };

        let deviation_penalty = (100.0 - progress.deviation_count as f64 * 10.0).max(0.0);

        let efficiency_rating = clamp(
            time_efficiency * 0.4 + waypoint_efficiency * 0.4 + deviation_penalty * 0.2,
            0.0,
            100.0,
        );

        Some(MissionAnalytics {
            mission_id: plan.mission_id.clone(),
            actual_path: self.position_history.clone(),
            completion_time_s,
            planned_duration_s: plan.estimated_duration_s,
            average_speed_ms: progress.average_speed_ms,
            max_cross_track_error_m: self.max_cte_m,
            waypoints_reached,
            total_waypoints,
            deviation_count: progress.deviation_count,
            mission_success: waypoints_reached == total_waypoints,
            efficiency_rating,
        })
    }
}
