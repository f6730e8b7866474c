//! Mission event publication

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::mpsc::{channel, Receiver, Sender};

// Internal
use crate::mission::{MissionAnalytics, MissionPlan, MissionProgress};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Events emitted by the mission manager as a mission moves through its
/// lifecycle.
#[derive(Debug, Clone)]
pub enum MissionEvent {
    /// A new plan was produced.
    PlanReady(MissionPlan),

    /// Mission execution started.
    Started(MissionPlan),

    /// The progress record was updated following a position update.
    ProgressUpdated(MissionProgress),

    /// The waypoint at the given index was reached.
    WaypointReached { index: usize },

    /// The cross-track error exceeded the deviation threshold.
    DeviationDetected { cross_track_error_m: f64 },

    /// The mission finished with the attached analytics.
    Completed(MissionAnalytics),

    /// The mission was aborted.
    Aborted { reason: String },

    /// A planning or execution error occurred.
    Error { message: String },
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Fans mission events out to any number of subscribers.
///
/// Publication is synchronous: by the time `publish` returns every live
/// subscriber's channel holds the event. Subscribers whose receiving end has
/// been dropped are pruned on the next publish.
pub struct EventHub {
    senders: Vec<Sender<MissionEvent>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EventHub {
    pub fn new() -> Self {
        Self {
            senders: Vec::new(),
        }
    }

    /// Register a new subscriber and return its receiving end.
    pub fn subscribe(&mut self) -> Receiver<MissionEvent> {
        let (tx, rx) = channel();
        self.senders.push(tx);
        rx
    }

    /// Send an event to all live subscribers.
    pub fn publish(&mut self, event: MissionEvent) {
        self.senders
            .retain(|sender| sender.send(event.clone()).is_ok());
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
