//! Transition events and per-cycle reports, the only thing a consumer ever
//! sees of the tracker state.
//!

use serde::Serialize;
use strum::Display;

use skywatch_formats::AircraftState;

/// What happened to one aircraft between two polls.
///
/// `Online`/`Offline` and the ground transitions only occur when tracking a
/// single airframe by identity.
///
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// Appeared in the monitored airspace
    Entering,
    /// In the current snapshot, emitted every cycle
    Present,
    /// Dropped out of the monitored airspace
    Leaving,
    /// Tracked airframe is being received again
    Online,
    /// Tracked airframe is no longer received
    Offline,
    /// Tracked airframe took off
    WentAirborne,
    /// Tracked airframe landed
    JustLanded,
}

/// One event with the aircraft snapshot it applies to.
///
/// For [EventKind::Leaving] and [EventKind::Offline] the payload is the
/// last-known record with its final tracking duration.
///
#[derive(Clone, Debug, Serialize)]
pub struct TransitionEvent {
    pub kind: EventKind,
    pub state: AircraftState,
}

impl TransitionEvent {
    pub fn new(kind: EventKind, state: AircraftState) -> Self {
        TransitionEvent { kind, state }
    }
}

/// Aggregate values over one snapshot.
///
#[derive(Clone, Debug, Default, Serialize)]
pub struct Summary {
    /// Aircraft currently in the snapshot
    pub count: usize,
    /// Closest aircraft to the observer, if any has a distance
    pub nearest: Option<AircraftState>,
}

/// Everything one poll cycle produced.
///
/// On a failed cycle `events` is empty and `summary` repeats the last-known
/// values, stale but consistent.
///
#[derive(Clone, Debug, Serialize)]
pub struct CycleReport {
    /// Cycle timestamp, UNIX seconds
    pub at: i64,
    /// Did the fetch succeed?
    pub ok: bool,
    /// Credentials are rejected, will not recover without a config change
    pub degraded: bool,
    pub events: Vec<TransitionEvent>,
    pub summary: Summary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!("went_airborne", EventKind::WentAirborne.to_string());
        assert_eq!("entering", EventKind::Entering.to_string());
    }

    #[test]
    fn test_event_serializes_kind_as_snake_case() {
        let ev = TransitionEvent::new(EventKind::JustLanded, AircraftState::default());
        let out = serde_json::to_string(&ev).unwrap();
        assert!(out.contains(r#""kind":"just_landed""#));
    }
}
