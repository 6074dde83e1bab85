//! The presence tracker, diffing consecutive snapshots.
//!
//! The tracker owns the previous snapshot keyed by ICAO address plus the
//! timestamp each aircraft was first seen.  `update` filters the incoming
//! batch, classifies every appearance, persistence and disappearance, and
//! replaces the snapshot wholesale.  Nothing here does I/O.
//!

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, trace};

use skywatch_formats::AircraftState;
use skywatch_sources::StateFilter;

use crate::{EventKind, Summary, TransitionEvent};

/// Watching an area or following one airframe.
///
/// Identity mode adds the online/offline and airborne/landed transitions on
/// top of the area ones.
///
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TrackerMode {
    #[default]
    Area,
    Identity,
}

/// Holds the last snapshot and classifies changes against the next one.
///
#[derive(Debug, Default)]
pub struct PresenceTracker {
    mode: TrackerMode,
    filter: StateFilter,
    /// Last accepted snapshot, keyed by ICAO address
    snapshot: BTreeMap<String, AircraftState>,
    /// First-seen timestamp per ICAO address, UNIX seconds
    started: BTreeMap<String, i64>,
}

impl PresenceTracker {
    pub fn new(mode: TrackerMode) -> Self {
        PresenceTracker {
            mode,
            ..Default::default()
        }
    }

    /// Attach an attribute filter, applied before diffing so filtered-out
    /// aircraft never generate events.
    ///
    pub fn with_filter(mut self, filter: StateFilter) -> Self {
        self.filter = filter;
        self
    }

    /// How many aircraft are currently tracked?
    ///
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// The tracked ICAO addresses, for inspection.
    ///
    pub fn keys(&self) -> Vec<String> {
        self.snapshot.keys().cloned().collect()
    }

    /// Diff against the current wall clock.
    ///
    pub fn update(&mut self, batch: Vec<AircraftState>) -> (Vec<TransitionEvent>, Summary) {
        self.update_at(batch, Utc::now().timestamp())
    }

    /// Diff a new batch against the held snapshot.
    ///
    /// Emits, per aircraft and cycle, at most one event of each kind:
    /// - `Entering` (plus `Online` in identity mode) on first appearance,
    /// - `WentAirborne`/`JustLanded` in identity mode on ground flips,
    /// - `Present` for everything in the new snapshot,
    /// - `Leaving` (plus `Offline` in identity mode) on disappearance, with
    ///   the last-known record as payload.
    ///
    /// The snapshot swap happens at the end, an observer of the tracker never
    /// sees a half-applied update.
    ///
    #[tracing::instrument(skip(self, batch))]
    pub fn update_at(
        &mut self,
        batch: Vec<AircraftState>,
        now: i64,
    ) -> (Vec<TransitionEvent>, Summary) {
        trace!("tracker::update_at");

        let mut batch = batch;
        self.filter.apply(&mut batch);

        let identity = self.mode == TrackerMode::Identity;
        let mut fresh: BTreeMap<String, AircraftState> = BTreeMap::new();
        let mut started: BTreeMap<String, i64> = BTreeMap::new();
        // input order, for deterministic nearest tie-breaking
        let mut order: Vec<String> = Vec::with_capacity(batch.len());
        let mut events = vec![];

        for mut ac in batch {
            // duplicate ICAO in one batch, first record wins
            if fresh.contains_key(&ac.icao) {
                continue;
            }
            let key = ac.icao.clone();

            let start = *self.started.get(&key).unwrap_or(&now);
            ac.tracking_secs = (now - start).max(0) as u64;
            started.insert(key.clone(), start);

            match self.snapshot.get(&key) {
                None => {
                    debug!("{} entering", key);
                    events.push(TransitionEvent::new(EventKind::Entering, ac.clone()));
                    if identity {
                        events.push(TransitionEvent::new(EventKind::Online, ac.clone()));
                    }
                }
                Some(prev) if identity => match (prev.on_ground, ac.on_ground) {
                    (true, false) => {
                        events.push(TransitionEvent::new(EventKind::WentAirborne, ac.clone()))
                    }
                    (false, true) => {
                        events.push(TransitionEvent::new(EventKind::JustLanded, ac.clone()))
                    }
                    _ => (),
                },
                Some(_) => (),
            }
            events.push(TransitionEvent::new(EventKind::Present, ac.clone()));

            order.push(key.clone());
            fresh.insert(key, ac);
        }

        for (key, prev) in &self.snapshot {
            if fresh.contains_key(key) {
                continue;
            }
            debug!("{} leaving", key);
            let mut last = prev.clone();
            if let Some(start) = self.started.get(key) {
                last.tracking_secs = (now - start).max(0) as u64;
            }
            events.push(TransitionEvent::new(EventKind::Leaving, last.clone()));
            if identity {
                events.push(TransitionEvent::new(EventKind::Offline, last));
            }
        }

        // nearest aircraft, strict comparison so the first of a tie wins
        let mut nearest: Option<&AircraftState> = None;
        for key in &order {
            let ac = &fresh[key];
            let d = match ac.distance {
                Some(d) if d.is_finite() => d,
                _ => continue,
            };
            match nearest.and_then(|n| n.distance) {
                Some(best) if d >= best => (),
                _ => nearest = Some(ac),
            }
        }
        let summary = Summary {
            count: fresh.len(),
            nearest: nearest.cloned(),
        };

        self.snapshot = fresh;
        self.started = started;

        (events, summary)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn ac(icao: &str) -> AircraftState {
        AircraftState {
            icao: icao.to_owned(),
            latitude: Some(52.),
            longitude: Some(4.),
            ..Default::default()
        }
    }

    fn at(icao: &str, distance: f64) -> AircraftState {
        AircraftState {
            distance: Some(distance),
            ..ac(icao)
        }
    }

    fn kinds(events: &[TransitionEvent]) -> HashMap<(EventKind, String), usize> {
        let mut out = HashMap::new();
        for ev in events {
            *out.entry((ev.kind, ev.state.icao.clone())).or_insert(0) += 1;
        }
        out
    }

    #[test]
    fn test_diff_completeness() {
        let mut tracker = PresenceTracker::new(TrackerMode::Area);

        let (events, _) = tracker.update_at(vec![ac("A"), ac("B")], 1000);
        let k = kinds(&events);
        assert_eq!(Some(&1), k.get(&(EventKind::Entering, "A".into())));
        assert_eq!(Some(&1), k.get(&(EventKind::Entering, "B".into())));
        assert_eq!(Some(&1), k.get(&(EventKind::Present, "A".into())));
        assert_eq!(4, events.len());

        // B stays, C arrives, A leaves
        let (events, summary) = tracker.update_at(vec![ac("B"), ac("C")], 1020);
        let k = kinds(&events);
        assert_eq!(Some(&1), k.get(&(EventKind::Entering, "C".into())));
        assert_eq!(Some(&1), k.get(&(EventKind::Leaving, "A".into())));
        assert_eq!(Some(&1), k.get(&(EventKind::Present, "B".into())));
        assert_eq!(Some(&1), k.get(&(EventKind::Present, "C".into())));
        assert_eq!(None, k.get(&(EventKind::Entering, "B".into())));
        assert_eq!(4, events.len());
        assert_eq!(2, summary.count);
    }

    #[test]
    fn test_no_identity_events_in_area_mode() {
        let mut tracker = PresenceTracker::new(TrackerMode::Area);
        let mut grounded = ac("A");
        grounded.on_ground = true;

        tracker.update_at(vec![grounded], 1000);
        let (events, _) = tracker.update_at(vec![ac("A")], 1020);
        assert!(events.iter().all(|e| e.kind == EventKind::Present));
    }

    #[test]
    fn test_identity_transitions() {
        let mut tracker = PresenceTracker::new(TrackerMode::Identity);
        let mut grounded = ac("A");
        grounded.on_ground = true;

        let (events, _) = tracker.update_at(vec![grounded.clone()], 1000);
        let k = kinds(&events);
        assert_eq!(Some(&1), k.get(&(EventKind::Online, "A".into())));

        // takes off
        let (events, _) = tracker.update_at(vec![ac("A")], 1020);
        let k = kinds(&events);
        assert_eq!(Some(&1), k.get(&(EventKind::WentAirborne, "A".into())));

        // lands again
        let (events, _) = tracker.update_at(vec![grounded], 1040);
        let k = kinds(&events);
        assert_eq!(Some(&1), k.get(&(EventKind::JustLanded, "A".into())));

        // gone
        let (events, _) = tracker.update_at(vec![], 1060);
        let k = kinds(&events);
        assert_eq!(Some(&1), k.get(&(EventKind::Leaving, "A".into())));
        assert_eq!(Some(&1), k.get(&(EventKind::Offline, "A".into())));
        let off = events.iter().find(|e| e.kind == EventKind::Offline).unwrap();
        // final duration carried in the payload
        assert_eq!(60, off.state.tracking_secs);
    }

    #[test]
    fn test_tracking_duration_monotonic() {
        let mut tracker = PresenceTracker::new(TrackerMode::Area);
        let interval = 20;

        let mut last = 0;
        for n in 0..5 {
            let now = 1000 + n * interval;
            let (events, _) = tracker.update_at(vec![ac("A")], now);
            let present = events
                .iter()
                .find(|e| e.kind == EventKind::Present)
                .unwrap();
            assert!(present.state.tracking_secs >= last);
            assert_eq!((n * interval) as u64, present.state.tracking_secs);
            last = present.state.tracking_secs;
        }
    }

    #[test]
    fn test_track_start_resets_after_absence() {
        let mut tracker = PresenceTracker::new(TrackerMode::Area);
        tracker.update_at(vec![ac("A")], 1000);
        tracker.update_at(vec![], 1020);
        let (events, _) = tracker.update_at(vec![ac("A")], 1040);
        let present = events
            .iter()
            .find(|e| e.kind == EventKind::Present)
            .unwrap();
        assert_eq!(0, present.state.tracking_secs);
    }

    #[test]
    fn test_nearest_deterministic() {
        let mut tracker = PresenceTracker::new(TrackerMode::Area);
        let (_, summary) =
            tracker.update_at(vec![at("A", 50.), at("B", 10.), at("C", 30.)], 1000);
        assert_eq!("B", summary.nearest.unwrap().icao);
    }

    #[test]
    fn test_nearest_tie_first_wins() {
        let mut tracker = PresenceTracker::new(TrackerMode::Area);
        let (_, summary) =
            tracker.update_at(vec![at("A", 10.), at("B", 10.), at("C", 30.)], 1000);
        assert_eq!("A", summary.nearest.unwrap().icao);
    }

    #[test]
    fn test_nearest_skips_unknown_distance() {
        let mut tracker = PresenceTracker::new(TrackerMode::Area);
        let (_, summary) = tracker.update_at(vec![ac("A"), at("B", 30.)], 1000);
        assert_eq!("B", summary.nearest.unwrap().icao);
    }

    #[test]
    fn test_filter_applied_before_diff() {
        let mut tracker =
            PresenceTracker::new(TrackerMode::Area).with_filter(StateFilter {
                airborne_only: true,
                ..Default::default()
            });
        let mut grounded = ac("G");
        grounded.on_ground = true;

        let (events, summary) = tracker.update_at(vec![grounded.clone(), ac("A")], 1000);
        assert!(events.iter().all(|e| e.state.icao == "A"));
        assert_eq!(1, summary.count);

        // the filtered-out aircraft disappearing does not emit LEAVING either
        let (events, _) = tracker.update_at(vec![ac("A")], 1020);
        assert!(events.iter().all(|e| e.state.icao == "A"));
    }

    #[test]
    fn test_duplicate_icao_first_wins() {
        let mut tracker = PresenceTracker::new(TrackerMode::Area);
        let (events, summary) =
            tracker.update_at(vec![at("A", 10.), at("A", 5.)], 1000);
        assert_eq!(1, summary.count);
        assert_eq!(Some(10.), summary.nearest.unwrap().distance);
        assert_eq!(2, events.len());
    }

    #[test]
    fn test_empty_batches_are_fine() {
        let mut tracker = PresenceTracker::new(TrackerMode::Area);
        let (events, summary) = tracker.update_at(vec![], 1000);
        assert!(events.is_empty());
        assert_eq!(0, summary.count);
        assert!(summary.nearest.is_none());
    }
}
