//! The poll loop, one per monitored instance.
//!
//! Cycles run strictly sequentially: fetch, update the tracker, sleep out the
//! rest of the interval.  A failed fetch skips the tracker update entirely so
//! the last accepted snapshot survives, and the report repeats the last-known
//! summary.  Authentication failures are remembered as a degraded flag since
//! they will not heal without a configuration change.
//!

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{error, info, trace, warn};

use skywatch_common::GeoRef;
use skywatch_sources::{AircraftSource, IdentityFilter, SourceError};

use crate::{CycleReport, PresenceTracker, Summary};

/// A fetch may not eat more than this much of the interval.
const MAX_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetch timeout: three quarters of the interval, capped.
///
fn fetch_timeout(interval: Duration) -> Duration {
    (interval * 3 / 4).min(MAX_FETCH_TIMEOUT)
}

/// Periodically fetches from one source and feeds one tracker.
///
pub struct PollLoop {
    source: Box<dyn AircraftSource>,
    observer: GeoRef,
    tracker: PresenceTracker,
    /// Set when following one airframe instead of watching the area
    target: Option<IdentityFilter>,
    interval: Duration,
    /// Sticky until a fetch succeeds again
    degraded: bool,
    last_summary: Summary,
}

impl PollLoop {
    pub fn new(
        mut source: Box<dyn AircraftSource>,
        observer: GeoRef,
        tracker: PresenceTracker,
        interval: Duration,
    ) -> Self {
        source.set_timeout(fetch_timeout(interval));
        PollLoop {
            source,
            observer,
            tracker,
            target: None,
            interval,
            degraded: false,
            last_summary: Summary::default(),
        }
    }

    /// Follow one airframe instead of watching the whole area.
    ///
    pub fn with_target(mut self, filter: IdentityFilter) -> Self {
        self.target = Some(filter);
        self
    }

    /// Run one cycle against the given clock.
    ///
    /// Never panics and never propagates a fetch error, the report carries
    /// the outcome.
    ///
    #[tracing::instrument(skip(self))]
    pub fn cycle(&mut self, now: i64) -> CycleReport {
        trace!("pollloop::cycle");

        let fetched = match &self.target {
            Some(filter) => self.source.fetch_by_identity(&self.observer, filter),
            None => self.source.fetch_in_area(&self.observer),
        };

        match fetched {
            Ok(batch) => {
                self.degraded = false;
                let (events, summary) = self.tracker.update_at(batch, now);
                self.last_summary = summary.clone();
                CycleReport {
                    at: now,
                    ok: true,
                    degraded: false,
                    events,
                    summary,
                }
            }
            Err(e) => {
                match &e {
                    SourceError::Auth(_) => {
                        self.degraded = true;
                        error!("{}: {}", self.source.name(), e);
                    }
                    _ => warn!("{}: {}", self.source.name(), e),
                }
                CycleReport {
                    at: now,
                    ok: false,
                    degraded: self.degraded,
                    events: vec![],
                    summary: self.last_summary.clone(),
                }
            }
        }
    }

    /// Run cycles until the flag drops or the receiver goes away.
    ///
    /// The sleep is chopped up so a termination signal is honored within a
    /// fraction of a second.
    ///
    #[tracing::instrument(skip(self, out, running))]
    pub fn run(&mut self, out: Sender<CycleReport>, running: Arc<AtomicBool>) {
        info!(
            "watching {} every {}s through {}",
            if self.target.is_some() { "airframe" } else { "area" },
            self.interval.as_secs(),
            self.source.name()
        );

        while running.load(Ordering::Relaxed) {
            let begun = Instant::now();
            let report = self.cycle(Utc::now().timestamp());
            if out.send(report).is_err() {
                trace!("receiver gone, stopping");
                break;
            }

            let mut left = self.interval.saturating_sub(begun.elapsed());
            while !left.is_zero() && running.load(Ordering::Relaxed) {
                let nap = left.min(Duration::from_millis(250));
                thread::sleep(nap);
                left = left.saturating_sub(nap);
            }
        }
        info!("poll loop stopped");
    }
}
