//! Presence tracking around an observer.
//!
//! [PresenceTracker] diffs consecutive snapshots of normalized aircraft states
//! and classifies every change as a transition event.  [PollLoop] drives a
//! source on a fixed interval and feeds the tracker, isolating fetch failures
//! so a bad cycle never corrupts the tracked state.
//!
//! One instance of each per monitored airspace or tracked airframe, nothing is
//! shared between instances.
//!

pub use event::*;
pub use poll::*;
pub use tracker::*;

mod event;
mod poll;
mod tracker;
