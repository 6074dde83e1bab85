//! Definition of the data formats used by skywatch.
//!
//! This module makes the link between the shared normalized record `AircraftState` and the
//! different provider payloads defined in the other modules.
//!
//! To add a new format, add a `FORMAT.rs` file defining the provider payload and its
//! conversion into `AircraftState`, then register the name in [Format].
//!
//! Canonical units for the normalized record, all adapters converge on these:
//!
//! - distance: meters
//! - altitude (baro & geo): meters
//! - ground speed: km/h
//! - vertical rate: m/s
//!

// Re-export for convenience
//
pub use format::*;
pub use state::*;
pub use units::*;

pub use adsbx::*;
pub use opensky::*;
pub use vrs::*;

mod adsbx;
mod format;
mod opensky;
mod state;
mod units;
mod vrs;

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
