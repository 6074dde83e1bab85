//! Library to connect to the various flight-tracking providers and fetch
//! normalized aircraft states from them.
//!
//! Every provider speaks a different dialect so we have one adapter per
//! provider, all implementing the [AircraftSource] trait.  The configuration
//! file describes the known sites (provider, endpoint, credentials) and
//! [Site::load] hands back the right adapter as a trait object.
//!
//! Supported providers:
//! - OpenSky Network (anonymous or basic auth)
//! - ADS-B Exchange feeder endpoint (API key holders)
//! - ADS-B Exchange through RapidAPI
//! - Virtual Radar Server dialect (ADS-B Exchange public API)
//!

use std::fmt::Debug;
use std::time::Duration;

use skywatch_common::GeoRef;
use skywatch_formats::{AircraftState, Format};

pub use access::*;
pub use error::*;
pub use filter::*;
pub use site::*;
pub use sources::*;

mod access;
mod error;
mod filter;
#[macro_use]
mod macros;
mod site;
mod sources;

/// This trait is what every provider adapter implements.
///
/// `Send` because the poll loop runs the trait object in a worker thread.
///
pub trait AircraftSource: Debug + Send {
    /// Human-readable site name
    fn name(&self) -> String;
    /// Payload format spoken by the provider
    fn format(&self) -> Format;
    /// Per-request timeout, set by the poll loop from its cycle interval
    fn set_timeout(&mut self, timeout: Duration);
    /// Fetch everything within the observer's range
    fn fetch_in_area(&self, observer: &GeoRef) -> Result<Vec<AircraftState>, SourceError>;
    /// Fetch the aircraft matching the identity filter.  The observer is
    /// still needed to derive distance and bearing.
    fn fetch_by_identity(
        &self,
        observer: &GeoRef,
        filter: &IdentityFilter,
    ) -> Result<Vec<AircraftState>, SourceError>;
}

/// Fill in distance and bearing for every record that has a position but no
/// usable provider-supplied value.  Records without a position are left
/// untouched.
///
pub fn derive_geometry(states: &mut [AircraftState], observer: &GeoRef) {
    for state in states.iter_mut() {
        let (lat, lon) = match (state.latitude, state.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => continue,
        };
        if !state.distance.is_some_and(|d| d.is_finite()) {
            state.distance = Some(observer.distance_to(lat, lon));
        }
        if !state.bearing.is_some_and(|b| b.is_finite()) {
            state.bearing = Some(observer.bearing_to(lat, lon));
        }
    }
}

/// Default per-request timeout before the poll loop overrides it.
///
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_geometry() {
        let observer = GeoRef::new(52.0, 4.0, 50_000.).unwrap();
        let mut states = vec![
            AircraftState {
                icao: "AAA111".into(),
                latitude: Some(52.3),
                longitude: Some(4.2),
                ..Default::default()
            },
            AircraftState {
                icao: "BBB222".into(),
                latitude: Some(52.3),
                longitude: Some(4.2),
                distance: Some(1234.),
                bearing: Some(42.),
                ..Default::default()
            },
            AircraftState {
                icao: "CCC333".into(),
                ..Default::default()
            },
        ];
        derive_geometry(&mut states, &observer);

        // computed
        assert!(states[0].distance.unwrap() > 0.);
        assert!(states[0].bearing.unwrap() >= 0.);
        // provider-supplied values kept
        assert_eq!(Some(1234.), states[1].distance);
        assert_eq!(Some(42.), states[1].bearing);
        // no position, nothing derived
        assert!(states[2].distance.is_none());
        assert!(states[2].bearing.is_none());
    }

    #[test]
    fn test_source_object_is_send() {
        // the poll loop moves the trait object into a worker thread
        fn assert_send<T: Send>() {}
        assert_send::<Box<dyn AircraftSource>>();
    }
}
