//! The normalized aircraft state record.
//!
//! One `AircraftState` is one aircraft at one point in time, whatever the provider.
//! Providers differ wildly in what they supply; anything absent collapses to a
//! type-appropriate default so downstream consumers can treat records uniformly.
//! The exception is the position and the values derived from it: an aircraft that
//! is not broadcasting a position gets `None`, not a fake (0, 0).
//!

use serde::{Deserialize, Serialize};

/// Squawk codes signalling hijack, lost communications and general emergency.
const EMERGENCY_SQUAWKS: [&str; 3] = ["7500", "7600", "7700"];

/// Normalized state of one aircraft.
///
/// Units: distance/altitudes in meters, ground speed in km/h, vertical rate in m/s,
/// bearings/track in degrees clockwise from true north.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AircraftState {
    /// Unique ICAO 24-bit transponder address, hex string.  Identity key.
    pub icao: String,
    /// Callsign, sanitized to alphanumerics.  May be empty.
    pub callsign: String,
    /// Aircraft registration (tail number).  May be empty.
    pub registration: String,
    /// Country name inferred from the ICAO address block.
    pub origin_country: String,
    /// Unix timestamp (seconds) of the last position update.
    pub position_time: Option<i64>,
    /// WGS-84 latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// WGS-84 longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// Barometric altitude in meters.
    pub baro_altitude: Option<f64>,
    /// Geometric altitude in meters.
    pub geo_altitude: Option<f64>,
    /// Surface position report.
    pub on_ground: bool,
    /// Velocity over ground in km/h.
    pub ground_speed: f64,
    /// True track in degrees, the aircraft's own heading.
    pub true_track: f64,
    /// Vertical rate in m/s, positive climbs.
    pub vertical_rate: f64,
    /// 4-digit transponder code.
    pub squawk: String,
    /// Special purpose indicator flag.
    pub spi: bool,
    /// Operator name or ICAO code.
    pub operator: String,
    /// Aircraft model/type description.
    pub model: String,
    /// Departure airport code/name.
    pub origin_airport: String,
    /// Arrival airport code/name.
    pub dest_airport: String,
    /// Best-effort military flag.
    pub military: bool,
    /// Distance from the observer in meters, derived.
    pub distance: Option<f64>,
    /// Bearing from the observer in degrees, derived.
    pub bearing: Option<f64>,
    /// Seconds since first seen in the current presence period, tracker-maintained.
    pub tracking_secs: u64,
}

impl AircraftState {
    /// Whether the aircraft transmits an emergency squawk
    /// (7500 hijack, 7600 lost comms, 7700 emergency).
    ///
    pub fn emergency(&self) -> bool {
        EMERGENCY_SQUAWKS.contains(&self.squawk.as_str())
    }

    /// Preferred altitude for display, geometric first.
    ///
    pub fn altitude(&self) -> Option<f64> {
        self.geo_altitude.or(self.baro_altitude)
    }

    /// Both coordinates present?
    ///
    pub fn has_position(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Strip everything but alphanumerics out of a raw callsign (OpenSky pads
/// with spaces, some feeders leak dashes).
///
pub fn clean_callsign(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("7500", true)]
    #[case("7600", true)]
    #[case("7700", true)]
    #[case("7000", false)]
    #[case("", false)]
    fn test_emergency(#[case] sqk: &str, #[case] expected: bool) {
        let ac = AircraftState {
            squawk: sqk.to_string(),
            ..Default::default()
        };
        assert_eq!(expected, ac.emergency());
    }

    #[test]
    fn test_altitude_prefers_geo() {
        let ac = AircraftState {
            baro_altitude: Some(11_000.),
            geo_altitude: Some(11_200.),
            ..Default::default()
        };
        assert_eq!(Some(11_200.), ac.altitude());

        let ac = AircraftState {
            baro_altitude: Some(11_000.),
            ..Default::default()
        };
        assert_eq!(Some(11_000.), ac.altitude());
    }

    #[rstest]
    #[case("KLM123  ", "KLM123")]
    #[case("PH-VHD", "PHVHD")]
    #[case("", "")]
    fn test_clean_callsign(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(expected, clean_callsign(raw));
    }

    #[test]
    fn test_default_is_uniform() {
        let ac = AircraftState::default();
        assert!(ac.icao.is_empty());
        assert!(!ac.on_ground);
        assert_eq!(0., ac.ground_speed);
        assert!(ac.latitude.is_none());
        assert!(ac.distance.is_none());
        assert!(!ac.has_position());
    }
}
