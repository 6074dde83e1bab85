//! Module to load and process data coming from the OpenSky Network API.
//!
//! They send out an array of arrays, each representing a specific state vector,
//! with nullable members all over.  We name the fields into `StateVector` before
//! normalizing.
//!
//! Documentation is taken from [The Opensky site](https://openskynetwork.github.io/opensky-api/rest.html)
//!

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use tracing::trace;

use crate::{clean_callsign, ms_to_kmh, AircraftState};

/// Origin of a state's position
///
#[derive(Clone, Copy, Debug, Deserialize_repr, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum Source {
    AdsB = 0,
    Asterix,
    MLAT,
    FLARM,
}

/// This is the main container for packets sent by the API.
/// It includes a UNIX timestamp and a set of `StateVector`.
///
/// The `time` field doubles as the structural marker: a payload without it is
/// not an OpenSky payload.
///
#[derive(Debug, Deserialize)]
pub struct StateList {
    /// UNIX timestamp
    pub time: i64,
    /// The state vectors
    pub states: Option<Vec<StateVector>>,
}

impl StateList {
    /// Deserialize from json, naming the anonymous tuples on the way.
    ///
    #[tracing::instrument(skip(input))]
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        trace!("statelist::from_json");

        let data: Payload = serde_json::from_str(input)?;

        let states = data.states.map(|v| {
            v.into_iter()
                .map(|r| StateVector {
                    icao24: r.0,
                    callsign: r.1,
                    origin_country: r.2,
                    time_position: r.3,
                    last_contact: r.4,
                    longitude: r.5,
                    latitude: r.6,
                    baro_altitude: r.7,
                    on_ground: r.8,
                    velocity: r.9,
                    true_track: r.10,
                    vertical_rate: r.11,
                    sensors: r.12,
                    geo_altitude: r.13,
                    squawk: r.14,
                    spi: r.15,
                    position_source: r.16,
                })
                .collect::<Vec<_>>()
        });

        Ok(StateList {
            time: data.time,
            states,
        })
    }

    /// Normalize every state vector.
    ///
    pub fn to_states(&self) -> Vec<AircraftState> {
        match &self.states {
            Some(v) => v.iter().map(AircraftState::from).collect(),
            None => vec![],
        }
    }
}

/// Definition of a state vector as documented
///
#[derive(Debug, Deserialize, Serialize)]
pub struct StateVector {
    /// ICAO ID
    pub icao24: String,
    /// Callsign of the vehicle
    pub callsign: Option<String>,
    /// Origin Country
    pub origin_country: String,
    pub time_position: Option<i64>,
    pub last_contact: Option<i64>,
    /// Position
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Meters
    pub baro_altitude: Option<f64>,
    pub on_ground: bool,
    /// m/s
    pub velocity: Option<f64>,
    pub true_track: Option<f64>,
    /// m/s
    pub vertical_rate: Option<f64>,
    pub sensors: Option<Vec<i64>>,
    /// Meters
    pub geo_altitude: Option<f64>,
    pub squawk: Option<String>,
    pub spi: bool,
    /// Position source
    pub position_source: Option<Source>,
}

impl From<&StateVector> for AircraftState {
    /// OpenSky altitudes are already meters; velocity and vertical rate are m/s,
    /// speed goes to km/h.  Registration, route and operator are not supplied.
    ///
    fn from(sv: &StateVector) -> Self {
        AircraftState {
            icao: sv.icao24.clone(),
            callsign: clean_callsign(sv.callsign.as_deref().unwrap_or("")),
            origin_country: sv.origin_country.clone(),
            position_time: sv.time_position,
            longitude: sv.longitude,
            latitude: sv.latitude,
            baro_altitude: sv.baro_altitude,
            geo_altitude: sv.geo_altitude,
            on_ground: sv.on_ground,
            ground_speed: ms_to_kmh(sv.velocity.unwrap_or(0.)),
            true_track: sv.true_track.unwrap_or(0.),
            vertical_rate: sv.vertical_rate.unwrap_or(0.),
            squawk: sv.squawk.clone().unwrap_or_default(),
            spi: sv.spi,
            ..Default::default()
        }
    }
}

// Private structs

/// Struct returned by the OpenSky API
///
#[derive(Debug, Deserialize)]
struct Payload {
    /// UNIX timestamp
    time: i64,
    /// State vectors
    states: Option<Vec<Rawdata>>,
}

/// OpenSky sends out 17-element tuples we need to match with real field names,
/// cf. [StateVector].  Nearly everything in there can be null.
///
#[derive(Debug, Deserialize)]
struct Rawdata(
    String,
    Option<String>,
    String,
    Option<i64>,
    Option<i64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    bool,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<Vec<i64>>,
    Option<f64>,
    Option<String>,
    bool,
    Option<Source>,
);
