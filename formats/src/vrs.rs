//! Module to load and process `AircraftList.json` answers from a Virtual Radar
//! Server instance (the ADS-B Exchange public API speaks this dialect).
//!
//! Fields are PascalCase and properly typed for a change.  The server computes
//! distance, bearing and tracking duration itself when the query carries the
//! observer coordinates.
//!

use serde::Deserialize;
use tracing::trace;

use crate::{clean_callsign, ft_to_m, fpm_to_ms, kt_to_kmh, AircraftState};

/// Envelope of an `AircraftList.json` answer.
///
/// `lastDv` is the structural marker, its value is opaque (the server sends a
/// string or a number depending on version).
///
#[derive(Debug, Deserialize)]
pub struct AircraftList {
    /// Data-version cookie, marker field
    #[serde(rename = "lastDv")]
    pub last_dv: serde_json::Value,
    /// Aircraft records
    #[serde(rename = "acList", default)]
    pub ac_list: Vec<VrsAircraft>,
    /// Total known aircraft server-side
    #[serde(rename = "totalAc")]
    pub total_ac: Option<i64>,
}

impl AircraftList {
    /// Deserialize from json.
    ///
    #[tracing::instrument(skip(input))]
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        trace!("aircraftlist::from_json");
        serde_json::from_str(input)
    }

    /// Normalize every record.
    ///
    pub fn to_states(&self) -> Vec<AircraftState> {
        self.ac_list.iter().map(AircraftState::from).collect()
    }
}

/// One aircraft as sent by VRS.
///
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VrsAircraft {
    pub icao: String,
    pub reg: Option<String>,
    pub call: Option<String>,
    pub cou: Option<String>,
    /// Position timestamp, UNIX milliseconds
    pub pos_time: Option<i64>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    /// Barometric altitude in feet
    pub alt: Option<f64>,
    /// Geometric altitude in feet
    #[serde(rename = "GAlt")]
    pub galt: Option<f64>,
    /// Ground speed in knots
    pub spd: Option<f64>,
    /// Vertical rate in ft/min
    pub vsi: Option<f64>,
    /// Track in degrees
    pub trak: Option<f64>,
    /// Bearing from the queried position in degrees
    pub brng: Option<f64>,
    /// Distance from the queried position in km
    pub dst: Option<f64>,
    pub sqk: Option<String>,
    pub gnd: Option<bool>,
    pub mil: Option<bool>,
    /// Emergency squawk flag, server-derived
    pub help: Option<bool>,
    /// User-tagged as interesting
    pub interested: Option<bool>,
    pub op: Option<String>,
    #[serde(rename = "OpIcao")]
    pub op_icao: Option<String>,
    pub mdl: Option<String>,
    #[serde(rename = "Type")]
    pub actype: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Aircraft species code, cf. [species_name]
    pub species: Option<u8>,
    /// Seconds the server has been tracking this aircraft
    #[serde(rename = "TSecs")]
    pub tsecs: Option<u64>,
}

/// Display name for a VRS species code.
///
pub fn species_name(code: u8) -> &'static str {
    match code {
        0 => "unknown",
        1 => "land",
        2 => "sea",
        3 => "amphibian",
        4 => "helicopter",
        5 => "gyrocopter",
        6 => "tiltwing",
        7 => "vehicle",
        8 => "tower",
        _ => "-",
    }
}

impl From<&VrsAircraft> for AircraftState {
    /// Altitudes ft to m, speed kt to km/h, vertical rate ft/min to m/s,
    /// distance km to m.  Bearing and tracking seconds come straight from the
    /// server, computed against the observer coordinates we sent.
    ///
    fn from(ac: &VrsAircraft) -> Self {
        AircraftState {
            icao: ac.icao.clone(),
            callsign: clean_callsign(ac.call.as_deref().unwrap_or("")),
            registration: ac.reg.clone().unwrap_or_default(),
            origin_country: ac.cou.clone().unwrap_or_default(),
            position_time: ac.pos_time.map(|ms| ms / 1000),
            latitude: ac.lat,
            longitude: ac.long,
            baro_altitude: ac.alt.map(ft_to_m),
            geo_altitude: ac.galt.map(ft_to_m),
            on_ground: ac.gnd.unwrap_or(false),
            ground_speed: ac.spd.map(kt_to_kmh).unwrap_or(0.),
            true_track: ac.trak.unwrap_or(0.),
            vertical_rate: ac.vsi.map(fpm_to_ms).unwrap_or(0.),
            squawk: ac.sqk.clone().unwrap_or_default(),
            spi: ac.interested.unwrap_or(false),
            operator: ac
                .op
                .clone()
                .filter(|s| !s.is_empty())
                .or_else(|| ac.op_icao.clone())
                .unwrap_or_default(),
            model: ac
                .mdl
                .clone()
                .filter(|s| !s.is_empty())
                .or_else(|| ac.actype.clone())
                .unwrap_or_default(),
            origin_airport: ac.from.clone().unwrap_or_default(),
            dest_airport: ac.to.clone().unwrap_or_default(),
            military: ac.mil.unwrap_or(false),
            distance: ac.dst.filter(|d| d.is_finite()).map(|d| d * 1000.),
            bearing: ac.brng,
            tracking_secs: ac.tsecs.unwrap_or(0),
        }
    }
}
