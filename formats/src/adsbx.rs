//! Module to load and process data coming from the ADS-B Exchange JSON API,
//! shared by the feeder endpoint and the RapidAPI one.
//!
//! Every numeric field arrives as a string, empty when unknown.  We parse with
//! a tolerant helper and fall back to the canonical defaults.
//!

use serde::Deserialize;
use tracing::trace;

use crate::{clean_callsign, ft_to_m, fpm_to_ms, kt_to_kmh, nm_to_m, AircraftState};

/// Envelope of an aircraft list answer.
///
/// `ctime` is the structural marker; `msg` carries a provider-reported error
/// (quota exceeded, bad key) and is checked by the adapter after parsing.
///
#[derive(Debug, Deserialize)]
pub struct AcList {
    /// Aircraft records, absent when nothing is in range
    pub ac: Option<Vec<Ac>>,
    /// Number of records
    pub total: Option<i64>,
    /// Server UNIX timestamp in milliseconds
    pub ctime: i64,
    /// Processing time in ms
    pub ptime: Option<i64>,
    /// Provider-reported error text
    pub msg: Option<String>,
}

impl AcList {
    /// Deserialize from json.
    ///
    #[tracing::instrument(skip(input))]
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        trace!("aclist::from_json");
        serde_json::from_str(input)
    }

    /// Normalize every record.
    ///
    pub fn to_states(&self) -> Vec<AircraftState> {
        match &self.ac {
            Some(v) => v.iter().map(AircraftState::from).collect(),
            None => vec![],
        }
    }
}

/// One aircraft as sent by ADS-B Exchange, string-typed throughout.
///
#[derive(Debug, Default, Deserialize)]
pub struct Ac {
    /// Position timestamp, UNIX milliseconds
    pub postime: Option<String>,
    pub icao: String,
    pub reg: Option<String>,
    /// ICAO type code
    #[serde(rename = "type")]
    pub actype: Option<String>,
    /// Speed in knots
    pub spd: Option<String>,
    /// Barometric altitude in feet
    pub alt: Option<String>,
    /// Geometric altitude in feet
    pub galt: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    /// Vertical rate in ft/min
    pub vsi: Option<String>,
    /// True track in degrees
    pub trak: Option<String>,
    pub sqk: Option<String>,
    pub call: Option<String>,
    /// "0"/"1"
    pub gnd: Option<String>,
    /// Operator ICAO code
    pub opicao: Option<String>,
    /// Country
    pub cou: Option<String>,
    /// "0"/"1"
    pub mil: Option<String>,
    /// Special purpose indicator, "0"/"1"
    pub interested: Option<String>,
    /// Departure airport code and name
    pub from: Option<String>,
    /// Arrival airport code and name
    pub to: Option<String>,
    /// Distance from the queried position, nautical miles
    pub dst: Option<String>,
}

/// Parse a string-typed number, rejecting empties and non-finite values.
///
fn num(v: &Option<String>) -> Option<f64> {
    v.as_deref()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// "0" means false, anything else set means true.
///
fn flag(v: &Option<String>) -> bool {
    matches!(v.as_deref(), Some(s) if !s.is_empty() && s != "0")
}

impl From<&Ac> for AircraftState {
    /// Altitudes ft to m, speed kt to km/h, vertical rate ft/min to m/s,
    /// provider distance NM to m but only when it parses to a finite number,
    /// otherwise the adapter recomputes it from the position.
    ///
    fn from(ac: &Ac) -> Self {
        AircraftState {
            icao: ac.icao.clone(),
            callsign: clean_callsign(ac.call.as_deref().unwrap_or("")),
            registration: ac.reg.clone().unwrap_or_default(),
            origin_country: ac.cou.clone().unwrap_or_default(),
            // postime is milliseconds
            position_time: num(&ac.postime).map(|ms| (ms / 1000.) as i64),
            latitude: num(&ac.lat),
            longitude: num(&ac.lon),
            baro_altitude: num(&ac.alt).map(ft_to_m),
            geo_altitude: num(&ac.galt).map(ft_to_m),
            on_ground: flag(&ac.gnd),
            ground_speed: num(&ac.spd).map(kt_to_kmh).unwrap_or(0.),
            true_track: num(&ac.trak).unwrap_or(0.),
            vertical_rate: num(&ac.vsi).map(fpm_to_ms).unwrap_or(0.),
            squawk: ac.sqk.clone().unwrap_or_default(),
            spi: flag(&ac.interested),
            operator: ac.opicao.clone().unwrap_or_default(),
            model: ac.actype.clone().unwrap_or_default(),
            origin_airport: ac.from.clone().unwrap_or_default(),
            dest_airport: ac.to.clone().unwrap_or_default(),
            military: flag(&ac.mil),
            distance: num(&ac.dst).map(nm_to_m),
            bearing: None,
            ..Default::default()
        }
    }
}
