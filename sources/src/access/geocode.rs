//! Reverse geocoding of aircraft positions through Nominatim.
//!
//! Turns a lat/lon into a short human-readable "CC place" string, with the
//! level of detail tied to the aircraft altitude: the lower it flies, the more
//! local the place name.  Best-effort, failures yield the fallback strings.
//!

use std::time::Duration;

use clap::{crate_name, crate_version};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, trace};

use skywatch_formats::AircraftState;

use crate::{http_get, DEFAULT_TIMEOUT};

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Address breakdown as returned by Nominatim, only what we use.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Address {
    pub country_code: Option<String>,
    pub state: Option<String>,
    pub state_district: Option<String>,
    pub county: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub suburb: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Reverse {
    address: Option<Address>,
}

/// Nominatim client.
///
#[derive(Clone, Debug)]
pub struct ReverseGeo {
    pub base_url: String,
    pub client: Client,
    pub timeout: Duration,
}

impl Default for ReverseGeo {
    fn default() -> Self {
        Self::new()
    }
}

impl ReverseGeo {
    pub fn new() -> Self {
        ReverseGeo {
            base_url: NOMINATIM_URL.to_owned(),
            client: Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Resolve a position into an address.  `None` when over water or on any
    /// failure.
    ///
    #[tracing::instrument(skip(self))]
    pub fn resolve(&self, lat: f64, lon: f64) -> Option<Address> {
        trace!("reversegeo::resolve");

        let url = format!(
            "{}/reverse?format=json&lat={:.6}&lon={:.6}&zoom=18&addressdetails=1",
            self.base_url, lat, lon
        );
        let resp = http_get!(self, url).ok()?;
        if resp.status() != StatusCode::OK {
            debug!("reverse geo: status {}", resp.status());
            return None;
        }
        let body = resp.text().ok()?;
        let answer: Reverse = serde_json::from_str(&body).ok()?;
        answer.address
    }
}

/// Build the location string for an aircraft.
///
/// Detail is tiered on altitude: below 200 m the suburb, below 500 m the
/// village or town, below 2000 m the city, county or district, otherwise the
/// state.  No position gives "-", no address (over sea) gives "Intl. Water".
///
pub fn location_string(ac: &AircraftState, addr: Option<&Address>) -> String {
    if !ac.has_position() {
        return "-".to_owned();
    }
    let addr = match addr {
        Some(addr) => addr,
        None => return "Intl. Water".to_owned(),
    };

    let alt = ac.altitude().unwrap_or(0.);
    let pick = |fields: &[&Option<String>]| -> Option<String> {
        fields.iter().find_map(|f| (*f).clone())
    };

    let mut local = addr.state.clone();
    if alt < 2000. {
        local = pick(&[&addr.city, &addr.county, &addr.state_district]).or(local);
    }
    if alt < 500. {
        local = pick(&[&addr.village, &addr.town]).or(local);
    }
    if alt < 200. {
        local = addr.suburb.clone().or(local);
    }

    let cc = addr
        .country_code
        .as_deref()
        .unwrap_or("")
        .to_uppercase();
    format!("{} {}", cc, local.unwrap_or_default())
        .trim()
        .to_owned()
}
