//! Virtual Radar Server dialect, as spoken by the ADS-B Exchange public API.
//!
//! Everything goes through `AircraftList.json` with query parameters.  The
//! observer coordinates ride along on every query (`lat`/`lng`) so the server
//! computes distance, bearing and tracking duration itself.  `fDstU` bounds an
//! area query in km, `fIcoQ`/`fRegQ`/`fCallQ` select identities.
//!

use std::time::Duration;

use clap::{crate_name, crate_version};
use reqwest::blocking::Client;
use tracing::{debug, trace};

use skywatch_common::GeoRef;
use skywatch_formats::{AircraftList, AircraftState, Format};

use crate::access::{fetch_body, Capability};
use crate::{derive_geometry, http_get, DEFAULT_TIMEOUT};
use crate::{AircraftSource, IdentityFilter, Site, SourceError};

/// Client for a VRS-style endpoint, no authentication.
///
#[derive(Clone, Debug)]
pub struct Vrs {
    pub features: Vec<Capability>,
    pub format: Format,
    pub name: String,
    pub base_url: String,
    /// Add this to `base_url` to fetch data
    pub get: String,
    pub client: Client,
    pub timeout: Duration,
}

impl Vrs {
    #[tracing::instrument]
    pub fn new() -> Self {
        trace!("vrs::new");

        Vrs {
            features: vec![Capability::Area, Capability::Identity],
            format: Format::Vrs,
            name: "vrs".to_owned(),
            base_url: "".to_owned(),
            get: "/AircraftList.json".to_owned(),
            client: Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load some data from in-memory loaded config
    ///
    #[tracing::instrument]
    pub fn load(&mut self, site: &Site) -> &mut Self {
        trace!("vrs::load");

        self.name = site.name.to_owned();
        self.format = site.format();
        self.base_url = site.base_url.to_owned();
        if let Some(get) = site.route("get") {
            self.get = get.to_owned();
        }
        self
    }

    fn fetch(&self, url: &str) -> Result<Vec<AircraftState>, SourceError> {
        debug!("vrs: fetching {}", url);

        let resp = http_get!(self, url)?;
        let body = fetch_body(resp)?;
        let list = AircraftList::from_json(&body)?;
        Ok(list.to_states())
    }
}

impl Default for Vrs {
    fn default() -> Self {
        Self::new()
    }
}

impl AircraftSource for Vrs {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn format(&self) -> Format {
        Format::Vrs
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    #[tracing::instrument(skip(self, observer))]
    fn fetch_in_area(&self, observer: &GeoRef) -> Result<Vec<AircraftState>, SourceError> {
        trace!("vrs::fetch_in_area");

        let url = format!(
            "{}{}?lat={:.6}&lng={:.6}&fDstU={}",
            self.base_url,
            self.get,
            observer.lat,
            observer.lon,
            (observer.range / 1000.).ceil().max(1.) as u32
        );

        let mut states = self.fetch(&url)?;
        derive_geometry(&mut states, observer);
        states.retain(|s| !s.has_position() || s.distance.is_some_and(|d| d <= observer.range));
        Ok(states)
    }

    #[tracing::instrument(skip(self, observer))]
    fn fetch_by_identity(
        &self,
        observer: &GeoRef,
        filter: &IdentityFilter,
    ) -> Result<Vec<AircraftState>, SourceError> {
        trace!("vrs::fetch_by_identity");

        if filter.is_empty() {
            debug!("empty identity filter");
            return Ok(vec![]);
        }

        let mut url = format!(
            "{}{}?lat={:.6}&lng={:.6}",
            self.base_url, self.get, observer.lat, observer.lon
        );
        if let Some(icao) = &filter.icao {
            url = format!("{}&fIcoQ={}", url, icao.to_uppercase());
        }
        if let Some(reg) = &filter.registration {
            url = format!("{}&fRegQ={}", url, reg.to_uppercase());
        }
        if let Some(call) = &filter.callsign {
            url = format!("{}&fCallQ={}", url, call.to_uppercase());
        }

        // the server matches prefixes, we want exact identities
        let mut states = self.fetch(&url)?;
        states.retain(|s| filter.matches(s));
        derive_geometry(&mut states, observer);
        Ok(states)
    }
}
