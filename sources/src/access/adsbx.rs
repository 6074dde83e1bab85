//! ADS-B Exchange specific code, both paying tiers.
//!
//! [AdsbxFeeder] is the endpoint offered to people feeding the exchange, the
//! API key travels in an `api-auth` header.  [AdsbxRapid] goes through the
//! RapidAPI gateway with its `X-RapidAPI-Key`/`X-RapidAPI-Host` header pair.
//!
//! Both speak the same string-typed JSON dialect and both build their queries
//! from URL path segments, `lat/{}/lon/{}/dist/{}` for an area and
//! `icao/{}` (and friends, feeder only) for identities.  Distances in the
//! query are nautical miles.
//!

use std::time::Duration;

use clap::{crate_name, crate_version};
use reqwest::blocking::Client;
use tracing::{debug, trace, warn};

use skywatch_common::GeoRef;
use skywatch_formats::{AcList, AircraftState, Format};

use crate::access::{fetch_body, Capability};
use crate::{derive_geometry, http_get_key, DEFAULT_TIMEOUT};
use crate::{AircraftSource, Auth, IdentityFilter, Site, SourceError};

/// Query distance in whole nautical miles, rounded up from the observer
/// range so nothing inside it is missed.
///
fn range_nm(observer: &GeoRef) -> u32 {
    (observer.range / 1852.).ceil().max(1.) as u32
}

/// Parse a body in the ADS-B Exchange dialect and normalize it, surfacing the
/// in-band `msg` error field.
///
fn decode(body: &str) -> Result<Vec<AircraftState>, SourceError> {
    let list = AcList::from_json(body)?;
    if let Some(msg) = &list.msg {
        return Err(SourceError::Provider(msg.to_owned()));
    }
    Ok(list.to_states())
}

/// The feeder endpoint on adsbexchange.com.
///
#[derive(Clone, Debug)]
pub struct AdsbxFeeder {
    pub features: Vec<Capability>,
    pub format: Format,
    pub name: String,
    /// API key, sent in the `api-auth` header
    pub api_key: String,
    pub base_url: String,
    /// Add this to `base_url` to fetch data
    pub get: String,
    pub client: Client,
    pub timeout: Duration,
}

impl AdsbxFeeder {
    #[tracing::instrument]
    pub fn new() -> Self {
        trace!("adsbxfeeder::new");

        AdsbxFeeder {
            features: vec![Capability::Area, Capability::Identity],
            format: Format::Adsbx,
            name: "adsbx-feeder".to_owned(),
            api_key: "".to_owned(),
            base_url: "".to_owned(),
            get: "/json".to_owned(),
            client: Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load some data from in-memory loaded config
    ///
    #[tracing::instrument]
    pub fn load(&mut self, site: &Site) -> &mut Self {
        trace!("adsbxfeeder::load");

        self.name = site.name.to_owned();
        self.format = site.format();
        self.base_url = site.base_url.to_owned();
        if let Some(Auth::Key { api_key }) = &site.auth {
            self.api_key = api_key.to_owned();
        } else {
            warn!("adsbx-feeder: no API key configured");
        }
        if let Some(get) = site.route("get") {
            self.get = get.to_owned();
        }
        self
    }

    fn fetch(&self, url: &str) -> Result<Vec<AircraftState>, SourceError> {
        debug!("adsbx-feeder: fetching {}", url);

        if self.api_key.is_empty() {
            return Err(SourceError::Auth("no API key".to_owned()));
        }
        let resp = http_get_key!(self, url, "api-auth" => &self.api_key)?;
        decode(&fetch_body(resp)?)
    }
}

impl Default for AdsbxFeeder {
    fn default() -> Self {
        Self::new()
    }
}

impl AircraftSource for AdsbxFeeder {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn format(&self) -> Format {
        Format::Adsbx
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    #[tracing::instrument(skip(self, observer))]
    fn fetch_in_area(&self, observer: &GeoRef) -> Result<Vec<AircraftState>, SourceError> {
        trace!("adsbxfeeder::fetch_in_area");

        let url = format!(
            "{}{}/lat/{:.6}/lon/{:.6}/dist/{}/",
            self.base_url,
            self.get,
            observer.lat,
            observer.lon,
            range_nm(observer)
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
        trace!("adsbxfeeder::fetch_by_identity");

        if filter.is_empty() {
            debug!("empty identity filter");
            return Ok(vec![]);
        }

        let mut url = format!("{}{}/", self.base_url, self.get);
        if let Some(icao) = &filter.icao {
            url = format!("{}icao/{}/", url, icao.to_uppercase());
        }
        if let Some(reg) = &filter.registration {
            url = format!("{}registration/{}/", url, reg.to_uppercase());
        }
        if let Some(call) = &filter.callsign {
            url = format!("{}callsign/{}/", url, call.to_uppercase());
        }

        let mut states = self.fetch(&url)?;
        states.retain(|s| filter.matches(s));
        derive_geometry(&mut states, observer);
        Ok(states)
    }
}

/// The RapidAPI gateway to ADS-B Exchange.
///
/// Same dialect as the feeder endpoint but identity queries only take an
/// ICAO address there.
///
#[derive(Clone, Debug)]
pub struct AdsbxRapid {
    pub features: Vec<Capability>,
    pub format: Format,
    pub name: String,
    /// RapidAPI subscription key
    pub api_key: String,
    /// Gateway hostname, derived from `base_url`
    pub host: String,
    pub base_url: String,
    pub get: String,
    pub client: Client,
    pub timeout: Duration,
}

impl AdsbxRapid {
    #[tracing::instrument]
    pub fn new() -> Self {
        trace!("adsbxrapid::new");

        AdsbxRapid {
            features: vec![Capability::Area, Capability::Identity],
            format: Format::Adsbx,
            name: "adsbx".to_owned(),
            api_key: "".to_owned(),
            host: "".to_owned(),
            base_url: "".to_owned(),
            get: "/api/aircraft/json".to_owned(),
            client: Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load some data from in-memory loaded config
    ///
    #[tracing::instrument]
    pub fn load(&mut self, site: &Site) -> &mut Self {
        trace!("adsbxrapid::load");

        self.name = site.name.to_owned();
        self.format = site.format();
        self.base_url = site.base_url.to_owned();
        self.host = site
            .base_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .split('/')
            .next()
            .unwrap_or("")
            .to_owned();
        if let Some(Auth::Key { api_key }) = &site.auth {
            self.api_key = api_key.to_owned();
        } else {
            warn!("adsbx: no RapidAPI key configured");
        }
        if let Some(get) = site.route("get") {
            self.get = get.to_owned();
        }
        self
    }

    fn fetch(&self, url: &str) -> Result<Vec<AircraftState>, SourceError> {
        debug!("adsbx: fetching {}", url);

        if self.api_key.is_empty() {
            return Err(SourceError::Auth("no RapidAPI key".to_owned()));
        }
        let resp = http_get_key!(self, url,
            "X-RapidAPI-Key" => &self.api_key,
            "X-RapidAPI-Host" => &self.host)?;
        decode(&fetch_body(resp)?)
    }
}

impl Default for AdsbxRapid {
    fn default() -> Self {
        Self::new()
    }
}

impl AircraftSource for AdsbxRapid {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn format(&self) -> Format {
        Format::Adsbx
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    #[tracing::instrument(skip(self, observer))]
    fn fetch_in_area(&self, observer: &GeoRef) -> Result<Vec<AircraftState>, SourceError> {
        trace!("adsbxrapid::fetch_in_area");

        let url = format!(
            "{}{}/lat/{:.6}/lon/{:.6}/dist/{}/",
            self.base_url,
            self.get,
            observer.lat,
            observer.lon,
            range_nm(observer)
        );

        let mut states = self.fetch(&url)?;
        derive_geometry(&mut states, observer);
        states.retain(|s| !s.has_position() || s.distance.is_some_and(|d| d <= observer.range));
        Ok(states)
    }

    /// The gateway only understands ICAO identity lookups.
    ///
    #[tracing::instrument(skip(self, observer))]
    fn fetch_by_identity(
        &self,
        observer: &GeoRef,
        filter: &IdentityFilter,
    ) -> Result<Vec<AircraftState>, SourceError> {
        trace!("adsbxrapid::fetch_by_identity");

        if filter.is_empty() {
            debug!("empty identity filter");
            return Ok(vec![]);
        }
        let icao = match &filter.icao {
            Some(icao) => icao,
            None => {
                return Err(SourceError::Provider(
                    "this endpoint only serves ICAO identity lookups".to_owned(),
                ))
            }
        };

        let url = format!("{}{}/icao/{}/", self.base_url, self.get, icao.to_uppercase());

        let mut states = self.fetch(&url)?;
        states.retain(|s| filter.matches(s));
        derive_geometry(&mut states, observer);
        Ok(states)
    }
}
