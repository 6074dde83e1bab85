//! OpenSky (.org) specific code
//!
//! The `/states/all` endpoint takes a bounding box so area queries are cheap.
//! Identity queries can pass `icao24` server-side, registration and callsign
//! cannot, so those are filtered client-side after a broad fetch.
//!
//! Anonymous access works with a lower rate limit, basic auth lifts it.
//!

use std::time::Duration;

use clap::{crate_name, crate_version};
use reqwest::blocking::Client;
use tracing::{debug, trace, warn};

use skywatch_common::GeoRef;
use skywatch_formats::{AircraftState, Format, StateList};

use crate::access::{fetch_body, Capability};
use crate::{derive_geometry, http_get, http_get_basic, DEFAULT_TIMEOUT};
use crate::{AircraftSource, Auth, IdentityFilter, Site, SourceError};

/// This is the OpenSky client/source struct.
///
#[derive(Clone, Debug)]
pub struct Opensky {
    /// Describe the different features of the source
    pub features: Vec<Capability>,
    /// Input formats
    pub format: Format,
    /// Name of the site it was loaded from
    pub name: String,
    /// Username, empty for anonymous access
    pub login: String,
    /// Password
    pub password: String,
    /// Base site url taken from config
    pub base_url: String,
    /// Add this to `base_url` to fetch data
    pub get: String,
    /// reqwest blocking client
    pub client: Client,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Opensky {
    #[tracing::instrument]
    pub fn new() -> Self {
        trace!("opensky::new");

        Opensky {
            features: vec![Capability::Area, Capability::Identity],
            format: Format::Opensky,
            name: "opensky".to_owned(),
            login: "".to_owned(),
            password: "".to_owned(),
            base_url: "".to_owned(),
            get: "/states/all".to_owned(),
            client: Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load some data from in-memory loaded config
    ///
    #[tracing::instrument]
    pub fn load(&mut self, site: &Site) -> &mut Self {
        trace!("opensky::load");

        self.name = site.name.to_owned();
        self.format = site.format();
        self.base_url = site.base_url.to_owned();
        if let Some(auth) = &site.auth {
            match auth {
                Auth::Login { username, password } => {
                    self.login = username.to_owned();
                    self.password = password.to_owned();
                }
                Auth::Anon => (),
                _ => warn!("opensky: unsupported auth method, going anonymous"),
            }
        }
        if let Some(get) = site.route("get") {
            self.get = get.to_owned();
        }
        self
    }

    /// One GET, with basic auth when credentials are configured.
    ///
    fn fetch(&self, url: &str) -> Result<Vec<AircraftState>, SourceError> {
        debug!("opensky: fetching {}", url);

        let resp = if self.login.is_empty() {
            http_get!(self, url)?
        } else {
            http_get_basic!(self, url, &self.login, &self.password)?
        };
        let body = fetch_body(resp)?;
        let list = StateList::from_json(&body)?;
        Ok(list.to_states())
    }
}

impl Default for Opensky {
    fn default() -> Self {
        Self::new()
    }
}

impl AircraftSource for Opensky {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn format(&self) -> Format {
        Format::Opensky
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    #[tracing::instrument(skip(self, observer))]
    fn fetch_in_area(&self, observer: &GeoRef) -> Result<Vec<AircraftState>, SourceError> {
        trace!("opensky::fetch_in_area");

        let bbox = observer.bbox();
        let url = format!(
            "{}{}?lamin={:.6}&lomin={:.6}&lamax={:.6}&lomax={:.6}",
            self.base_url, self.get, bbox.min_lat, bbox.min_lon, bbox.max_lat, bbox.max_lon
        );

        let mut states = self.fetch(&url)?;
        derive_geometry(&mut states, observer);
        // the box over-covers, trim to the circle
        states.retain(|s| !s.has_position() || s.distance.is_some_and(|d| d <= observer.range));
        Ok(states)
    }

    #[tracing::instrument(skip(self, observer))]
    fn fetch_by_identity(
        &self,
        observer: &GeoRef,
        filter: &IdentityFilter,
    ) -> Result<Vec<AircraftState>, SourceError> {
        trace!("opensky::fetch_by_identity");

        if filter.is_empty() {
            debug!("empty identity filter");
            return Ok(vec![]);
        }

        // only icao24 narrows things down server-side
        let url = format!("{}{}", self.base_url, self.get);
        let url = match &filter.icao {
            Some(icao) => format!("{}?icao24={}", url, icao.to_lowercase()),
            None => url,
        };

        let mut states = self.fetch(&url)?;
        states.retain(|s| filter.matches(s));
        derive_geometry(&mut states, observer);
        Ok(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Site {
        Site {
            name: "opensky".into(),
            provider: "opensky".into(),
            format: "opensky".into(),
            base_url: "https://opensky-network.org/api".into(),
            auth: Some(Auth::Login {
                username: "somebody".into(),
                password: "secret".into(),
            }),
            routes: Some(
                [("get".to_string(), "/states/all".to_string())]
                    .into_iter()
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_opensky_load() {
        let mut src = Opensky::new();
        let src = src.load(&site());

        assert_eq!("opensky", src.name());
        assert_eq!("somebody", src.login);
        assert_eq!("secret", src.password);
        assert_eq!("https://opensky-network.org/api", src.base_url);
        assert_eq!("/states/all", src.get);
        assert_eq!(Format::Opensky, src.format());
    }

    #[test]
    fn test_opensky_anonymous() {
        let mut site = site();
        site.auth = None;
        let mut src = Opensky::new();
        let src = src.load(&site);
        assert!(src.login.is_empty());
    }
}
