//! Best-effort flight information enrichment.
//!
//! FlightAware publishes route details in the `<meta>` tags of its live
//! tracking pages, no API key needed.  This is scraped, so everything here is
//! best-effort: any failure (network, odd status, missing tags) yields `None`
//! and the caller carries on without enrichment.
//!

use std::time::Duration;

use clap::{crate_name, crate_version};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, trace};

use crate::{http_get, DEFAULT_TIMEOUT};

const FLIGHTAWARE_URL: &str = "https://flightaware.com/live/flight";

/// Route details scraped from a tracking page.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlightInfo {
    /// Origin airport ICAO code
    pub origin: Option<String>,
    /// Destination airport ICAO code
    pub destination: Option<String>,
    /// Operating airline
    pub airline: Option<String>,
    /// Aircraft type code
    pub aircraft_type: Option<String>,
}

/// Scraper for flight route information, keyed by callsign.
///
#[derive(Clone, Debug)]
pub struct RouteLookup {
    pub base_url: String,
    pub client: Client,
    pub timeout: Duration,
}

impl Default for RouteLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteLookup {
    pub fn new() -> Self {
        RouteLookup {
            base_url: FLIGHTAWARE_URL.to_owned(),
            client: Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Look a callsign up.  `None` on any failure, this is decoration only.
    ///
    #[tracing::instrument(skip(self))]
    pub fn flight_info(&self, callsign: &str) -> Option<FlightInfo> {
        trace!("routelookup::flight_info");

        if callsign.is_empty() {
            return None;
        }
        let url = format!("{}/{}", self.base_url, callsign);
        let resp = http_get!(self, url).ok()?;
        // the page may answer with a redirect to itself
        if resp.status() != StatusCode::OK && resp.status() != StatusCode::MOVED_PERMANENTLY {
            debug!("flight info: status {}", resp.status());
            return None;
        }
        let body = resp.text().ok()?;

        let info = FlightInfo {
            origin: meta_content(&body, "origin"),
            destination: meta_content(&body, "destination"),
            airline: meta_content(&body, "airline"),
            aircraft_type: meta_content(&body, "aircrafttype"),
        };
        if info == FlightInfo::default() {
            return None;
        }
        Some(info)
    }
}

/// Extract `content="..."` from the first `<meta ... name="{name}" ...>` tag.
///
fn meta_content(body: &str, name: &str) -> Option<String> {
    let needle = format!("name=\"{}\"", name);
    for (pos, _) in body.match_indices("<meta") {
        let end = body[pos..].find('>').map(|e| pos + e)?;
        let tag = &body[pos..end];
        if !tag.contains(&needle) {
            continue;
        }
        let content = tag.split("content=\"").nth(1)?;
        let content = content.split('"').next()?;
        if content.is_empty() {
            return None;
        }
        return Some(content.to_owned());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<html><head>
      <meta name="title" content="KLM605 (Boeing 747) - KLM Royal Dutch Airlines" />
      <meta property="og:description" content="Track KLM605 flight" />
      <meta name="origin" content="EHAM" />
      <meta name="destination" content="KSFO" />
      <meta name="airline" content="KLM" />
      <meta name="aircrafttype" content="B744" />
    </head><body></body></html>"##;

    #[test]
    fn test_meta_content() {
        assert_eq!(Some("EHAM".to_string()), meta_content(PAGE, "origin"));
        assert_eq!(Some("KSFO".to_string()), meta_content(PAGE, "destination"));
        assert_eq!(Some("B744".to_string()), meta_content(PAGE, "aircrafttype"));
        assert_eq!(None, meta_content(PAGE, "nonesuch"));
    }

    #[test]
    fn test_meta_content_empty_value() {
        let page = r##"<meta name="origin" content="" />"##;
        assert_eq!(None, meta_content(page, "origin"));
    }

    #[test]
    fn test_flight_info_empty_callsign() {
        let lookup = RouteLookup::new();
        assert!(lookup.flight_info("").is_none());
    }
}
