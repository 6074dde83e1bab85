//!  Module that defines what is a site (API endpoint of a provider).
//!
//! This is used to configure the list of possible sources through `sources.hcl`.
//!
//! Sites can have different ways to authenticate (or not) the request, some use
//! an API key in a header, one takes plain login/password.  A site names its
//! provider, which selects the adapter, and its format, which names the payload
//! dialect.  Two sites may share a format but not an adapter (the two ADS-B
//! Exchange endpoints differ only in authentication and URL scheme).
//!

use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;
use tracing::trace;

use skywatch_formats::Format;

use crate::access::{AdsbxFeeder, AdsbxRapid, Opensky, Vrs};
use crate::sources::Sources;
use crate::{AircraftSource, SourceError};

/// Known providers, each with its adapter.
///
#[derive(Clone, Copy, Debug, EnumString, PartialEq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Provider {
    Opensky,
    AdsbxFeeder,
    AdsbxRapid,
    Vrs,
}

/// Describe what a site is and associated credentials.
///
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Site {
    /// Name of the site
    #[serde(default)]
    pub name: String,
    /// Which adapter talks to it
    pub provider: String,
    /// Payload dialect
    pub format: String,
    /// Base URL (to avoid repeating)
    pub base_url: String,
    /// Credentials
    pub auth: Option<Auth>,
    /// Different URLs available
    pub routes: Option<BTreeMap<String, String>>,
}

/// Describe the possible ways to authenticate oneself
///
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Auth {
    /// Nothing special, no auth
    #[default]
    Anon,
    /// Using an API key supplied through a header
    Key { api_key: String },
    /// Using plain login/password
    Login { username: String, password: String },
}

impl Display for Auth {
    /// Obfuscate the passwords & keys
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let auth = match self.clone() {
            Auth::Key { .. } => Auth::Key {
                api_key: "HIDDEN".to_string(),
            },
            Auth::Login { username, .. } => Auth::Login {
                username,
                password: "HIDDEN".to_string(),
            },
            Auth::Anon => Auth::Anon,
        };
        write!(f, "{:?}", auth)
    }
}

macro_rules! insert_provider {
    ($name:ident, $prov:ident, $site:ident, $($list:ident),+)  => {
        match $prov {
        $(
            Provider::$list => {
                let s = $list::new().load($site).clone();
                Ok(Box::new(s) as Box<dyn AircraftSource>)
            },
        )+
        }
    }
}

impl Site {
    /// Basic `new()`
    ///
    pub fn new() -> Self {
        Site::default()
    }

    /// Load site by checking whether it is present in the configuration file
    ///
    pub fn load(name: &str, cfg: &Sources) -> Result<Box<dyn AircraftSource>, SourceError> {
        trace!("loading site {}", name);
        match cfg.get(name) {
            Some(site) => {
                let prov = site.provider()?;
                insert_provider!(name, prov, site, Opensky, AdsbxFeeder, AdsbxRapid, Vrs)
            }
            None => Err(SourceError::UnknownSite(name.to_owned())),
        }
    }

    /// Return the adapter selector
    ///
    pub fn provider(&self) -> Result<Provider, SourceError> {
        Provider::from_str(&self.provider)
            .map_err(|_| SourceError::UnknownSite(format!("{}: provider {}", self.name, self.provider)))
    }

    /// Return the payload format
    ///
    pub fn format(&self) -> Format {
        Format::from_name(&self.format)
    }

    /// Return the list of routes
    ///
    pub fn list(&self) -> Vec<&String> {
        match &self.routes {
            Some(routes) => routes.keys().collect::<Vec<_>>(),
            _ => vec![],
        }
    }

    /// Check whether site has the mentioned route
    ///
    pub fn has(&self, meth: &str) -> bool {
        match &self.routes {
            Some(routes) => routes.contains_key(meth),
            _ => false,
        }
    }

    /// Retrieve a route
    ///
    pub fn route(&self, key: &str) -> Option<&String> {
        match &self.routes {
            Some(routes) => routes.get(key),
            _ => None,
        }
    }
}

impl Display for Site {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let auth = match self.auth.clone() {
            Some(auth) => auth,
            _ => Auth::Anon,
        };
        write!(
            f,
            "{{ provider={} format={} url={} auth={} routes={:?} }}",
            self.provider, self.format, self.base_url, auth, self.routes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_default() -> Sources {
        Sources::parse(include_str!("sources.hcl")).unwrap()
    }

    #[test]
    fn test_site_load_good() {
        let cfg = set_default();

        let s = Site::load("opensky", &cfg);
        assert!(s.is_ok());
        let s = s.unwrap();
        assert_eq!("opensky", s.name());
        assert_eq!(Format::Opensky, s.format());
    }

    #[test]
    fn test_site_load_unknown() {
        let cfg = set_default();

        let s = Site::load("bar", &cfg);
        assert!(matches!(s, Err(SourceError::UnknownSite(_))));
    }

    #[test]
    fn test_site_bad_provider() {
        let site = Site {
            name: "weird".into(),
            provider: "nonesuch".into(),
            ..Default::default()
        };
        assert!(site.provider().is_err());
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(Provider::AdsbxRapid, Provider::from_str("adsbx-rapid").unwrap());
        assert_eq!("adsbx-feeder", Provider::AdsbxFeeder.to_string());
    }

    #[test]
    fn test_auth_obfuscation() {
        let auth = Auth::Login {
            username: "somebody".into(),
            password: "secret".into(),
        };
        let out = format!("{}", auth);
        assert!(out.contains("somebody"));
        assert!(!out.contains("secret"));

        let auth = Auth::Key {
            api_key: "deadbeef".into(),
        };
        assert!(!format!("{}", auth).contains("deadbeef"));
    }
}
