//! This is the exposed part of the `skywatch-sources` API.
//!
//! [Sources] holds every site from `sources.hcl`, keyed by name.  It knows how
//! to install a default file on first run and to list itself as a table.
//!

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use eyre::Result;
use serde::Deserialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use skywatch_common::{ConfigFile, Versioned};

use crate::{Auth, Site};

/// Default configuration filename
pub const CONFIG: &str = "sources.hcl";

/// On-disk shape of `sources.hcl`.
///
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SourcesConfig {
    /// Version, must match [SourcesConfig::VERSION]
    version: usize,
    /// Site blocks, keyed by label
    site: BTreeMap<String, Site>,
}

impl Versioned for SourcesConfig {
    const VERSION: usize = 1;

    fn version(&self) -> usize {
        self.version
    }
}

/// List of sources, this is the only exposed struct from here.
///
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Sources {
    site: BTreeMap<String, Site>,
}

impl From<BTreeMap<String, Site>> for Sources {
    fn from(value: BTreeMap<String, Site>) -> Self {
        Sources { site: value }
    }
}

impl Sources {
    /// Load the configured sources, from the given file or the default location.
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<&str>) -> Result<Self> {
        let src_file = ConfigFile::<SourcesConfig>::load(fname, CONFIG)?;
        Ok(Sources::from_config(src_file.into_inner()))
    }

    /// Every site learns its own name from the block label.
    ///
    fn from_config(cfg: SourcesConfig) -> Self {
        let all = cfg
            .site
            .into_iter()
            .map(|(n, mut s)| {
                s.name = n.clone();
                (n, s)
            })
            .collect::<BTreeMap<_, _>>();
        Sources::from(all)
    }

    /// Parse sources from an HCL string, mostly for tests.
    ///
    pub fn parse(data: &str) -> Result<Self> {
        let cfg: SourcesConfig = hcl::from_str(data)?;
        Ok(Sources::from_config(cfg))
    }

    /// Install the default `sources.hcl` into place.
    ///
    #[tracing::instrument]
    pub fn install_defaults(dir: &Path) -> std::io::Result<()> {
        if !dir.exists() {
            fs::create_dir_all(dir)?
        }

        let fname = dir.join(CONFIG);
        let content = include_str!("sources.hcl");
        fs::write(fname, content)
    }

    /// Retrieve a site by name.
    ///
    pub fn get(&self, name: &str) -> Option<&Site> {
        self.site.get(name)
    }

    /// How many sites are configured?
    ///
    pub fn len(&self) -> usize {
        self.site.len()
    }

    pub fn is_empty(&self) -> bool {
        self.site.is_empty()
    }

    /// List of currently known sources into a nicely formatted string.
    ///
    #[tracing::instrument(skip(self))]
    pub fn list(&self) -> Result<String> {
        let header = vec!["Name", "Provider", "Format", "URL", "Auth"];

        let mut builder = Builder::default();
        builder.push_record(header);

        self.site.iter().for_each(|(n, s)| {
            let auth = match &s.auth {
                Some(Auth::Login { .. }) => "login",
                Some(Auth::Key { .. }) => "API key",
                Some(Auth::Anon) | None => "open",
            }
            .to_string();
            builder.push_record(vec![n, &s.provider, &s.format, &s.base_url, &auth]);
        });

        let table = builder.build().with(Style::rounded()).to_string();
        let table = format!("Listing all sources:\n{table}");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_default() -> Sources {
        Sources::parse(include_str!("sources.hcl")).unwrap()
    }

    #[test]
    fn test_default_sources_parse() {
        let cfg = set_default();
        assert_eq!(4, cfg.len());
        for name in ["opensky", "adsbx", "adsbx-feeder", "vrs"] {
            let site = cfg.get(name).unwrap();
            assert_eq!(name, site.name);
            assert!(site.provider().is_ok());
        }
    }

    #[test]
    fn test_default_sources_version() {
        let cfg: SourcesConfig = hcl::from_str(include_str!("sources.hcl")).unwrap();
        assert_eq!(SourcesConfig::VERSION, cfg.version());
    }

    #[test]
    fn test_list() {
        let cfg = set_default();
        let out = cfg.list().unwrap();
        assert!(out.contains("opensky"));
        assert!(out.contains("API key"));
        // keys are never printed
        assert!(!out.contains("CHANGEME"));
    }
}
