//! This is the `ConfigFile` struct.
//!
//! This is for finding the right default locations for the various configuration files of
//! `skywatch`.  This is a configuration file/struct neutral loading engine, storing only the
//! base directory and the parsed content, available through `inner()`/`into_inner()`.
//!
//! Every configuration struct carries an explicit version number checked on load, so a stale
//! file fails loudly instead of silently mis-parsing.
//!

use std::fmt::Debug;
use std::path::PathBuf;
use std::{env, fs};

use directories::BaseDirs;
use eyre::{eyre, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::makepath;

/// Main name for the directory base
const TAG: &str = "skywatch";

/// Every versioned configuration file declares its current version and exposes the one
/// found in the file.
///
pub trait Versioned {
    /// Version expected by this build
    const VERSION: usize;
    /// Version found in the file
    fn version(&self) -> usize;
}

/// Wrapper around a loaded configuration struct, remembering where it came from.
///
#[derive(Debug)]
pub struct ConfigFile<T: Debug + DeserializeOwned + Versioned> {
    /// This is the base directory for all files.
    basedir: PathBuf,
    inner: T,
}

impl<T> ConfigFile<T>
where
    T: Debug + DeserializeOwned + Versioned,
{
    /// Returns the default config directory for the platform.
    ///
    pub fn config_path() -> PathBuf {
        match BaseDirs::new() {
            Some(base) => {
                #[cfg(unix)]
                let base = base.home_dir().join(".config").to_string_lossy().to_string();

                #[cfg(windows)]
                let base = base.data_local_dir().to_string_lossy().to_string();

                debug!("base = {base}");
                let base: PathBuf = makepath!(base, TAG);
                base
            }
            None => {
                #[cfg(unix)]
                let homedir = env::var("HOME").unwrap_or_else(|_| ".".to_string());

                #[cfg(windows)]
                let homedir = env::var("LOCALAPPDATA").unwrap_or_else(|_| ".".to_string());

                #[cfg(unix)]
                let base: PathBuf = makepath!(homedir, ".config", TAG);

                #[cfg(windows)]
                let base: PathBuf = makepath!(homedir, TAG);

                base
            }
        }
    }

    /// Load a configuration file and check its version.
    ///
    /// Search path:
    /// - file specified on the CLI, if any
    /// - `default_name` inside the default basedir
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<&str>, default_name: &str) -> Result<ConfigFile<T>> {
        trace!("loading {default_name}");

        let basedir = Self::config_path();
        let fname = match fname {
            Some(fname) => PathBuf::from(fname),
            None => basedir.join(default_name),
        };
        debug!("config = {fname:?}");

        let data = fs::read_to_string(&fname)?;
        let inner: T = hcl::from_str(&data)?;
        if inner.version() != T::VERSION {
            return Err(eyre!(
                "bad version in {:?}: found {}, expected {}",
                fname,
                inner.version(),
                T::VERSION
            ));
        }
        Ok(ConfigFile { basedir, inner })
    }

    /// Returns the base directory the file was resolved against.
    ///
    #[inline]
    pub fn root(&self) -> PathBuf {
        self.basedir.clone()
    }

    /// Borrow the parsed configuration.
    ///
    #[inline]
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consume the wrapper.
    ///
    #[inline]
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        version: usize,
        name: String,
    }

    impl Versioned for TestConfig {
        const VERSION: usize = 2;

        fn version(&self) -> usize {
            self.version
        }
    }

    #[test]
    fn test_load_good_version() -> Result<()> {
        let tmp = env::temp_dir().join("skywatch-config-ok.hcl");
        fs::write(&tmp, "version = 2\nname = \"foo\"\n")?;

        let cfg = ConfigFile::<TestConfig>::load(Some(&tmp.to_string_lossy()), "unused.hcl")?;
        assert_eq!("foo", cfg.inner().name);
        Ok(())
    }

    #[test]
    fn test_load_bad_version() -> Result<()> {
        let tmp = env::temp_dir().join("skywatch-config-bad.hcl");
        fs::write(&tmp, "version = 1\nname = \"foo\"\n")?;

        let cfg = ConfigFile::<TestConfig>::load(Some(&tmp.to_string_lossy()), "unused.hcl");
        assert!(cfg.is_err());
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let cfg = ConfigFile::<TestConfig>::load(Some("/nonexistent/nope.hcl"), "unused.hcl");
        assert!(cfg.is_err());
    }
}
