//! Names for the supported provider payload formats.
//!

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

/// The `Format` enum represents the provider payload formats skywatch can normalize.
///
/// - `None`: default, absence of a format.
/// - `Opensky`: state vectors from the OpenSky Network `/states/all` API.
/// - `Adsbx`: ADS-B Exchange JSON aircraft list (feeder and RapidAPI endpoints).
/// - `Vrs`: Virtual Radar Server `AircraftList.json`.
///
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, EnumString, Eq, PartialEq, Serialize, VariantNames,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    None,
    Opensky,
    Adsbx,
    Vrs,
}

impl Format {
    /// Unknown names degrade to `None`, the registry rejects them later.
    ///
    /// This is not a `From<&str>` impl, that would collide with the
    /// `TryFrom` the `EnumString` derive brings in.
    ///
    pub fn from_name(value: &str) -> Self {
        Format::from_str(value).unwrap_or(Format::None)
    }
}
