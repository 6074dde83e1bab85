//! Actual provider adapters.
//!
//! One module per provider endpoint, all implementing [crate::AircraftSource].
//!

use reqwest::blocking::Response;
use reqwest::StatusCode;
use strum::Display;

use crate::SourceError;

pub use adsbx::*;
pub use enrich::*;
pub use geocode::*;
pub use opensky::*;
pub use vrs::*;

mod adsbx;
mod enrich;
mod geocode;
mod opensky;
mod vrs;

/// What a given source is able to serve.
///
#[derive(Clone, Copy, Debug, Display, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Capability {
    /// Everything within an area around the observer
    Area,
    /// Specific airframes by identity
    Identity,
}

/// Common status handling, turns an HTTP answer into its body.
///
/// 401/403 are authentication failures, anything else but 200 is reported as
/// a provider error with the status code.
///
pub(crate) fn fetch_body(resp: Response) -> Result<String, SourceError> {
    match resp.status() {
        StatusCode::OK => Ok(resp.text()?),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(SourceError::Auth(format!("status {}", resp.status())))
        }
        code => Err(SourceError::Provider(format!("status {}", code))),
    }
}
