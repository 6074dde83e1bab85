//! Module describing all possible commands and sub-commands to the `radarctl`
//! main driver.
//!
//! We have four main commands:
//!
//! - `list` shows the configured sources
//! - `scan` does one fetch and prints what is currently overhead
//! - `watch` polls an area and reports presence transitions
//! - `track` follows one airframe by ICAO, registration or callsign
//!
//! `init` installs the default `sources.hcl` in the configuration directory.
//!
//! An observer is a lat/lon pair plus a range in km, every command that talks
//! to a provider takes one.
//!

use clap::{crate_authors, crate_description, crate_name, crate_version, Parser};

/// CLI options
#[derive(Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// configuration file.
    #[clap(short = 'c', long)]
    pub config: Option<String>,
    /// debug mode.
    #[clap(short = 'D', long = "debug")]
    pub debug: bool,
    /// Verbose mode.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Display utility full version.
    #[clap(short = 'V', long)]
    pub version: bool,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

// ------

/// All sub-commands:
///
/// `list`
/// `init`
/// `scan --lat .. --lon .. [--range ..] site`
/// `watch --lat .. --lon .. [--range ..] [-i SECS] site`
/// `track --lat .. --lon .. (--icao ..|--reg ..|--call ..) site`
///
#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Install default configuration files
    Init,
    /// List all configured sources
    List,
    /// One-shot scan of the area around the observer
    Scan(ScanOpts),
    /// Poll the area and report transitions until interrupted
    Watch(WatchOpts),
    /// Follow one airframe until interrupted
    Track(TrackOpts),
}

// ------

/// Observer position and range, shared by every fetching command.
///
#[derive(Debug, Parser)]
pub struct ObserverOpts {
    /// Observer latitude in decimal degrees.
    #[clap(long, allow_hyphen_values = true)]
    pub lat: f64,
    /// Observer longitude in decimal degrees.
    #[clap(long, allow_hyphen_values = true)]
    pub lon: f64,
    /// Range around the observer in km.
    #[clap(short = 'r', long, default_value = "25")]
    pub range: f64,
}

/// Options for a one-shot area scan.
///
#[derive(Debug, Parser)]
pub struct ScanOpts {
    #[clap(flatten)]
    pub observer: ObserverOpts,
    /// Airborne aircraft only.
    #[clap(long)]
    pub airborne: bool,
    /// Aircraft on the ground only.
    #[clap(long, conflicts_with = "airborne")]
    pub ground: bool,
    /// Military airframes only.
    #[clap(long)]
    pub military: bool,
    /// Aircraft with the SPI flag only.
    #[clap(long)]
    pub interesting: bool,
    /// Aircraft squawking an emergency only.
    #[clap(long)]
    pub emergency: bool,
    /// Aircraft squawking exactly this code only.
    #[clap(long)]
    pub squawk: Option<String>,
    /// site name
    pub site: String,
}

/// Options for a continuous area watch.
///
#[derive(Debug, Parser)]
pub struct WatchOpts {
    #[clap(flatten)]
    pub scan: ScanOpts,
    /// Poll interval in seconds.
    #[clap(short = 'i', long, default_value = "30")]
    pub interval: u64,
}

/// Options for following one airframe.
///
#[derive(Debug, Parser)]
pub struct TrackOpts {
    #[clap(flatten)]
    pub observer: ObserverOpts,
    /// ICAO 24-bit hex address.
    #[clap(long)]
    pub icao: Option<String>,
    /// Tail registration.
    #[clap(long)]
    pub reg: Option<String>,
    /// Flight callsign.
    #[clap(long)]
    pub call: Option<String>,
    /// Poll interval in seconds.
    #[clap(short = 'i', long, default_value = "60")]
    pub interval: u64,
    /// Resolve the aircraft position into a place name.
    #[clap(long)]
    pub geocode: bool,
    /// Look the route up on FlightAware.
    #[clap(long)]
    pub route: bool,
    /// site name
    pub site: String,
}
