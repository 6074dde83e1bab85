//! Main driver, dispatching to the sub-commands.
//!
//! `scan` prints a table of what is overhead right now.  `watch` and `track`
//! run a poll loop in a worker thread and print one JSON line per transition
//! event until interrupted.
//!

use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clap::{crate_authors, crate_version, Parser};
use eyre::{eyre, Result};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::{info, trace};

use skywatch_common::{compass, init_logging, ConfigFile, GeoRef};
use skywatch_formats::AircraftState;
use skywatch_radar::{CycleReport, EventKind, PollLoop, PresenceTracker, TrackerMode};
use skywatch_sources::{
    location_string, IdentityFilter, ReverseGeo, RouteLookup, Site, Sources, SourcesConfig,
    StateFilter,
};

use crate::cli::{Opts, ScanOpts, SubCommand, TrackOpts, WatchOpts};

mod cli;

/// Binary name
pub const NAME: &str = env!("CARGO_BIN_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();
/// Authors
pub const AUTHORS: &str = crate_authors!();

fn main() -> Result<()> {
    let opts = Opts::parse();

    let _guard = init_logging(NAME, opts.verbose, opts.debug, None)?;

    if opts.version {
        println!("{}", version());
        return Ok(());
    }

    match &opts.subcmd {
        SubCommand::Init => {
            let dir = ConfigFile::<SourcesConfig>::config_path();
            Sources::install_defaults(&dir)?;
            println!("default sources installed in {:?}", dir);
            Ok(())
        }
        SubCommand::List => {
            let cfg = Sources::load(opts.config.as_deref())?;
            println!("{}", cfg.list()?);
            Ok(())
        }
        SubCommand::Scan(sopts) => scan(&opts, sopts),
        SubCommand::Watch(wopts) => watch(&opts, wopts),
        SubCommand::Track(topts) => track(&opts, topts),
    }
}

/// Full version string
///
pub fn version() -> String {
    format!("{}/{} by {}", NAME, VERSION, AUTHORS)
}

/// Observer out of CLI options, range comes in km.
///
fn observer(lat: f64, lon: f64, range_km: f64) -> Result<GeoRef> {
    Ok(GeoRef::new(lat, lon, range_km * 1000.)?)
}

fn state_filter(sopts: &ScanOpts) -> StateFilter {
    StateFilter {
        ground_only: sopts.ground,
        airborne_only: sopts.airborne,
        interesting_only: sopts.interesting,
        military_only: sopts.military,
        emergency_only: sopts.emergency,
        squawk: sopts.squawk.clone(),
    }
}

/// One row of the `scan` table.
///
#[derive(Tabled)]
struct Overhead {
    #[tabled(rename = "ICAO")]
    icao: String,
    #[tabled(rename = "Callsign")]
    callsign: String,
    #[tabled(rename = "Reg")]
    registration: String,
    #[tabled(rename = "Alt (m)")]
    altitude: String,
    #[tabled(rename = "Dist (km)")]
    distance: String,
    #[tabled(rename = "Brng")]
    bearing: String,
    #[tabled(rename = "Spd (km/h)")]
    speed: String,
}

impl From<&AircraftState> for Overhead {
    fn from(ac: &AircraftState) -> Self {
        Overhead {
            icao: ac.icao.clone(),
            callsign: ac.callsign.clone(),
            registration: ac.registration.clone(),
            altitude: match ac.altitude() {
                Some(alt) => format!("{:.0}", alt),
                None => "-".to_owned(),
            },
            distance: match ac.distance {
                Some(d) => format!("{:.1}", d / 1000.),
                None => "-".to_owned(),
            },
            bearing: match ac.bearing {
                Some(b) => format!("{} ({:.0})", compass(b), b),
                None => "-".to_owned(),
            },
            speed: format!("{:.0}", ac.ground_speed),
        }
    }
}

/// Handle `scan`: one fetch, one table.
///
fn scan(opts: &Opts, sopts: &ScanOpts) -> Result<()> {
    trace!("scan");

    let cfg = Sources::load(opts.config.as_deref())?;
    let site = Site::load(&sopts.site, &cfg)?;
    let observer = observer(sopts.observer.lat, sopts.observer.lon, sopts.observer.range)?;

    let mut batch = site.fetch_in_area(&observer)?;
    state_filter(sopts).apply(&mut batch);
    info!("{} aircraft in range", batch.len());

    let rows = batch.iter().map(Overhead::from).collect::<Vec<_>>();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{} aircraft within {} km:\n{}", batch.len(), sopts.observer.range, table);
    Ok(())
}

/// Wire TERM/INT to a flag, run the loop in a worker thread and print every
/// report from the channel.
///
fn run_loop(
    mut poll: PollLoop,
    mut on_report: impl FnMut(&CycleReport),
) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    for sig in signal_hook::consts::TERM_SIGNALS {
        signal_hook::flag::register(*sig, Arc::clone(&running))?;
    }

    let (tx, rx) = mpsc::channel();
    let flag = Arc::clone(&running);
    let worker = thread::spawn(move || poll.run(tx, flag));

    for report in rx.iter() {
        on_report(&report);
    }

    worker.join().map_err(|_| eyre!("poll loop panicked"))?;
    Ok(())
}

/// Handle `watch`: poll the area, print transitions as JSON lines.
///
fn watch(opts: &Opts, wopts: &WatchOpts) -> Result<()> {
    trace!("watch");

    let sopts = &wopts.scan;
    let cfg = Sources::load(opts.config.as_deref())?;
    let site = Site::load(&sopts.site, &cfg)?;
    let observer = observer(sopts.observer.lat, sopts.observer.lon, sopts.observer.range)?;

    let tracker = PresenceTracker::new(TrackerMode::Area).with_filter(state_filter(sopts));
    let poll = PollLoop::new(
        site,
        observer,
        tracker,
        Duration::from_secs(wopts.interval),
    );

    run_loop(poll, print_report)?;
    Ok(())
}

/// Handle `track`: follow one airframe, with optional enrichment.
///
fn track(opts: &Opts, topts: &TrackOpts) -> Result<()> {
    trace!("track");

    let filter = IdentityFilter {
        icao: topts.icao.clone(),
        registration: topts.reg.clone(),
        callsign: topts.call.clone(),
    };
    if filter.is_empty() {
        return Err(eyre!("give at least one of --icao, --reg or --call"));
    }

    let cfg = Sources::load(opts.config.as_deref())?;
    let site = Site::load(&topts.site, &cfg)?;
    let observer = observer(topts.observer.lat, topts.observer.lon, topts.observer.range)?;

    let tracker = PresenceTracker::new(TrackerMode::Identity);
    let poll = PollLoop::new(site, observer, tracker, Duration::from_secs(topts.interval))
        .with_target(filter);

    let geocoder = topts.geocode.then(ReverseGeo::new);
    let routes = topts.route.then(RouteLookup::new);

    run_loop(poll, move |report| {
        print_report(report);
        // enrich the present aircraft, best-effort
        let Some(present) = report
            .events
            .iter()
            .find(|e| e.kind == EventKind::Present)
        else {
            return;
        };
        let ac = &present.state;
        if let Some(geocoder) = &geocoder {
            let addr = match (ac.latitude, ac.longitude) {
                (Some(lat), Some(lon)) => geocoder.resolve(lat, lon),
                _ => None,
            };
            println!("# over {}", location_string(ac, addr.as_ref()));
        }
        if let Some(routes) = &routes {
            if let Some(info) = routes.flight_info(&ac.callsign) {
                println!(
                    "# route {} -> {}",
                    info.origin.as_deref().unwrap_or("?"),
                    info.destination.as_deref().unwrap_or("?")
                );
            }
        }
    })?;
    Ok(())
}

/// One JSON line per event, a comment line for the summary.
///
fn print_report(report: &CycleReport) {
    if !report.ok {
        println!(
            "# cycle at {} failed{}",
            report.at,
            if report.degraded { " (degraded: check credentials)" } else { "" }
        );
        return;
    }
    for ev in &report.events {
        if let Ok(line) = serde_json::to_string(ev) {
            println!("{}", line);
        }
    }
    match &report.summary.nearest {
        Some(near) => println!(
            "# {} aircraft, nearest {} at {:.1} km",
            report.summary.count,
            if near.callsign.is_empty() { &near.icao } else { &near.callsign },
            near.distance.unwrap_or(f64::NAN) / 1000.
        ),
        None => println!("# {} aircraft", report.summary.count),
    }
}
