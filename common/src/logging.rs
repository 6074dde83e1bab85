//! Common logging initializer
//!

use eyre::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_tree::HierarchicalLayer;

/// Guard for the rolling file appender, keep it alive for the duration of
/// the program or the file layer silently drops events.
///
pub type LogGuard = Option<tracing_appender::non_blocking::WorkerGuard>;

/// Default level from the `-v` count, `RUST_LOG` still wins when set.
///
pub fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

#[tracing::instrument]
pub fn init_logging(
    name: &'static str,
    verbose: u8,
    use_tree: bool,
    use_file: Option<String>,
) -> Result<LogGuard> {
    // Load filters from environment, fall back on the verbosity count
    //
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    // Do we want hierarchical output?
    //
    let tree = if use_tree {
        Some(
            HierarchicalLayer::new(2)
                .with_ansi(true)
                .with_targets(true)
                .with_bracketed_fields(true),
        )
    } else {
        None
    };

    // Plain compact console layer when the tree is off
    //
    let console = if use_tree {
        None
    } else {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
    };

    // Log to file?
    //
    let (file, guard) = if let Some(dir) = use_file {
        // Basic append-only rolling file for all traces.
        //
        let appender = tracing_appender::rolling::hourly(dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        )
    } else {
        (None, None)
    };

    // Combine filters & layers
    //
    tracing_subscriber::registry()
        .with(filter)
        .with(tree)
        .with(console)
        .with(file)
        .init();

    Ok(guard)
}
