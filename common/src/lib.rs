//! This library is there to share some common code amongst all skywatch modules.
//!

mod config;
mod logging;
mod position;

#[macro_use]
mod macros;

pub use config::*;
pub use logging::*;
pub use position::*;

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
