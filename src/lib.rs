//! # RasterKit
//!
//! Converts a bitmap into the three files a galvo-less laser raster job needs:
//! - a motion program (`.raster.ngc`) that sweeps the X axis across every
//!   row that has something to engrave
//! - a trigger stream (`.raster.gmask`) that switches the beam on and off at
//!   exact X positions in step with the motion program
//! - a cut-out program (`.cut.ngc`) that cuts around every tile
//!
//! ## Architecture
//!
//! 1. **rasterkit-core** - Axis and unit types
//! 2. **rasterkit-camtools** - Span extraction, tile layout, program emission
//! 3. **rasterkit-settings** - Job settings files and command line overrides
//! 4. **rasterkit** - Command line binary and logging setup

pub mod cli;

pub use rasterkit_camtools::{
    OutputPaths, PixelField, RasterConfig, RasterError, RasterJob, RasterResult, RasterStats,
};
pub use rasterkit_core::MeasurementSystem;
pub use rasterkit_settings::{JobSettings, SettingsError, SettingsOverrides};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, leaving stdout for generated settings
/// - RUST_LOG environment variable support
/// - `info` level by default, `debug` when requested
pub fn init_logging(debug: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(debug)
        .with_level(true)
        .with_line_number(debug);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
