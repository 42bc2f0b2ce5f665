//! # RasterKit CAM Tools
//!
//! Turns a luminosity bitmap into laser engraving programs.
//!
//! ## Pipeline
//!
//! - **Pixel Field**: decoded 16-bit luminosity buffer with a bottom-left origin
//! - **Spans**: per-row runs of pixels inside the configured "on" range
//! - **Tile Layout**: physical coordinates and serpentine replication across tiles
//! - **G-code Writer**: canonical word order and a lazy laser on/off state machine
//! - **Trigger Stream**: synchronized modulator records with hysteresis compensation
//! - **Cut Path**: square or rounded tile outlines
//! - **Raster Job**: owns the configuration and image and renders all outputs

pub mod config;
pub mod cut_path;
pub mod error;
pub mod gcode_writer;
pub mod pixel_field;
pub mod raster_job;
pub mod spans;
pub mod tile_layout;
pub mod trigger_stream;

// Re-export commonly used items
pub use config::{
    luminosity_from_unit, luminosity_to_unit, RasterConfig, DEFAULT_TRIGGER_HYSTERESIS_STEPS,
};
pub use cut_path::CutPath;
pub use error::{ParameterError, RasterError, RasterResult};
pub use gcode_writer::{Command, GcodeWriter, Value};
pub use pixel_field::PixelField;
pub use raster_job::{OutputPaths, RasterJob, RasterStats};
pub use spans::{build_spans, extract_row, Span};
pub use tile_layout::{PhysicalSpan, ScanDirection, TileLayout, TiledRow};
pub use trigger_stream::{parse_record, TriggerRecord, TriggerWriter};
