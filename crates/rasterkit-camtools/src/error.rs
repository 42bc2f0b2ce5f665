//! Error types for the raster pipeline.
//!
//! Every failure is structural: a bad configuration, an unreadable image or a
//! pixel buffer that disagrees with its declared size. None of them is
//! retried, and all of them abort the job before an output file is persisted.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while preparing or rendering a raster job.
#[derive(Error, Debug)]
pub enum RasterError {
    /// The configuration was rejected before rendering.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ParameterError),

    /// The image decoder could not produce a pixel buffer.
    #[error("Failed to load image {}: {source}", path.display())]
    ImageLoadFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The pixel buffer length does not equal width x height.
    #[error("Pixel buffer holds {actual} samples, expected {expected} for {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// A render was requested before an image was assigned.
    #[error("No image has been assigned to the job")]
    MissingImage,

    /// I/O error while writing an output stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The configuration could not be encoded for the program header.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A finished temporary output could not be moved into place.
    #[error("Failed to persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Errors related to configuration validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Parameters are mutually incompatible.
    #[error("Incompatible parameters: {0}")]
    Incompatible(String),
}

/// Result type alias for raster operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;
