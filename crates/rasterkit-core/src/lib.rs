//! # RasterKit Core
//!
//! Core types and utilities shared by the RasterKit crates.
//! Provides machine axis identifiers, direction-agnostic iteration helpers
//! and measurement system handling.

pub mod types;
pub mod units;

pub use types::{Axis, BoxedIterator};
pub use units::{get_unit_label, MeasurementSystem};
