//! Decoded luminosity buffer.
//!
//! Samples are stored row-major with row 0 at the top of the image, as
//! decoders produce them. Queries use the machine convention instead: `(0, 0)`
//! is the bottom left pixel and Y increases upward.

use crate::config::luminosity_from_unit;
use crate::error::{RasterError, RasterResult};
use image::DynamicImage;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::Path;

/// Immutable 16-bit luminosity image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelField {
    name: String,
    width: u32,
    height: u32,
    pixels: Vec<u16>,
}

impl PixelField {
    /// Wrap a row-major buffer, checking it holds exactly `width * height` samples.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<u16>,
    ) -> RasterResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(RasterError::DimensionMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            width,
            height,
            pixels,
        })
    }

    /// Build a field from float luminosities in `0.0..=1.0`.
    pub fn from_unit_floats(
        name: impl Into<String>,
        width: u32,
        height: u32,
        values: &[f64],
    ) -> RasterResult<Self> {
        let pixels = values.iter().map(|&f| luminosity_from_unit(f)).collect();
        Self::new(name, width, height, pixels)
    }

    /// Convert a decoded image to 16-bit luminosity.
    pub fn from_image(name: impl Into<String>, img: &DynamicImage) -> RasterResult<Self> {
        let luma = img.to_luma16();
        let (width, height) = luma.dimensions();
        Self::new(name, width, height, luma.into_raw())
    }

    /// Decode an image file. The field is named after the file name.
    pub fn open<P: AsRef<Path>>(path: P) -> RasterResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| RasterError::ImageLoadFailure {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        tracing::debug!(
            "Loaded {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        Self::from_image(name, &img)
    }

    /// Display name, usually the source file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw row-major samples, top row first.
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Pixel at `x`, `y` with `y = 0` the bottom row.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width {
            return None;
        }
        self.row(y).map(|row| row[x as usize])
    }

    /// Row `y` counted from the bottom.
    pub fn row(&self, y: u32) -> Option<&[u16]> {
        if y >= self.height {
            return None;
        }
        let top_index = (self.height - 1 - y) as usize;
        let start = top_index * self.width as usize;
        Some(&self.pixels[start..start + self.width as usize])
    }

    /// Rows from the bottom of the image upward.
    pub fn rows_bottom_up(&self) -> impl Iterator<Item = &[u16]> + '_ {
        (0..self.height).filter_map(move |y| self.row(y))
    }

    /// Hash of dimensions and samples.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash_content(&mut hasher);
        hasher.finish()
    }

    pub(crate) fn hash_content<H: Hasher>(&self, state: &mut H) {
        self.width.hash(state);
        self.height.hash(state);
        self.pixels.hash(state);
    }
}
