//! Job settings management for RasterKit
//!
//! Job settings files mirror [`RasterConfig`] in a form that is convenient to
//! write by hand: every key is optional and falls back to its default, the
//! on range is given as float luminosity in `0.0..=1.0`, and the tile size
//! is a table whose missing entries are derived from the image.
//!
//! Supports JSON and TOML files, picked by extension.

pub mod error;

pub use error::{SettingsError, SettingsResult};

use rasterkit_camtools::{
    luminosity_from_unit, luminosity_to_unit, ParameterError, RasterConfig, RasterError,
};
pub use rasterkit_core::MeasurementSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file picked up from the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "rasterkit.toml";

/// Per-axis tile size; `None` derives the size from the image
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileSize {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// Raster job settings as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    /// Dots per unit of the device, X and Y
    pub dpi: [f64; 2],
    /// Luminosity range (0.0 - 1.0) for which the laser is on
    pub on_range: [f64; 2],
    /// Distance the X axis travels past the outer span boundaries
    pub overshoot: f64,
    /// Bottom left corner of the bottom left tile; X must be >= overshoot
    pub offset: [f64; 2],
    /// Number of tiles along X and Y
    pub repeat: [u32; 2],
    /// Gap between repeated tiles
    pub tile_spacing: [f64; 2],
    /// Scan feed rate while engraving
    pub feed: f64,
    /// Feed rate for cutting out tiles
    pub cut_feed: f64,
    /// Cut-out corner radius, 0 for square corners
    pub corner_radius: f64,
    /// Linear unit of all lengths
    pub units: MeasurementSystem,
    /// Trigger stream shift in scan-axis pixel steps
    pub trigger_hysteresis_steps: f64,
    /// Tile size, derived from the image where unset
    pub tile_size: TileSize,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self::from_raster_config(&RasterConfig::default())
    }
}

/// Values given on the command line, applied over a settings file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    pub dpi: Option<[f64; 2]>,
    pub on_range: Option<[f64; 2]>,
    pub overshoot: Option<f64>,
    pub offset: Option<[f64; 2]>,
    pub repeat: Option<[u32; 2]>,
    pub tile_spacing: Option<[f64; 2]>,
    pub feed: Option<f64>,
    pub cut_feed: Option<f64>,
    pub corner_radius: Option<f64>,
    pub units: Option<MeasurementSystem>,
}

impl JobSettings {
    /// Settings equivalent to an existing configuration.
    pub fn from_raster_config(config: &RasterConfig) -> Self {
        Self {
            dpi: config.dpi,
            on_range: [
                luminosity_to_unit(config.on_range.0),
                luminosity_to_unit(config.on_range.1),
            ],
            overshoot: config.overshoot,
            offset: config.offset,
            repeat: config.repeat,
            tile_spacing: config.tile_spacing,
            feed: config.feed,
            cut_feed: config.cut_feed,
            corner_radius: config.corner_radius,
            units: config.units,
            trigger_hysteresis_steps: config.trigger_hysteresis_steps,
            tile_size: TileSize {
                x: config.tile_size[0],
                y: config.tile_size[1],
            },
        }
    }

    /// Load settings from a `.json` or `.toml` file.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let settings = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(SettingsError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load [`DEFAULT_SETTINGS_FILE`] from `dir` if it exists.
    pub fn try_load_default(dir: &Path) -> SettingsResult<Option<Self>> {
        let path = dir.join(DEFAULT_SETTINGS_FILE);
        if path.exists() {
            Self::load_from_file(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Save settings, format chosen by extension.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => self.to_toml_string()?,
            other => {
                return Err(SettingsError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> SettingsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply every value that is set in `overrides`.
    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        let o = overrides;
        if let Some(v) = o.dpi {
            self.dpi = v;
        }
        if let Some(v) = o.on_range {
            self.on_range = v;
        }
        if let Some(v) = o.overshoot {
            self.overshoot = v;
        }
        if let Some(v) = o.offset {
            self.offset = v;
        }
        if let Some(v) = o.repeat {
            self.repeat = v;
        }
        if let Some(v) = o.tile_spacing {
            self.tile_spacing = v;
        }
        if let Some(v) = o.feed {
            self.feed = v;
        }
        if let Some(v) = o.cut_feed {
            self.cut_feed = v;
        }
        if let Some(v) = o.corner_radius {
            self.corner_radius = v;
        }
        if let Some(v) = o.units {
            self.units = v;
        }
    }

    /// Convert to a validated raster configuration.
    pub fn to_raster_config(&self) -> SettingsResult<RasterConfig> {
        let bounds = [
            ("on_range.min", self.on_range[0]),
            ("on_range.max", self.on_range[1]),
        ];
        for (name, value) in bounds {
            if !(0.0..=1.0).contains(&value) {
                return Err(RasterError::from(ParameterError::OutOfRange {
                    name: name.to_string(),
                    value,
                    min: 0.0,
                    max: 1.0,
                })
                .into());
            }
        }

        let config = RasterConfig {
            dpi: self.dpi,
            on_range: (
                luminosity_from_unit(self.on_range[0]),
                luminosity_from_unit(self.on_range[1]),
            ),
            overshoot: self.overshoot,
            offset: self.offset,
            repeat: self.repeat,
            tile_size: [self.tile_size.x, self.tile_size.y],
            tile_spacing: self.tile_spacing,
            feed: self.feed,
            cut_feed: self.cut_feed,
            corner_radius: self.corner_radius,
            units: self.units,
            trigger_hysteresis_steps: self.trigger_hysteresis_steps,
        };
        config.validate().map_err(RasterError::from)?;
        Ok(config)
    }
}
