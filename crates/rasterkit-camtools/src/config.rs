//! Raster job configuration.
//!
//! All lengths share the unit selected by [`RasterConfig::units`].

use crate::error::{ParameterError, ParameterResult};
use rasterkit_core::{Axis, MeasurementSystem};
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// Trigger stream shift in scan-axis pixel steps.
///
/// Tuned for the latency between the modulator reading a trigger record and
/// the beam reaching that X position. Override with
/// [`RasterConfig::trigger_hysteresis_steps`] for other hardware.
pub const DEFAULT_TRIGGER_HYSTERESIS_STEPS: f64 = -0.5;

/// Full-scale luminosity value.
pub const MAX_LUMINOSITY: u16 = u16::MAX;

/// Encode a float luminosity in `0.0..=1.0` as a 16-bit sample.
pub fn luminosity_from_unit(f: f64) -> u16 {
    (f.clamp(0.0, 1.0) * MAX_LUMINOSITY as f64).round() as u16
}

/// Decode a 16-bit sample to a float luminosity in `0.0..=1.0`.
pub fn luminosity_to_unit(pixel: u16) -> f64 {
    pixel as f64 / MAX_LUMINOSITY as f64
}

/// Raster engraving parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterConfig {
    /// Device resolution in dots per unit, X and Y
    pub dpi: [f64; 2],
    /// Inclusive luminosity range for which the laser is on
    pub on_range: (u16, u16),
    /// Travel past the outer span boundaries so the X axis is at speed
    pub overshoot: f64,
    /// Bottom left corner of the bottom left tile
    pub offset: [f64; 2],
    /// Tile counts along X and Y
    pub repeat: [u32; 2],
    /// Tile size; `None` derives it from the image extent
    pub tile_size: [Option<f64>; 2],
    /// Gap between repeated tiles
    pub tile_spacing: [f64; 2],
    /// Scan feed rate while engraving
    pub feed: f64,
    /// Feed rate while cutting out tiles
    pub cut_feed: f64,
    /// Cut-out corner radius, 0 for square corners
    pub corner_radius: f64,
    /// Linear unit of every length above
    pub units: MeasurementSystem,
    /// Trigger stream shift in scan-axis pixel steps
    pub trigger_hysteresis_steps: f64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            dpi: [500.0, 500.0],
            on_range: (0, luminosity_from_unit(0.5)),
            overshoot: 0.5,
            offset: [1.0, 1.0],
            repeat: [1, 1],
            tile_size: [None, None],
            tile_spacing: [0.125, 0.125],
            feed: 120.0,
            cut_feed: 20.0,
            corner_radius: 0.0,
            units: MeasurementSystem::Imperial,
            trigger_hysteresis_steps: DEFAULT_TRIGGER_HYSTERESIS_STEPS,
        }
    }
}

impl RasterConfig {
    /// Size of one device step per axis (`1 / dpi`).
    pub fn scale(&self) -> [f64; 2] {
        [1.0 / self.dpi[0], 1.0 / self.dpi[1]]
    }

    /// Step size along one axis.
    pub fn axis_scale(&self, axis: Axis) -> f64 {
        1.0 / self.dpi[axis.index()]
    }

    /// Trigger stream position shift in length units.
    pub fn trigger_hysteresis(&self) -> f64 {
        self.trigger_hysteresis_steps * self.axis_scale(Axis::X)
    }

    /// True when `luminosity` falls inside the inclusive on range.
    pub fn is_on(&self, luminosity: u16) -> bool {
        self.on_range.0 <= luminosity && luminosity <= self.on_range.1
    }

    /// Check every invariant that does not depend on the image.
    pub fn validate(&self) -> ParameterResult<()> {
        for axis in Axis::ALL {
            let i = axis.index();
            let dpi = self.dpi[i];
            if !dpi.is_finite() || dpi <= 0.0 {
                return Err(ParameterError::OutOfRange {
                    name: format!("dpi.{}", axis),
                    value: dpi,
                    min: 0.0,
                    max: f64::INFINITY,
                });
            }
            if self.repeat[i] == 0 {
                return Err(ParameterError::InvalidValue {
                    name: format!("repeat.{}", axis),
                    reason: "must be at least 1".to_string(),
                });
            }
            let spacing = self.tile_spacing[i];
            if !spacing.is_finite() || spacing < 0.0 {
                return Err(non_negative(format!("tile_spacing.{}", axis), spacing));
            }
            if !self.offset[i].is_finite() {
                return Err(not_finite(format!("offset.{}", axis)));
            }
            if let Some(size) = self.tile_size[i] {
                if !size.is_finite() || size <= 0.0 {
                    return Err(ParameterError::OutOfRange {
                        name: format!("tile_size.{}", axis),
                        value: size,
                        min: 0.0,
                        max: f64::INFINITY,
                    });
                }
            }
        }

        if self.on_range.0 > self.on_range.1 {
            return Err(ParameterError::InvalidValue {
                name: "on_range".to_string(),
                reason: format!(
                    "minimum {} is above maximum {}",
                    self.on_range.0, self.on_range.1
                ),
            });
        }

        if !self.overshoot.is_finite() || self.overshoot < 0.0 {
            return Err(non_negative("overshoot".to_string(), self.overshoot));
        }
        if !self.corner_radius.is_finite() || self.corner_radius < 0.0 {
            return Err(non_negative("corner_radius".to_string(), self.corner_radius));
        }
        if !self.feed.is_finite() || self.feed <= 0.0 {
            return Err(positive("feed", self.feed));
        }
        if !self.cut_feed.is_finite() || self.cut_feed <= 0.0 {
            return Err(positive("cut_feed", self.cut_feed));
        }
        if !self.trigger_hysteresis_steps.is_finite() {
            return Err(not_finite("trigger_hysteresis_steps".to_string()));
        }

        if self.offset[0] < self.overshoot {
            return Err(ParameterError::Incompatible(format!(
                "X offset ({}) must be greater or equal to overshoot ({})",
                self.offset[0], self.overshoot
            )));
        }

        Ok(())
    }
}

fn non_negative(name: String, value: f64) -> ParameterError {
    ParameterError::OutOfRange {
        name,
        value,
        min: 0.0,
        max: f64::INFINITY,
    }
}

fn positive(name: &str, value: f64) -> ParameterError {
    ParameterError::InvalidValue {
        name: name.to_string(),
        reason: format!("must be positive and finite, got {}", value),
    }
}

fn not_finite(name: String) -> ParameterError {
    ParameterError::InvalidValue {
        name,
        reason: "must be finite".to_string(),
    }
}

// Floats hash by bit pattern so a job id is stable for identical settings.
impl Hash for RasterConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for v in self.dpi {
            v.to_bits().hash(state);
        }
        self.on_range.hash(state);
        self.overshoot.to_bits().hash(state);
        for v in self.offset {
            v.to_bits().hash(state);
        }
        self.repeat.hash(state);
        for v in self.tile_size {
            v.map(f64::to_bits).hash(state);
        }
        for v in self.tile_spacing {
            v.to_bits().hash(state);
        }
        self.feed.to_bits().hash(state);
        self.cut_feed.to_bits().hash(state);
        self.corner_radius.to_bits().hash(state);
        self.units.hash(state);
        self.trigger_hysteresis_steps.to_bits().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RasterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.on_range, (0, 32768));
        assert_eq!(config.scale(), [0.002, 0.002]);
    }

    #[test]
    fn test_offset_below_overshoot_rejected() {
        let config = RasterConfig {
            offset: [0.2, 1.0],
            overshoot: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ParameterError::Incompatible(_))
        ));
    }

    #[test]
    fn test_offset_equal_to_overshoot_accepted() {
        let config = RasterConfig {
            offset: [0.5, 0.0],
            overshoot: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad = [
            RasterConfig {
                dpi: [0.0, 500.0],
                ..Default::default()
            },
            RasterConfig {
                repeat: [1, 0],
                ..Default::default()
            },
            RasterConfig {
                on_range: (100, 10),
                ..Default::default()
            },
            RasterConfig {
                feed: 0.0,
                ..Default::default()
            },
            RasterConfig {
                corner_radius: -0.1,
                ..Default::default()
            },
            RasterConfig {
                tile_size: [Some(-1.0), None],
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn test_nan_offset_rejected() {
        let config = RasterConfig {
            offset: [f64::NAN, 0.5],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RasterConfig {
            offset: [1.0, f64::NAN],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_lengths_and_feeds_rejected() {
        let bad = [
            RasterConfig {
                feed: f64::INFINITY,
                ..Default::default()
            },
            RasterConfig {
                cut_feed: f64::INFINITY,
                ..Default::default()
            },
            RasterConfig {
                overshoot: f64::INFINITY,
                offset: [f64::INFINITY, 1.0],
                ..Default::default()
            },
            RasterConfig {
                tile_spacing: [f64::INFINITY, 0.125],
                ..Default::default()
            },
            RasterConfig {
                corner_radius: f64::INFINITY,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn test_luminosity_encoding() {
        assert_eq!(luminosity_from_unit(0.0), 0);
        assert_eq!(luminosity_from_unit(1.0), 65535);
        assert_eq!(luminosity_from_unit(0.5), 32768);
        assert_eq!(luminosity_to_unit(65535), 1.0);
        assert!(luminosity_to_unit(32768) > 0.5);
    }

    #[test]
    fn test_trigger_hysteresis_is_half_step() {
        let config = RasterConfig {
            dpi: [2.0, 2.0],
            ..Default::default()
        };
        assert_eq!(config.trigger_hysteresis(), -0.25);
    }

    #[test]
    fn test_is_on_inclusive() {
        let config = RasterConfig {
            on_range: (10, 20),
            ..Default::default()
        };
        assert!(config.is_on(10));
        assert!(config.is_on(20));
        assert!(!config.is_on(9));
        assert!(!config.is_on(21));
    }
}
