//! Tile layout: pixel to physical coordinates and serpentine replication.
//!
//! The bottom left tile's bottom left pixel sits at `offset`. Tiles repeat
//! every `tile_interval = tile_size + tile_spacing` along each axis.

use crate::config::RasterConfig;
use crate::error::{ParameterError, RasterResult};
use crate::pixel_field::PixelField;
use crate::spans::Span;
use rasterkit_core::{Axis, BoxedIterator};

/// Scan direction of one emitted row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// Increasing X
    Forward,
    /// Decreasing X
    Reverse,
}

impl ScanDirection {
    /// `1.0` forward, `-1.0` reverse.
    pub fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Reverse => -1.0,
        }
    }

    pub fn is_forward(self) -> bool {
        self == Self::Forward
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

/// Span in physical X, ordered by visit: `start` is reached first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalSpan {
    pub start: f64,
    pub end: f64,
}

/// One image row replicated across every tile column
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TiledRow {
    pub spans: Vec<PhysicalSpan>,
}

impl TiledRow {
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Direction implied by the stored span order, `None` for empty rows.
    pub fn direction(&self) -> Option<ScanDirection> {
        let first = self.spans.first()?;
        let last = self.spans.last()?;
        Some(if first.start < last.end {
            ScanDirection::Forward
        } else {
            ScanDirection::Reverse
        })
    }

    /// First and last boundary visited.
    pub fn extent(&self) -> Option<(f64, f64)> {
        Some((self.spans.first()?.start, self.spans.last()?.end))
    }

    /// Total span length along the row.
    pub fn engraved_length(&self) -> f64 {
        self.spans.iter().map(|s| (s.end - s.start).abs()).sum()
    }
}

/// Resolved layout for one configuration and image
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayout {
    offset: [f64; 2],
    scale: [f64; 2],
    tile_size: [f64; 2],
    tile_interval: [f64; 2],
    repeat: [u32; 2],
}

impl TileLayout {
    /// Resolve tile size and interval. Unset tile sizes come from the image extent.
    pub fn new(config: &RasterConfig, field: &PixelField) -> RasterResult<Self> {
        let scale = config.scale();
        let extent = [field.width() as f64, field.height() as f64];
        let mut tile_size = [0.0; 2];
        let mut tile_interval = [0.0; 2];
        for axis in Axis::ALL {
            let i = axis.index();
            tile_size[i] = config.tile_size[i].unwrap_or(extent[i] * scale[i]);
            tile_interval[i] = tile_size[i] + config.tile_spacing[i];
        }

        let smallest = tile_size[0].min(tile_size[1]);
        if config.corner_radius * 2.0 > smallest {
            return Err(ParameterError::Incompatible(format!(
                "corner radius ({}) does not fit a {} x {} tile",
                config.corner_radius, tile_size[0], tile_size[1]
            ))
            .into());
        }

        Ok(Self {
            offset: config.offset,
            scale,
            tile_size,
            tile_interval,
            repeat: config.repeat,
        })
    }

    /// Physical coordinate of `pixel` within `tile` along `axis`.
    pub fn axis_inches(&self, axis: Axis, tile: u32, pixel: u32) -> f64 {
        let i = axis.index();
        self.offset[i] + tile as f64 * self.tile_interval[i] + pixel as f64 * self.scale[i]
    }

    pub fn x_inches(&self, tile: u32, pixel: u32) -> f64 {
        self.axis_inches(Axis::X, tile, pixel)
    }

    pub fn y_inches(&self, tile: u32, pixel: u32) -> f64 {
        self.axis_inches(Axis::Y, tile, pixel)
    }

    pub fn tile_size(&self) -> [f64; 2] {
        self.tile_size
    }

    pub fn tile_interval(&self) -> [f64; 2] {
        self.tile_interval
    }

    /// Replicate one row's spans across the tile columns in scan order.
    ///
    /// Reverse rows walk tiles and spans backwards and swap each span's
    /// endpoints so `start` stays the first boundary visited.
    pub fn tiled_row(&self, spans: &[Span], direction: ScanDirection) -> TiledRow {
        if spans.is_empty() {
            return TiledRow::default();
        }

        let tiles: BoxedIterator<u32> = if direction.is_forward() {
            Box::new(0..self.repeat[0])
        } else {
            Box::new((0..self.repeat[0]).rev())
        };

        let mut tiled = Vec::with_capacity(spans.len() * self.repeat[0] as usize);
        for tile in tiles {
            if direction.is_forward() {
                tiled.extend(spans.iter().map(|s| PhysicalSpan {
                    start: self.x_inches(tile, s.start),
                    end: self.x_inches(tile, s.end),
                }));
            } else {
                tiled.extend(spans.iter().rev().map(|s| PhysicalSpan {
                    start: self.x_inches(tile, s.end),
                    end: self.x_inches(tile, s.start),
                }));
            }
        }

        TiledRow { spans: tiled }
    }

    /// Build the tiled row for every pixel row.
    ///
    /// Direction alternates per emitted row; blank rows keep the current
    /// direction so the next row with spans reverses the previous one.
    pub fn build_tiled_rows(&self, rows: &[Vec<Span>]) -> Vec<TiledRow> {
        let mut direction = ScanDirection::Forward;
        rows.iter()
            .map(|spans| {
                let row = self.tiled_row(spans, direction);
                if !row.is_empty() {
                    direction = direction.flipped();
                }
                row
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(repeat: [u32; 2]) -> TileLayout {
        let config = RasterConfig {
            dpi: [2.0, 2.0],
            offset: [0.5, 0.5],
            overshoot: 0.5,
            repeat,
            tile_spacing: [0.5, 0.25],
            ..Default::default()
        };
        let field = PixelField::new("t", 4, 2, vec![0; 8]).unwrap();
        TileLayout::new(&config, &field).unwrap()
    }

    fn pairs(row: &TiledRow) -> Vec<(f64, f64)> {
        row.spans.iter().map(|s| (s.start, s.end)).collect()
    }

    #[test]
    fn test_tile_size_from_image() {
        let l = layout([1, 1]);
        assert_eq!(l.tile_size(), [2.0, 1.0]);
        assert_eq!(l.tile_interval(), [2.5, 1.25]);
    }

    #[test]
    fn test_axis_inches_offset_is_pixel_times_scale() {
        let l = layout([3, 3]);
        for tile in 0..3 {
            for pixel in 0..4 {
                for axis in Axis::ALL {
                    let d = l.axis_inches(axis, tile, pixel) - l.axis_inches(axis, tile, 0);
                    assert!((d - pixel as f64 * 0.5).abs() < 1e-12);
                }
            }
        }
        assert_eq!(l.x_inches(1, 0), 3.0);
        assert_eq!(l.y_inches(2, 1), 0.5 + 2.5 + 0.5);
    }

    #[test]
    fn test_forward_row_replication() {
        let l = layout([2, 1]);
        let row = l.tiled_row(&[Span::new(0, 1), Span::new(2, 4)], ScanDirection::Forward);
        assert_eq!(
            pairs(&row),
            vec![(0.5, 1.0), (1.5, 2.5), (3.0, 3.5), (4.0, 5.0)]
        );
        assert_eq!(row.direction(), Some(ScanDirection::Forward));
    }

    #[test]
    fn test_reverse_row_replication() {
        let l = layout([2, 1]);
        let row = l.tiled_row(&[Span::new(0, 1), Span::new(2, 4)], ScanDirection::Reverse);
        assert_eq!(
            pairs(&row),
            vec![(5.0, 4.0), (3.5, 3.0), (2.5, 1.5), (1.0, 0.5)]
        );
        assert_eq!(row.direction(), Some(ScanDirection::Reverse));
        assert_eq!(row.extent(), Some((5.0, 0.5)));
    }

    #[test]
    fn test_blank_rows_do_not_flip_direction() {
        let l = layout([1, 1]);
        let rows = vec![
            vec![Span::new(0, 1)],
            vec![],
            vec![],
            vec![Span::new(1, 2)],
            vec![Span::new(1, 2)],
        ];
        let tiled = l.build_tiled_rows(&rows);
        let dirs: Vec<_> = tiled.iter().map(TiledRow::direction).collect();
        assert_eq!(
            dirs,
            vec![
                Some(ScanDirection::Forward),
                None,
                None,
                Some(ScanDirection::Reverse),
                Some(ScanDirection::Forward),
            ]
        );
    }

    #[test]
    fn test_corner_radius_must_fit_tile() {
        let config = RasterConfig {
            dpi: [2.0, 2.0],
            offset: [0.5, 0.5],
            corner_radius: 0.75,
            ..Default::default()
        };
        let field = PixelField::new("t", 4, 2, vec![0; 8]).unwrap();
        assert!(TileLayout::new(&config, &field).is_err());
    }
}
