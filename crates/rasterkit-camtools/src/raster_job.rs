//! Raster job orchestration.
//!
//! A job owns the configuration and the image, caches the tiled rows derived
//! from them, and renders three artifacts: the raster motion program, its
//! trigger stream and the tile cut-out program.

use crate::config::RasterConfig;
use crate::cut_path::CutPath;
use crate::error::{RasterError, RasterResult};
use crate::gcode_writer::{Command, GcodeWriter};
use crate::pixel_field::PixelField;
use crate::spans::{build_spans, Span};
use crate::tile_layout::{TileLayout, TiledRow};
use crate::trigger_stream::TriggerWriter;
use rasterkit_core::get_unit_label;
use std::fs;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Summary of one raster render
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RasterStats {
    /// Scan lines emitted across all tile rows
    pub rows: usize,
    /// Spans emitted to the trigger stream
    pub spans: usize,
    /// Total length with the laser on
    pub engraved_length: f64,
}

/// Output file locations for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub raster: PathBuf,
    pub mask: PathBuf,
    pub cut: PathBuf,
}

/// Image loaded for rendering together with its derived caches
#[derive(Debug, Clone)]
struct PreparedImage {
    field: PixelField,
    layout: TileLayout,
    spans: Vec<Vec<Span>>,
    tiled_rows: Vec<TiledRow>,
}

/// Raster engraving job
#[derive(Debug, Clone)]
pub struct RasterJob {
    config: RasterConfig,
    image: Option<PreparedImage>,
}

impl RasterJob {
    /// Create a job without an image. The configuration is validated here.
    pub fn new(config: RasterConfig) -> RasterResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            image: None,
        })
    }

    /// Create a job and assign its image in one step.
    pub fn with_image(config: RasterConfig, field: PixelField) -> RasterResult<Self> {
        let mut job = Self::new(config)?;
        job.set_image(field)?;
        Ok(job)
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    pub fn image(&self) -> Option<&PixelField> {
        self.image.as_ref().map(|p| &p.field)
    }

    pub fn layout(&self) -> Option<&TileLayout> {
        self.image.as_ref().map(|p| &p.layout)
    }

    /// Pixel spans per row, bottom row first.
    pub fn spans(&self) -> &[Vec<Span>] {
        self.image
            .as_ref()
            .map(|p| p.spans.as_slice())
            .unwrap_or_default()
    }

    /// Cached tiled rows, bottom row first.
    pub fn tiled_rows(&self) -> &[TiledRow] {
        self.image
            .as_ref()
            .map(|p| p.tiled_rows.as_slice())
            .unwrap_or_default()
    }

    /// Replace the configuration and rebuild the row cache.
    ///
    /// On error the job keeps its previous configuration and cache.
    pub fn set_config(&mut self, config: RasterConfig) -> RasterResult<()> {
        config.validate()?;
        if let Some(prepared) = &mut self.image {
            let (layout, spans, tiled_rows) = Self::derive(&config, &prepared.field)?;
            prepared.layout = layout;
            prepared.spans = spans;
            prepared.tiled_rows = tiled_rows;
        }
        self.config = config;
        Ok(())
    }

    /// Assign the image, extracting spans and building the tiled rows.
    pub fn set_image(&mut self, field: PixelField) -> RasterResult<()> {
        debug!(
            "image set to {} {:?} {} pixels",
            field.name(),
            field.size(),
            field.pixels().len()
        );
        let (layout, spans, tiled_rows) = Self::derive(&self.config, &field)?;
        self.image = Some(PreparedImage {
            field,
            layout,
            spans,
            tiled_rows,
        });
        Ok(())
    }

    fn derive(
        config: &RasterConfig,
        field: &PixelField,
    ) -> RasterResult<(TileLayout, Vec<Vec<Span>>, Vec<TiledRow>)> {
        let layout = TileLayout::new(config, field)?;
        let spans = build_spans(field, config.on_range);
        let tiled_rows = layout.build_tiled_rows(&spans);
        if tiled_rows.iter().all(TiledRow::is_empty) {
            warn!("{} has no pixels inside the on range", field.name());
        }
        Ok((layout, spans, tiled_rows))
    }

    fn prepared(&self) -> RasterResult<&PreparedImage> {
        self.image.as_ref().ok_or(RasterError::MissingImage)
    }

    /// Identity of the image content and configuration, for traceability.
    pub fn job_id(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        if let Some(prepared) = &self.image {
            prepared.field.hash_content(&mut hasher);
        }
        self.config.hash(&mut hasher);
        hasher.finish()
    }

    /// Render the tiled raster program and its trigger stream.
    ///
    /// Each scan line is one jog to the row start and one feed move to the
    /// row end, both padded by the overshoot; the trigger records for that
    /// row follow immediately.
    pub fn render_tiled_image<G: Write, T: Write>(
        &self,
        gcode_sink: G,
        trigger_sink: T,
    ) -> RasterResult<RasterStats> {
        let prepared = self.prepared()?;
        let config = &self.config;
        let layout = &prepared.layout;
        let mut gcode = GcodeWriter::with_units(gcode_sink, config.units);
        let mut trigger = TriggerWriter::new(trigger_sink, config.trigger_hysteresis());
        let mut stats = RasterStats::default();

        let job_id = self.job_id();
        info!("rendering tiled image for job {:016x}", job_id);
        gcode.comment(&format!("raster gcode for job {:016x}", job_id))?;
        gcode.comment(&format!(
            "image: {} {:?}",
            prepared.field.name(),
            prepared.field.size()
        ))?;
        let [tile_w, tile_h] = layout.tile_size();
        gcode.comment(&format!(
            "tile: {:.3} x {:.3} {} ({:.1} x {:.1} mm)",
            tile_w,
            tile_h,
            get_unit_label(config.units),
            config.units.to_mm(tile_w),
            config.units.to_mm(tile_h)
        ))?;
        let config_json = serde_json::to_string(config)?;
        gcode.comment(&format!("config: {}", config_json))?;

        gcode.preamble(config.feed, true)?;
        trigger.preamble()?;

        for ytile in 0..config.repeat[1] {
            debug!("begin tile row {}", ytile);
            for (ypix, row) in prepared.tiled_rows.iter().enumerate() {
                let (Some(direction), Some((first, last))) = (row.direction(), row.extent())
                else {
                    debug!("pixel row {} is empty", ypix);
                    continue;
                };

                let y = layout.y_inches(ytile, ypix as u32);
                let dir = direction.sign();
                debug!(
                    "pixel row {} at {:.3} going {:?} with {} spans",
                    ypix,
                    y,
                    direction,
                    row.spans.len()
                );

                gcode.jog(Command::new().x(first - dir * config.overshoot).y(y))?;
                gcode.move_to(Command::new().x(last + dir * config.overshoot).y(y))?;

                trigger.begin_row(direction);
                for span in &row.spans {
                    trigger.span(direction, span.start, span.end)?;
                }

                stats.rows += 1;
                stats.spans += row.spans.len();
                stats.engraved_length += row.engraved_length();
            }
            debug!("end tile row {}", ytile);
        }

        gcode.epilogue()?;
        trigger.flush()?;
        info!(
            "raster complete: {} rows, {} spans, {:.3} {} engraved",
            stats.rows,
            stats.spans,
            stats.engraved_length,
            get_unit_label(config.units)
        );
        Ok(stats)
    }

    /// Render the program that cuts every tile out, row by row from the bottom.
    pub fn render_all_cuts<W: Write>(&self, sink: W) -> RasterResult<usize> {
        let prepared = self.prepared()?;
        let config = &self.config;
        let layout = &prepared.layout;
        let [width, height] = layout.tile_size();
        let mut gcode = GcodeWriter::with_units(sink, config.units);

        gcode.comment(&format!("cut gcode for job {:016x}", self.job_id()))?;
        gcode.preamble(config.cut_feed, false)?;

        let mut tiles = 0;
        for ytile in 0..config.repeat[1] {
            for xtile in 0..config.repeat[0] {
                let path = CutPath::for_tile(
                    layout.x_inches(xtile, 0),
                    layout.y_inches(ytile, 0),
                    width,
                    height,
                    config.corner_radius,
                );
                path.emit(&mut gcode)?;
                tiles += 1;
            }
        }

        gcode.epilogue()?;
        debug!("emitted {} tile cuts", tiles);
        Ok(tiles)
    }

    /// Render the raster program, trigger stream and cut program.
    pub fn render_all<G: Write, T: Write, C: Write>(
        &self,
        gcode_sink: G,
        trigger_sink: T,
        cut_sink: C,
    ) -> RasterResult<RasterStats> {
        let stats = self.render_tiled_image(gcode_sink, trigger_sink)?;
        self.render_all_cuts(cut_sink)?;
        Ok(stats)
    }

    /// Output file names inside `dir`, derived from the image name.
    pub fn output_paths(&self, dir: &Path) -> RasterResult<OutputPaths> {
        let name = self.prepared()?.field.name();
        Ok(OutputPaths {
            raster: dir.join(format!("{}.raster.ngc", name)),
            mask: dir.join(format!("{}.raster.gmask", name)),
            cut: dir.join(format!("{}.cut.ngc", name)),
        })
    }

    /// Write all three files into `dir`.
    ///
    /// Output goes to temporary files in the same directory and is only moved
    /// into place once every render has succeeded.
    pub fn generate_all_files(&self, dir: &Path) -> RasterResult<OutputPaths> {
        let paths = self.output_paths(dir)?;
        fs::create_dir_all(dir)?;

        let mut raster = NamedTempFile::new_in(dir)?;
        let mut mask = NamedTempFile::new_in(dir)?;
        let mut cut = NamedTempFile::new_in(dir)?;

        {
            let mut raster_out = BufWriter::new(raster.as_file_mut());
            let mut mask_out = BufWriter::new(mask.as_file_mut());
            let mut cut_out = BufWriter::new(cut.as_file_mut());
            self.render_all(&mut raster_out, &mut mask_out, &mut cut_out)?;
            raster_out.flush()?;
            mask_out.flush()?;
            cut_out.flush()?;
        }

        raster.persist(&paths.raster)?;
        mask.persist(&paths.mask)?;
        cut.persist(&paths.cut)?;

        info!(
            "wrote {}, {} and {}",
            paths.raster.display(),
            paths.mask.display(),
            paths.cut.display()
        );
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParameterError;

    fn config() -> RasterConfig {
        RasterConfig {
            dpi: [2.0, 2.0],
            on_range: (0, 127),
            offset: [0.5, 0.5],
            overshoot: 0.5,
            repeat: [1, 1],
            ..Default::default()
        }
    }

    fn field() -> PixelField {
        PixelField::new("test.png", 4, 2, vec![200, 50, 50, 200, 0, 0, 255, 255]).unwrap()
    }

    #[test]
    fn test_rejects_offset_below_overshoot() {
        let bad = RasterConfig {
            offset: [0.2, 0.5],
            ..config()
        };
        let err = RasterJob::new(bad).unwrap_err();
        assert!(matches!(
            err,
            RasterError::InvalidConfiguration(ParameterError::Incompatible(_))
        ));
    }

    #[test]
    fn test_render_requires_image() {
        let job = RasterJob::new(config()).unwrap();
        let err = job
            .render_tiled_image(Vec::<u8>::new(), Vec::<u8>::new())
            .unwrap_err();
        assert!(matches!(err, RasterError::MissingImage));
        assert!(job.tiled_rows().is_empty());
    }

    #[test]
    fn test_set_config_rebuilds_cache() {
        let mut job = RasterJob::with_image(config(), field()).unwrap();
        assert_eq!(job.tiled_rows()[0].spans.len(), 1);

        job.set_config(RasterConfig {
            repeat: [3, 1],
            ..config()
        })
        .unwrap();
        assert_eq!(job.tiled_rows()[0].spans.len(), 3);
        assert_eq!(job.tiled_rows()[1].spans.len(), 3);
    }

    #[test]
    fn test_rejected_config_keeps_previous_state() {
        let mut job = RasterJob::with_image(config(), field()).unwrap();
        let before = job.job_id();
        assert!(job
            .set_config(RasterConfig {
                corner_radius: 5.0,
                ..config()
            })
            .is_err());
        assert_eq!(job.job_id(), before);
        assert_eq!(job.config(), &config());
    }

    #[test]
    fn test_job_id_tracks_image_and_config() {
        let a = RasterJob::with_image(config(), field()).unwrap();
        let b = RasterJob::with_image(config(), field()).unwrap();
        let c = RasterJob::with_image(
            RasterConfig {
                feed: 60.0,
                ..config()
            },
            field(),
        )
        .unwrap();
        assert_eq!(a.job_id(), b.job_id());
        assert_ne!(a.job_id(), c.job_id());
    }

    #[test]
    fn test_output_paths() {
        let job = RasterJob::with_image(config(), field()).unwrap();
        let paths = job.output_paths(Path::new("out")).unwrap();
        assert_eq!(paths.raster, Path::new("out/test.png.raster.ngc"));
        assert_eq!(paths.mask, Path::new("out/test.png.raster.gmask"));
        assert_eq!(paths.cut, Path::new("out/test.png.cut.ngc"));
    }
}
