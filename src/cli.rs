//! Command line interface.

use anyhow::{bail, Context};
use clap::Parser;
use rasterkit_camtools::{PixelField, RasterJob};
use rasterkit_core::MeasurementSystem;
use rasterkit_settings::{JobSettings, SettingsOverrides};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rasterkit")]
#[command(about = "Generate laser raster G-code, trigger stream and cut-out program from an image")]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")")
)]
pub struct Cli {
    /// Image to engrave
    pub image: Option<PathBuf>,

    /// Job settings file (.toml or .json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the job settings as TOML and exit
    #[arg(short, long)]
    pub generate: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Directory the output files are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Device resolution in dots per unit
    #[arg(long, value_name = "X,Y", num_args = 2, value_delimiter = ',')]
    pub dpi: Option<Vec<f64>>,

    /// Luminosity range (0.0 - 1.0) for which the laser is on
    #[arg(long, value_name = "MIN,MAX", num_args = 2, value_delimiter = ',')]
    pub on_range: Option<Vec<f64>>,

    /// Travel past the outer span boundaries
    #[arg(long)]
    pub overshoot: Option<f64>,

    /// Bottom left corner of the bottom left tile
    #[arg(
        long,
        value_name = "X,Y",
        num_args = 2,
        value_delimiter = ',',
        allow_negative_numbers = true
    )]
    pub offset: Option<Vec<f64>>,

    /// Number of tiles along X and Y
    #[arg(long, value_name = "X,Y", num_args = 2, value_delimiter = ',')]
    pub repeat: Option<Vec<u32>>,

    /// Gap between repeated tiles
    #[arg(long, value_name = "X,Y", num_args = 2, value_delimiter = ',')]
    pub tile_spacing: Option<Vec<f64>>,

    /// Scan feed rate
    #[arg(long)]
    pub feed: Option<f64>,

    /// Cut-out feed rate
    #[arg(long)]
    pub cut_feed: Option<f64>,

    /// Cut-out corner radius
    #[arg(long)]
    pub corner_radius: Option<f64>,

    /// Length unit: imperial or metric
    #[arg(long)]
    pub units: Option<MeasurementSystem>,
}

fn pair<T: Copy>(name: &str, values: &Option<Vec<T>>) -> anyhow::Result<Option<[T; 2]>> {
    match values.as_deref() {
        None => Ok(None),
        Some(&[a, b]) => Ok(Some([a, b])),
        Some(other) => bail!("--{} takes two values, got {}", name, other.len()),
    }
}

impl Cli {
    /// Values given on the command line.
    pub fn overrides(&self) -> anyhow::Result<SettingsOverrides> {
        Ok(SettingsOverrides {
            dpi: pair("dpi", &self.dpi)?,
            on_range: pair("on-range", &self.on_range)?,
            overshoot: self.overshoot,
            offset: pair("offset", &self.offset)?,
            repeat: pair("repeat", &self.repeat)?,
            tile_spacing: pair("tile-spacing", &self.tile_spacing)?,
            feed: self.feed,
            cut_feed: self.cut_feed,
            corner_radius: self.corner_radius,
            units: self.units,
        })
    }

    /// Settings file (explicit, else `rasterkit.toml` in `cwd`) with the
    /// command line applied on top.
    pub fn settings(&self, cwd: &Path) -> anyhow::Result<JobSettings> {
        let mut settings = match &self.config {
            Some(path) => JobSettings::load_from_file(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => JobSettings::try_load_default(cwd)
                .context("loading default settings")?
                .unwrap_or_default(),
        };
        settings.apply_overrides(&self.overrides()?);
        Ok(settings)
    }

    /// Execute the command.
    pub fn run(&self, cwd: &Path) -> anyhow::Result<()> {
        let settings = self.settings(cwd)?;

        if self.generate {
            print!("{}", settings.to_toml_string()?);
            return Ok(());
        }

        let Some(image) = &self.image else {
            bail!("no image given (use --generate to print the job settings)");
        };

        let config = settings.to_raster_config()?;
        let field = PixelField::open(image)?;
        info!(
            "Rasterizing {} ({}x{} px)",
            field.name(),
            field.width(),
            field.height()
        );

        let job = RasterJob::with_image(config, field)?;
        let paths = job
            .generate_all_files(&self.output_dir)
            .with_context(|| format!("writing output to {}", self.output_dir.display()))?;
        println!("{}", paths.raster.display());
        println!("{}", paths.mask.display());
        println!("{}", paths.cut.display());
        Ok(())
    }
}
