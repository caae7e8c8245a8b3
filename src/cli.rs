//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::ConfigError;
use crate::params::{default_band_table, load_band_table, BandConfig, RecordingConfig, RenderConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "aurora-bands")]
#[command(about = "Ambient aurora of translucent, noise-driven color bands", long_about = None)]
pub struct Args {
    /// Window (or recording) width in pixels
    #[arg(long, value_name = "PIXELS", default_value_t = 1280)]
    pub width: u32,

    /// Window (or recording) height in pixels
    #[arg(long, value_name = "PIXELS", default_value_t = 720)]
    pub height: u32,

    /// Seed for noise tables and band phases (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON file with the ordered band table (built-in aurora if omitted)
    #[arg(long, value_name = "FILE")]
    pub bands: Option<PathBuf>,

    /// Honour a reduced-motion preference: draw nothing, schedule nothing
    #[arg(long)]
    pub reduced_motion: bool,

    /// Record frames headlessly instead of opening a window (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Recording frame rate
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Recording output directory
    #[arg(long, value_name = "DIR", default_value = "recording")]
    pub output: PathBuf,
}

impl Args {
    /// Render configuration with the requested window size
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width.max(1),
            window_height: self.height.max(1),
            ..RenderConfig::default()
        }
    }

    /// Band table from `--bands`, or the built-in default
    pub fn band_table(&self) -> Result<Vec<BandConfig>, ConfigError> {
        match &self.bands {
            Some(path) => load_band_table(path),
            None => Ok(default_band_table()),
        }
    }

    /// Session RNG: seeded when `--seed` is given, OS entropy otherwise
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => {
                log::info!("Using seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        }
    }

    /// Create recording configuration if recording mode is enabled
    pub fn recording_config(&self) -> Option<RecordingConfig> {
        self.record.map(|duration| RecordingConfig {
            fps: self.fps.max(1),
            output_dir: self.output.clone(),
            ..RecordingConfig::new(duration)
        })
    }
}
