//! Band configuration table.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::surface::Rgb;

/// Static definition of one band, as configured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandConfig {
    /// Fill color
    pub color: Rgb,

    /// Peak opacity at the band's centre line, in (0, 1]
    pub alpha: f32,

    /// Nominal thickness (fraction of raster height, in (0, 1])
    pub thickness: f32,

    /// Resting centre line (fraction of raster height, in (0, 1])
    pub y_base: f32,

    /// Temporal speed multiplier (dimensionless)
    pub speed: f32,

    /// Spatial frequency of the centre-line wave (lattice cells across the width)
    pub frequency: f32,

    /// Wave amplitude (fraction of raster height)
    pub amplitude: f32,
}

impl BandConfig {
    /// Check every field against its documented range
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let unit = |field: &'static str, value: f32| {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    index,
                    field,
                    value,
                    expected: "(0, 1]",
                })
            }
        };
        let non_negative = |field: &'static str, value: f32| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    index,
                    field,
                    value,
                    expected: "finite, >= 0",
                })
            }
        };

        unit("alpha", self.alpha)?;
        unit("thickness", self.thickness)?;
        unit("y_base", self.y_base)?;
        non_negative("speed", self.speed)?;
        non_negative("frequency", self.frequency)?;
        non_negative("amplitude", self.amplitude)?;
        Ok(())
    }
}

/// Soft green/teal aurora, drawn back to front
pub fn default_band_table() -> Vec<BandConfig> {
    let band = |(r, g, b): (u8, u8, u8),
                alpha,
                thickness,
                y_base,
                speed,
                frequency,
                amplitude| BandConfig {
        color: Rgb::new(r, g, b),
        alpha,
        thickness,
        y_base,
        speed,
        frequency,
        amplitude,
    };

    vec![
        band((56, 200, 97), 0.22, 0.35, 0.12, 1.0, 1.0, 0.10),
        band((34, 197, 152), 0.18, 0.30, 0.25, 0.7, 1.3, 0.12),
        band((16, 185, 129), 0.25, 0.40, 0.38, 0.5, 0.8, 0.14),
        band((72, 190, 220), 0.16, 0.28, 0.50, 0.9, 1.1, 0.11),
        band((99, 220, 130), 0.20, 0.38, 0.62, 0.6, 0.9, 0.13),
        band((45, 160, 200), 0.15, 0.25, 0.72, 1.1, 1.4, 0.09),
        band((110, 230, 183), 0.18, 0.32, 0.85, 0.8, 1.0, 0.12),
    ]
}

/// Parse and validate a JSON band table (an ordered array of bands)
pub fn parse_band_table(json: &str) -> Result<Vec<BandConfig>, ConfigError> {
    let table: Vec<BandConfig> = serde_json::from_str(json)?;
    if table.is_empty() {
        return Err(ConfigError::Empty);
    }
    for (index, band) in table.iter().enumerate() {
        band.validate(index)?;
    }
    Ok(table)
}

/// Load a band table from a JSON file
pub fn load_band_table(path: &Path) -> Result<Vec<BandConfig>, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_band_table(&json)?;
    log::info!("Loaded {} bands from {}", table.len(), path.display());
    Ok(table)
}
