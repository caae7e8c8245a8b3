//! Per-band runtime model.

use rand::Rng;

use crate::params::BandConfig;
use crate::surface::Rgb;

/// Upper bound (exclusive) of the random phase offset
pub const PHASE_RANGE: f64 = 1000.0;

/// Immutable band state: configuration plus a per-instance phase offset
#[derive(Debug, Clone, PartialEq)]
pub struct BandModel {
    pub color: Rgb,
    pub base_alpha: f32,
    pub thickness_fraction: f32,
    pub vertical_position_fraction: f32,
    pub speed: f32,
    pub frequency: f32,
    pub amplitude_fraction: f32,

    /// Shifts this band's noise lookups so bands sharing frequency and
    /// speed still move independently
    pub phase_offset: f64,
}

impl BandModel {
    /// Build a band from its configuration, drawing a fresh phase offset
    pub fn new<R: Rng + ?Sized>(config: &BandConfig, rng: &mut R) -> Self {
        Self::with_phase(config, rng.gen_range(0.0..PHASE_RANGE))
    }

    /// Build a band with an explicit phase offset
    pub fn with_phase(config: &BandConfig, phase_offset: f64) -> Self {
        Self {
            color: config.color,
            base_alpha: config.alpha,
            thickness_fraction: config.thickness,
            vertical_position_fraction: config.y_base,
            speed: config.speed,
            frequency: config.frequency,
            amplitude_fraction: config.amplitude,
            phase_offset,
        }
    }

    /// Band-local temporal noise coordinate for a frame counter value
    pub fn temporal_coordinate(&self, time: f64) -> f64 {
        time * 0.002 * self.speed as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::default_band_table;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_phase_offset_in_range() {
        let mut rng = StdRng::seed_from_u64(8);
        for config in default_band_table() {
            let band = BandModel::new(&config, &mut rng);
            assert!((0.0..PHASE_RANGE).contains(&band.phase_offset));
            assert_eq!(band.base_alpha, config.alpha);
        }
    }

    #[test]
    fn test_temporal_coordinate_scales_with_speed() {
        let mut config = default_band_table()[0].clone();
        config.speed = 0.5;
        let band = BandModel::with_phase(&config, 0.0);
        assert_eq!(band.temporal_coordinate(0.0), 0.0);
        assert!((band.temporal_coordinate(100.0) - 0.1).abs() < 1e-12);
    }
}
