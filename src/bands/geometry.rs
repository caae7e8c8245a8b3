//! Band geometry sampling: noise field → (top, bottom) edge points.

use super::model::BandModel;
use crate::noise::NoiseEngine;
use crate::params::Viewport;

/// One horizontal sample of a band's edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePoint {
    pub x: f32,
    pub top: f32,
    pub bottom: f32,
}

/// A band's shape for one frame, left to right
#[derive(Debug, Clone, Default)]
pub struct GeometrySample {
    pub points: Vec<EdgePoint>,
}

impl GeometrySample {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Mean of the top edge and mean of the bottom edge
    pub fn mean_edges(&self) -> (f32, f32) {
        let n = self.points.len().max(1) as f32;
        let (top, bottom) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(t, b), p| (t + p.top, b + p.bottom));
        (top / n, bottom / n)
    }
}

/// One noise octave of the centre-line wave
struct Octave {
    /// Spatial frequency multiplier (applied on top of the band frequency)
    spatial: f64,
    weight: f64,
    /// Lattice offset added to the band phase
    offset: f64,
    /// Local time multiplier
    time_scale: f64,
    z_plane: f64,
}

const OCTAVES: [Octave; 3] = [
    Octave {
        spatial: 2.0,
        weight: 1.0,
        offset: 0.0,
        time_scale: 1.0,
        z_plane: 0.0,
    },
    Octave {
        spatial: 4.0,
        weight: 0.5,
        offset: 50.0,
        time_scale: 1.5,
        z_plane: 0.5,
    },
    Octave {
        spatial: 8.0,
        weight: 0.25,
        offset: 100.0,
        time_scale: 0.7,
        z_plane: 1.0,
    },
];

/// Thickness modulation channel (absolute spatial frequency)
const THICKNESS_FREQUENCY: f64 = 3.0;
const THICKNESS_OFFSET: f64 = 200.0;
const THICKNESS_TIME_SCALE: f64 = 0.5;
const THICKNESS_Z_PLANE: f64 = 2.0;

/// Samples band shapes from a shared noise engine
pub struct GeometryBuilder<'a> {
    noise: &'a NoiseEngine,
    sample_step_px: f32,
}

impl<'a> GeometryBuilder<'a> {
    pub fn new(noise: &'a NoiseEngine, sample_step_px: f32) -> Self {
        Self {
            noise,
            sample_step_px,
        }
    }

    /// Number of intervals across `width` (at least one)
    pub fn step_count(&self, width: u32) -> usize {
        ((width as f32 / self.sample_step_px).ceil() as usize).max(1)
    }

    /// Sample `band` at `time` across the full viewport width
    ///
    /// Emits `step_count(width) + 1` evenly spaced points, the first at x = 0
    /// and the last at x = width.
    pub fn build(&self, band: &BandModel, time: f64, viewport: Viewport) -> GeometrySample {
        let steps = self.step_count(viewport.width);
        let width = viewport.width as f64;
        let height = viewport.height as f64;

        let t = band.temporal_coordinate(time);
        let frequency = band.frequency as f64;
        let phase = band.phase_offset;
        let amplitude = band.amplitude_fraction as f64 * height;
        let base_y = band.vertical_position_fraction as f64 * height;
        let nominal_thickness = band.thickness_fraction as f64 * height;

        let points = (0..=steps)
            .map(|i| {
                let x_norm = i as f64 / steps as f64;

                let wave: f64 = OCTAVES
                    .iter()
                    .map(|o| {
                        o.weight
                            * self.noise.sample(
                                x_norm * frequency * o.spatial + phase + o.offset,
                                t * o.time_scale,
                                o.z_plane,
                            )
                    })
                    .sum();
                let center = base_y + wave * amplitude;

                let thickness_noise = self.noise.sample(
                    x_norm * THICKNESS_FREQUENCY + phase + THICKNESS_OFFSET,
                    t * THICKNESS_TIME_SCALE,
                    THICKNESS_Z_PLANE,
                );
                let half = nominal_thickness * (0.8 + thickness_noise * 0.4) / 2.0;

                let top = (center - half) as f32;
                EdgePoint {
                    x: (x_norm * width) as f32,
                    top,
                    bottom: separate_below(top, (center + half) as f32),
                }
            })
            .collect::<Vec<_>>();

        debug_assert_eq!(points.len(), steps + 1);
        debug_assert!(points.iter().all(|p| p.top < p.bottom));

        GeometrySample { points }
    }
}

/// Keep `bottom` strictly below `top` after narrowing to f32
///
/// A very thin band can round both edges to the same f32; nudge the bottom
/// edge down by at least one ulp.
#[inline]
fn separate_below(top: f32, bottom: f32) -> f32 {
    if bottom > top {
        bottom
    } else {
        top + top.abs().max(1.0) * f32::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::default_band_table;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup(seed: u64) -> (NoiseEngine, Vec<BandModel>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = NoiseEngine::new(&mut rng);
        let bands = default_band_table()
            .iter()
            .map(|c| BandModel::new(c, &mut rng))
            .collect();
        (noise, bands)
    }

    #[test]
    fn test_sample_count_for_width_200() {
        let (noise, bands) = setup(1);
        let builder = GeometryBuilder::new(&noise, 3.0);
        let sample = builder.build(&bands[0], 0.0, Viewport::new(200, 120));

        assert_eq!(builder.step_count(200), 67);
        assert_eq!(sample.len(), 68);
        assert_eq!(sample.points[0].x, 0.0);
        assert_eq!(sample.points[67].x, 200.0);
    }

    #[test]
    fn test_sample_count_tracks_width() {
        let (noise, bands) = setup(2);
        let builder = GeometryBuilder::new(&noise, 3.0);
        for width in [1u32, 2, 3, 4, 640, 961] {
            let sample = builder.build(&bands[3], 10.0, Viewport::new(width, 300));
            let expected = (width as f32 / 3.0).ceil() as usize + 1;
            assert_eq!(sample.len(), expected.max(2));
            assert_eq!(sample.points.last().unwrap().x, width as f32);
        }
    }

    #[test]
    fn test_x_strictly_increasing() {
        let (noise, bands) = setup(3);
        let builder = GeometryBuilder::new(&noise, 3.0);
        let sample = builder.build(&bands[1], 5.0, Viewport::new(640, 360));
        for pair in sample.points.windows(2) {
            assert!(pair[0].x < pair[1].x);
        }
    }

    #[test]
    fn test_band_always_has_positive_thickness() {
        let (noise, bands) = setup(4);
        let builder = GeometryBuilder::new(&noise, 3.0);
        for band in &bands {
            for frame in (0..5000).step_by(97) {
                let sample = builder.build(band, frame as f64, Viewport::new(320, 180));
                for p in &sample.points {
                    assert!(p.bottom - p.top > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_thickness_stays_within_modulation_range() {
        let (noise, bands) = setup(5);
        let builder = GeometryBuilder::new(&noise, 3.0);
        let viewport = Viewport::new(400, 300);
        let band = &bands[2];
        let nominal = band.thickness_fraction * viewport.height as f32;
        let sample = builder.build(band, 123.0, viewport);
        for p in &sample.points {
            let thickness = p.bottom - p.top;
            assert!(thickness >= nominal * 0.4 - 1e-3);
            assert!(thickness <= nominal * 1.2 + 1e-3);
        }
    }

    #[test]
    fn test_mean_edges() {
        let sample = GeometrySample {
            points: vec![
                EdgePoint {
                    x: 0.0,
                    top: 10.0,
                    bottom: 20.0,
                },
                EdgePoint {
                    x: 1.0,
                    top: 14.0,
                    bottom: 30.0,
                },
            ],
        };
        assert_eq!(sample.mean_edges(), (12.0, 25.0));
    }

    #[test]
    fn test_same_seed_same_geometry() {
        let (noise_a, bands_a) = setup(77);
        let (noise_b, bands_b) = setup(77);
        let a = GeometryBuilder::new(&noise_a, 3.0).build(&bands_a[6], 42.0, Viewport::new(90, 60));
        let b = GeometryBuilder::new(&noise_b, 3.0).build(&bands_b[6], 42.0, Viewport::new(90, 60));
        assert_eq!(a.points, b.points);
    }

    #[test]
    fn test_hairline_band_keeps_edges_apart() {
        let (noise, _) = setup(6);
        let mut config = default_band_table()[3].clone();
        config.thickness = 1e-9;
        config.validate(3).unwrap();
        let band = BandModel::with_phase(&config, 321.5);

        let builder = GeometryBuilder::new(&noise, 3.0);
        for frame in [0.0, 250.0, 4000.0] {
            let sample = builder.build(&band, frame, Viewport::new(640, 360));
            assert_eq!(sample.len(), 215);
            for p in &sample.points {
                assert!(p.top < p.bottom, "{} !< {}", p.top, p.bottom);
            }
        }
    }

    #[test]
    fn test_separate_below() {
        assert_eq!(separate_below(10.0, 12.0), 12.0);
        assert!(separate_below(0.0, 0.0) > 0.0);
        assert!(separate_below(250.0, 250.0) > 250.0);
        assert!(separate_below(-3.5, -3.5) > -3.5);
    }

    #[test]
    fn test_point_matches_octave_sum() {
        let (noise, bands) = setup(8);
        let band = &bands[2];
        let viewport = Viewport::new(300, 200);
        let builder = GeometryBuilder::new(&noise, 3.0);
        let frame = 137.0;
        let sample = builder.build(band, frame, viewport);

        // 300 px at 3 px steps: 100 intervals, so index 37 sits at x = 0.37
        let i = 37;
        let x = i as f64 / 100.0;
        let h = 200.0;
        let t = frame * 0.002 * band.speed as f64;
        let f = band.frequency as f64;
        let phase = band.phase_offset;

        let wave = noise.sample(x * f * 2.0 + phase, t, 0.0)
            + 0.5 * noise.sample(x * f * 4.0 + phase + 50.0, t * 1.5, 0.5)
            + 0.25 * noise.sample(x * f * 8.0 + phase + 100.0, t * 0.7, 1.0);
        let amplitude = band.amplitude_fraction as f64 * h;
        let center = band.vertical_position_fraction as f64 * h + wave * amplitude;
        let modulation = noise.sample(x * 3.0 + phase + 200.0, t * 0.5, 2.0);
        let half = band.thickness_fraction as f64 * h * (0.8 + modulation * 0.4) / 2.0;

        let p = sample.points[i];
        assert_eq!(p.x, 111.0);
        assert_eq!(p.top, (center - half) as f32);
        assert_eq!(p.bottom, (center + half) as f32);
    }
}
