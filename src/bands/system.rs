//! High-level band system: shared noise plus the ordered band list.

use rand::Rng;

use super::geometry::GeometryBuilder;
use super::model::BandModel;
use super::renderer::BandRenderer;
use crate::noise::NoiseEngine;
use crate::params::{BandConfig, Viewport};
use crate::surface::DrawingSurface;

/// Everything needed to draw one frame of the scene
pub struct BandSystem {
    noise: NoiseEngine,
    bands: Vec<BandModel>,
    sample_step_px: f32,
    renderer: BandRenderer,
}

impl BandSystem {
    /// Seed the noise engine, then draw one phase offset per band in table order
    pub fn new<R: Rng + ?Sized>(table: &[BandConfig], sample_step_px: f32, rng: &mut R) -> Self {
        let noise = NoiseEngine::new(rng);
        let bands = table.iter().map(|c| BandModel::new(c, rng)).collect();
        Self {
            noise,
            bands,
            sample_step_px,
            renderer: BandRenderer,
        }
    }

    pub fn bands(&self) -> &[BandModel] {
        &self.bands
    }

    pub fn noise(&self) -> &NoiseEngine {
        &self.noise
    }

    pub fn geometry(&self) -> GeometryBuilder<'_> {
        GeometryBuilder::new(&self.noise, self.sample_step_px)
    }

    /// Clear the surface and draw every band at `time`, back to front
    pub fn draw<S: DrawingSurface + ?Sized>(&self, time: f64, surface: &mut S) {
        let (width, height) = surface.size();
        surface.clear_rect(0.0, 0.0, width as f32, height as f32);

        let viewport = Viewport::new(width, height);
        if viewport.is_empty() {
            return;
        }

        let builder = self.geometry();
        for band in &self.bands {
            let sample = builder.build(band, time, viewport);
            self.renderer.render(surface, &sample, band);
        }
    }
}
