//! Turns band geometry into a smoothed, gradient-filled ribbon.

use glam::Vec2;

use super::geometry::GeometrySample;
use super::model::BandModel;
use crate::surface::{DrawingSurface, LinearGradient};

/// (offset, opacity relative to the band's base alpha)
pub const GRADIENT_STOPS: [(f32, f32); 5] = [
    (0.0, 0.0),
    (0.2, 0.6),
    (0.5, 1.0),
    (0.8, 0.6),
    (1.0, 0.0),
];

/// Stateless band rasterizer front-end
#[derive(Debug, Default, Clone, Copy)]
pub struct BandRenderer;

impl BandRenderer {
    /// Vertical soft-edged gradient spanning the band's mean top and bottom
    pub fn gradient(sample: &GeometrySample, band: &BandModel) -> LinearGradient {
        let (top, bottom) = sample.mean_edges();
        let mut gradient = LinearGradient::new(Vec2::new(0.0, top), Vec2::new(0.0, bottom));
        for (offset, weight) in GRADIENT_STOPS {
            gradient.add_color_stop(offset, band.color.with_alpha(band.base_alpha * weight));
        }
        gradient
    }

    /// Build the band outline and fill it
    pub fn render<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        sample: &GeometrySample,
        band: &BandModel,
    ) {
        let points = &sample.points;
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return;
        };
        debug_assert!(points.len() >= 2);

        let gradient = Self::gradient(sample, band);

        surface.begin_path();

        // Top edge, left to right; each curve ends halfway to the next sample
        surface.move_to(Vec2::new(first.x, first.top));
        for pair in points.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            surface.quadratic_curve_to(
                Vec2::new(prev.x, prev.top),
                Vec2::new((prev.x + curr.x) / 2.0, (prev.top + curr.top) / 2.0),
            );
        }
        surface.line_to(Vec2::new(last.x, last.top));

        // Bottom edge, right to left
        surface.line_to(Vec2::new(last.x, last.bottom));
        for pair in points.windows(2).rev() {
            let (curr, prev) = (pair[0], pair[1]);
            surface.quadratic_curve_to(
                Vec2::new(prev.x, prev.bottom),
                Vec2::new((prev.x + curr.x) / 2.0, (prev.bottom + curr.bottom) / 2.0),
            );
        }

        surface.close_path();
        surface.fill(&gradient);
    }
}
