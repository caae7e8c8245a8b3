//! Translucent aurora bands: models, noise-driven geometry and rendering.

mod geometry;
mod model;
mod renderer;
mod system;

// Re-export public types
pub use geometry::{EdgePoint, GeometryBuilder, GeometrySample};
pub use model::{BandModel, PHASE_RANGE};
pub use renderer::{BandRenderer, GRADIENT_STOPS};
pub use system::BandSystem;
