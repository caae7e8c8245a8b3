//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers of the scene live here:
//! - Fractions are relative to the working raster height
//! - Pixel quantities refer to the working raster unless stated otherwise

mod bands;
mod render;

// Re-export all types
pub use bands::{default_band_table, load_band_table, parse_band_table, BandConfig};
pub use render::{RecordingConfig, RenderConfig, Viewport};
