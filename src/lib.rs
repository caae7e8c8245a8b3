//! Aurora Bands library - noise-driven translucent ribbons

pub mod animation;
pub mod bands;
pub mod cli;
pub mod error;
pub mod noise;
pub mod params;
pub mod raster;
pub mod recording;
pub mod rendering;
pub mod surface;
