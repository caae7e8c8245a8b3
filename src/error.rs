//! Error types for configuration loading and presentation.

use std::path::PathBuf;

use thiserror::Error;

/// Failure loading or validating the band configuration table
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read band table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse band table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("band table is empty")]
    Empty,

    #[error("band {index}: {field} = {value} is out of range ({expected})")]
    OutOfRange {
        index: usize,
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
}

/// Failure setting up or driving the presentation layer
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("surface reports no supported {0}")]
    UnsupportedSurface(&'static str),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface lost or outdated: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("failed to export frame {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
