//! Rendering and recording configuration.

use std::path::PathBuf;

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Initial window width (pixels)
    pub window_width: u32,

    /// Initial window height (pixels)
    pub window_height: u32,

    /// Working raster scale relative to the window (0.5 = half resolution)
    /// The stretch back up to window size gives the bands their soft focus
    pub downscale: f32,

    /// Horizontal spacing between geometry samples (working raster pixels)
    pub sample_step_px: f32,

    /// Color behind the bands
    pub background: [u8; 3],

    /// Quiet period before a burst of resize events is applied (milliseconds)
    pub resize_debounce_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            downscale: 0.5,
            sample_step_px: 3.0,
            background: [248, 250, 249], // Near-white, lets the bands read as light
            resize_debounce_ms: 200,
        }
    }
}

impl RenderConfig {
    /// Working raster for a reported viewport size
    pub fn working_viewport(&self, width: u32, height: u32) -> Viewport {
        Viewport::scaled(width, height, self.downscale)
    }
}

/// Size of the working raster in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale a reported size, rounding up; never collapses below 1x1
    pub fn scaled(width: u32, height: u32, factor: f32) -> Self {
        let scale = |v: u32| ((v as f32 * factor).ceil() as u32).max(1);
        Self {
            width: scale(width),
            height: scale(height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Offline recording configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames
    pub output_dir: PathBuf,

    /// Frame rate (FPS)
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: PathBuf::from("recording"),
            fps: 60,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil().max(0.0) as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> PathBuf {
        self.output_dir.join("frames")
    }

    /// Path of one captured frame
    pub fn frame_path(&self, frame_num: usize) -> PathBuf {
        self.frames_dir().join(format!("frame_{:05}.png", frame_num))
    }
}
