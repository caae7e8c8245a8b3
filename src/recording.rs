//! Headless recording: drive the animation offline and save PNG frames.

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::animation::{AnimationDriver, OfflineScheduler};
use crate::error::RenderError;
use crate::params::{RecordingConfig, RenderConfig};
use crate::raster::PixelCanvas;

/// Render `recording.total_frames()` frames at `output_size`
///
/// Frames are drawn at the working (downscaled) size and stretched back up
/// with a triangle filter, matching the windowed soft-focus look. Returns the
/// number of frames written.
pub fn record(
    driver: &mut AnimationDriver,
    render: &RenderConfig,
    recording: &RecordingConfig,
    output_size: (u32, u32),
) -> Result<usize, RenderError> {
    let frames_dir = recording.frames_dir();
    std::fs::create_dir_all(&frames_dir).map_err(|source| RenderError::OutputDir {
        path: frames_dir.clone(),
        source,
    })?;

    let working = render.working_viewport(output_size.0, output_size.1);
    let mut canvas = PixelCanvas::new(working.width, working.height);
    let mut scheduler = OfflineScheduler::new();

    let total = recording.total_frames();
    log::info!(
        "Recording {} frames ({}x{}, raster {}x{}) to {}",
        total,
        output_size.0,
        output_size.1,
        working.width,
        working.height,
        frames_dir.display()
    );

    driver.start(&mut scheduler);
    let mut written = 0;
    while written < total {
        let Some(handle) = scheduler.next_frame() else {
            break;
        };
        if driver.on_frame(handle, &mut canvas, &mut scheduler).is_none() {
            break;
        }

        let raster = RgbImage::from_raw(
            working.width,
            working.height,
            canvas.to_rgb8_over(render.background),
        );
        let Some(raster) = raster else {
            break;
        };
        let frame = imageops::resize(&raster, output_size.0, output_size.1, FilterType::Triangle);

        let path = recording.frame_path(written);
        frame
            .save(&path)
            .map_err(|source| RenderError::Export { path, source })?;
        written += 1;

        if written % recording.fps.max(1) as usize == 0 {
            log::debug!("Recorded {}/{} frames", written, total);
        }
    }
    driver.stop(&mut scheduler);

    log::info!("Recording complete: {} frames", written);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::BandSystem;
    use crate::params::default_band_table;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_record_writes_numbered_frames() {
        let dir = std::env::temp_dir().join(format!("aurora-record-{}", std::process::id()));
        let mut recording = RecordingConfig::new(1.0);
        recording.fps = 2;
        recording.output_dir = dir.clone();

        let render = RenderConfig::default();
        let system = BandSystem::new(&default_band_table(), 3.0, &mut StdRng::seed_from_u64(4));
        let mut driver = AnimationDriver::new(system, false);

        let written = record(&mut driver, &render, &recording, (40, 30)).unwrap();
        assert_eq!(written, 2);
        assert_eq!(driver.frame_count(), 2);

        let frame = image::open(recording.frame_path(1)).unwrap();
        assert_eq!((frame.width(), frame.height()), (40, 30));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_record_with_reduced_motion_writes_nothing() {
        let dir = std::env::temp_dir().join(format!("aurora-inert-{}", std::process::id()));
        let mut recording = RecordingConfig::new(1.0);
        recording.output_dir = dir.clone();

        let system = BandSystem::new(&default_band_table(), 3.0, &mut StdRng::seed_from_u64(4));
        let mut driver = AnimationDriver::new(system, true);

        let written = record(&mut driver, &RenderConfig::default(), &recording, (40, 30)).unwrap();
        assert_eq!(written, 0);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
