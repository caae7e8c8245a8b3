//! Frame-driven animation loop around the band system.
//!
//! The driver owns the monotonic frame counter and at most one outstanding
//! frame request. It never talks to a clock: time advances by exactly one per
//! drawn frame, so pausing and resuming continues where it left off.

use std::time::{Duration, Instant};

use crate::bands::BandSystem;
use crate::params::Viewport;
use crate::surface::DrawingSurface;

/// Opaque token for one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Source of per-refresh callbacks
pub trait FrameScheduler {
    /// Ask for one frame callback
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a previously requested callback
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Lifecycle of the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Reduced motion requested: never schedules, never draws
    Inert,
    /// Built but not started
    Idle,
    Running,
    Paused,
    Stopped,
}

/// Explicit animation state: frame counter plus the pending frame request
pub struct AnimationDriver {
    system: BandSystem,
    frame_count: u64,
    scheduled: Option<FrameHandle>,
    state: DriverState,
}

impl AnimationDriver {
    /// Wrap a band system; `reduced_motion` makes the whole driver inert
    pub fn new(system: BandSystem, reduced_motion: bool) -> Self {
        let state = if reduced_motion {
            log::info!("Reduced motion preferred; animation disabled");
            DriverState::Inert
        } else {
            DriverState::Idle
        };
        Self {
            system,
            frame_count: 0,
            scheduled: None,
            state,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Number of frames drawn so far (also the time of the next frame)
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn scheduled(&self) -> Option<FrameHandle> {
        self.scheduled
    }

    pub fn system(&self) -> &BandSystem {
        &self.system
    }

    /// Begin animating: request the first frame
    pub fn start<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        if self.state != DriverState::Idle {
            return;
        }
        self.state = DriverState::Running;
        self.schedule(scheduler);
        log::debug!("Animation started");
    }

    /// Frame callback: draw all bands at the current time, then request the
    /// next frame
    ///
    /// Returns the time value drawn, or `None` when `handle` is stale (the
    /// request was cancelled or superseded) or the driver is not running.
    pub fn on_frame<F, S>(
        &mut self,
        handle: FrameHandle,
        surface: &mut S,
        scheduler: &mut F,
    ) -> Option<u64>
    where
        F: FrameScheduler + ?Sized,
        S: DrawingSurface + ?Sized,
    {
        if self.state != DriverState::Running || self.scheduled != Some(handle) {
            log::trace!("Ignoring stale frame {:?}", handle);
            return None;
        }
        self.scheduled = None;

        let time = self.frame_count;
        self.system.draw(time as f64, surface);
        self.frame_count += 1;

        self.schedule(scheduler);
        Some(time)
    }

    /// Stop requesting frames, keeping the counter (hidden window, zero size)
    pub fn pause<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        if self.state != DriverState::Running {
            return;
        }
        self.cancel(scheduler);
        self.state = DriverState::Paused;
        log::debug!("Animation paused at frame {}", self.frame_count);
    }

    /// Continue from a pause without resetting the counter
    pub fn resume<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        if self.state != DriverState::Paused {
            return;
        }
        self.state = DriverState::Running;
        self.schedule(scheduler);
        log::debug!("Animation resumed at frame {}", self.frame_count);
    }

    /// Tear down: cancel any pending frame; the driver cannot restart
    pub fn stop<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        if self.state == DriverState::Inert {
            return;
        }
        self.cancel(scheduler);
        self.state = DriverState::Stopped;
    }

    fn schedule<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        if self.scheduled.is_none() {
            self.scheduled = Some(scheduler.request_frame());
        }
    }

    fn cancel<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        if let Some(handle) = self.scheduled.take() {
            scheduler.cancel_frame(handle);
        }
    }
}

/// Scheduler that queues at most one frame and hands it out on demand
///
/// Drives the headless recorder and the tests.
#[derive(Debug, Default)]
pub struct OfflineScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
    requested: usize,
    cancelled: usize,
}

impl OfflineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending frame, if any
    pub fn next_frame(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Total frames ever requested
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for OfflineScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

/// Window visibility as seen by the animation: hidden or zero-sized pauses it
#[derive(Debug, Default, Clone, Copy)]
pub struct Visibility {
    occluded: bool,
    minimized: bool,
}

impl Visibility {
    pub fn set_occluded(&mut self, occluded: bool) {
        self.occluded = occluded;
    }

    /// Track the reported window size; an empty size counts as minimized
    pub fn set_size(&mut self, size: Viewport) {
        self.minimized = size.is_empty();
    }

    pub fn is_visible(&self) -> bool {
        !self.occluded && !self.minimized
    }

    /// Pause or resume `driver` to match the current visibility
    pub fn apply<F>(&self, driver: &mut AnimationDriver, scheduler: &mut F)
    where
        F: FrameScheduler + ?Sized,
    {
        if self.is_visible() {
            driver.resume(scheduler);
        } else {
            driver.pause(scheduler);
        }
    }
}

/// Coalesces a burst of resize events into the last size, once the burst
/// has been quiet for a while
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    quiet: Duration,
    pending: Option<(Viewport, Instant)>,
}

impl ResizeDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Record a resize at `now`; empty sizes are ignored
    pub fn notify(&mut self, size: Viewport, now: Instant) {
        if !size.is_empty() {
            self.pending = Some((size, now));
        }
    }

    /// Size to apply, once the quiet period since the last event has passed
    pub fn poll(&mut self, now: Instant) -> Option<Viewport> {
        let (size, at) = self.pending?;
        if now.duration_since(at) < self.quiet {
            return None;
        }
        self.pending = None;
        Some(size)
    }

    /// When the pending resize becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at + self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::default_band_table;
    use crate::surface::{DrawCall, RecordingSurface};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn driver(reduced_motion: bool) -> AnimationDriver {
        let system = BandSystem::new(&default_band_table(), 3.0, &mut StdRng::seed_from_u64(17));
        AnimationDriver::new(system, reduced_motion)
    }

    /// Run `n` frames, returning the times drawn
    fn run(
        driver: &mut AnimationDriver,
        scheduler: &mut OfflineScheduler,
        surface: &mut RecordingSurface,
        n: usize,
    ) -> Vec<u64> {
        (0..n)
            .filter_map(|_| {
                let handle = scheduler.next_frame()?;
                driver.on_frame(handle, surface, scheduler)
            })
            .collect()
    }

    #[test]
    fn test_frames_advance_time_by_one() {
        let mut driver = driver(false);
        let mut scheduler = OfflineScheduler::new();
        let mut surface = RecordingSurface::new(200, 100);

        driver.start(&mut scheduler);
        let times = run(&mut driver, &mut scheduler, &mut surface, 4);

        assert_eq!(times, vec![0, 1, 2, 3]);
        assert_eq!(driver.frame_count(), 4);
        assert!(scheduler.pending().is_some());
    }

    #[test]
    fn test_reduced_motion_is_inert() {
        let mut driver = driver(true);
        let mut scheduler = OfflineScheduler::new();
        let mut surface = RecordingSurface::new(200, 100);

        driver.start(&mut scheduler);
        driver.resume(&mut scheduler);
        // Even a forged handle draws nothing
        assert_eq!(driver.on_frame(FrameHandle(1), &mut surface, &mut scheduler), None);

        assert_eq!(driver.state(), DriverState::Inert);
        assert_eq!(scheduler.requested(), 0);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_pause_leaves_no_pending_frame() {
        let mut driver = driver(false);
        let mut scheduler = OfflineScheduler::new();
        let mut surface = RecordingSurface::new(60, 40);

        driver.start(&mut scheduler);
        run(&mut driver, &mut scheduler, &mut surface, 2);
        driver.pause(&mut scheduler);

        assert_eq!(driver.state(), DriverState::Paused);
        assert_eq!(driver.scheduled(), None);
        assert_eq!(scheduler.pending(), None);
        assert_eq!(scheduler.cancelled(), 1);
    }

    #[test]
    fn test_resume_continues_counter() {
        let mut driver = driver(false);
        let mut scheduler = OfflineScheduler::new();
        let mut surface = RecordingSurface::new(60, 40);

        driver.start(&mut scheduler);
        let before = run(&mut driver, &mut scheduler, &mut surface, 5);
        let last = *before.last().unwrap();

        driver.pause(&mut scheduler);
        driver.resume(&mut scheduler);
        let after = run(&mut driver, &mut scheduler, &mut surface, 1);
        assert_eq!(after, vec![last + 1]);

        let band = &driver.system().bands()[0];
        let expected = 0.002 * band.speed as f64 * (last + 1) as f64;
        assert!((band.temporal_coordinate(after[0] as f64) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_stale_handle_is_ignored() {
        let mut driver = driver(false);
        let mut scheduler = OfflineScheduler::new();
        let mut surface = RecordingSurface::new(60, 40);

        driver.start(&mut scheduler);
        let stale = scheduler.pending().unwrap();
        driver.pause(&mut scheduler);
        driver.resume(&mut scheduler);

        assert_eq!(driver.on_frame(stale, &mut surface, &mut scheduler), None);
        assert!(surface.calls.is_empty());
        assert_eq!(driver.frame_count(), 0);
    }

    #[test]
    fn test_stop_cancels_and_stays_stopped() {
        let mut driver = driver(false);
        let mut scheduler = OfflineScheduler::new();
        let mut surface = RecordingSurface::new(60, 40);

        driver.start(&mut scheduler);
        driver.stop(&mut scheduler);
        driver.resume(&mut scheduler);

        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(scheduler.pending(), None);
        assert!(run(&mut driver, &mut scheduler, &mut surface, 3).is_empty());
    }

    #[test]
    fn test_frame_draws_every_band() {
        let mut driver = driver(false);
        let mut scheduler = OfflineScheduler::new();
        let mut surface = RecordingSurface::new(90, 60);

        driver.start(&mut scheduler);
        run(&mut driver, &mut scheduler, &mut surface, 1);

        let clears = surface
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::ClearRect { .. }))
            .count();
        assert_eq!(clears, 1);
        assert_eq!(surface.fills().count(), 7);
    }

    #[test]
    fn test_resize_burst_applies_last_size_after_quiet() {
        let mut debouncer = ResizeDebouncer::new(Duration::from_millis(200));
        let t0 = Instant::now();
        let ms = Duration::from_millis;

        debouncer.notify(Viewport::new(800, 600), t0);
        debouncer.notify(Viewport::new(900, 600), t0 + ms(50));
        debouncer.notify(Viewport::new(1000, 700), t0 + ms(120));

        assert_eq!(debouncer.poll(t0 + ms(200)), None);
        assert_eq!(debouncer.deadline(), Some(t0 + ms(320)));
        assert_eq!(debouncer.poll(t0 + ms(319)), None);
        assert_eq!(debouncer.poll(t0 + ms(320)), Some(Viewport::new(1000, 700)));
        assert_eq!(debouncer.poll(t0 + ms(1000)), None);
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_resize_ignores_empty_size() {
        let mut debouncer = ResizeDebouncer::new(Duration::from_millis(200));
        let t0 = Instant::now();
        debouncer.notify(Viewport::new(0, 0), t0);
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_zero_size_pauses_until_next_real_size() {
        let mut driver = driver(false);
        let mut scheduler = OfflineScheduler::new();
        let mut surface = RecordingSurface::new(60, 40);
        let mut visibility = Visibility::default();

        driver.start(&mut scheduler);
        run(&mut driver, &mut scheduler, &mut surface, 3);

        visibility.set_size(Viewport::new(0, 0));
        visibility.apply(&mut driver, &mut scheduler);
        assert_eq!(driver.state(), DriverState::Paused);
        assert_eq!(scheduler.pending(), None);

        visibility.set_size(Viewport::new(640, 480));
        visibility.apply(&mut driver, &mut scheduler);
        assert_eq!(driver.state(), DriverState::Running);
        assert_eq!(run(&mut driver, &mut scheduler, &mut surface, 1), vec![3]);
    }

    #[test]
    fn test_occlusion_keeps_paused_until_both_clear() {
        let mut driver = driver(false);
        let mut scheduler = OfflineScheduler::new();
        let mut visibility = Visibility::default();
        driver.start(&mut scheduler);

        visibility.set_occluded(true);
        visibility.apply(&mut driver, &mut scheduler);
        assert_eq!(driver.state(), DriverState::Paused);

        visibility.set_size(Viewport::new(0, 0));
        visibility.set_occluded(false);
        visibility.apply(&mut driver, &mut scheduler);
        assert_eq!(driver.state(), DriverState::Paused);

        visibility.set_size(Viewport::new(10, 10));
        visibility.apply(&mut driver, &mut scheduler);
        assert!(visibility.is_visible());
        assert_eq!(driver.state(), DriverState::Running);
        assert!(scheduler.pending().is_some());
    }
}
