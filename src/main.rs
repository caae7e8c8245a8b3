//! Aurora Bands - an ambient background of undulating, translucent color bands
//!
//! Soft green/teal ribbons drift like northern lights, driven by a lattice
//! noise field sampled once per frame.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use aurora_bands::animation::{
    AnimationDriver, FrameHandle, FrameScheduler, ResizeDebouncer, Visibility,
};
use aurora_bands::bands::BandSystem;
use aurora_bands::cli::Args;
use aurora_bands::params::{RenderConfig, Viewport};
use aurora_bands::raster::PixelCanvas;
use aurora_bands::recording;
use aurora_bands::rendering::RenderSystem;

/// Frame scheduler backed by winit redraw requests
///
/// winit cannot withdraw a redraw request, so cancellation drops the pending
/// handle and the next `RedrawRequested` finds nothing to run.
struct WindowScheduler {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl WindowScheduler {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            pending: None,
        }
    }

    fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

/// Main application state
struct App {
    // Window and presentation
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    scheduler: Option<WindowScheduler>,
    canvas: PixelCanvas,

    // Animation
    driver: AnimationDriver,

    // Configuration
    render_config: RenderConfig,

    // Viewport tracking
    resize: ResizeDebouncer,
    visibility: Visibility,
}

impl App {
    fn new(render_config: RenderConfig, driver: AnimationDriver) -> Self {
        let working =
            render_config.working_viewport(render_config.window_width, render_config.window_height);
        Self {
            window: None,
            render_system: None,
            scheduler: None,
            canvas: PixelCanvas::new(working.width, working.height),
            driver,
            resize: ResizeDebouncer::new(Duration::from_millis(render_config.resize_debounce_ms)),
            render_config,
            visibility: Visibility::default(),
        }
    }

    /// Pause while hidden or zero-sized, resume otherwise
    fn update_visibility(&mut self) {
        if let Some(scheduler) = self.scheduler.as_mut() {
            self.visibility.apply(&mut self.driver, scheduler);
        }
    }

    /// Resize the working raster once a resize burst has gone quiet
    fn apply_pending_resize(&mut self, now: Instant) {
        let Some(size) = self.resize.poll(now) else {
            return;
        };
        let working = self.render_config.working_viewport(size.width, size.height);
        self.canvas.resize(working.width, working.height);
        log::info!(
            "Viewport {}x{} -> raster {}x{}",
            size.width,
            size.height,
            working.width,
            working.height
        );
    }

    /// Render a single frame
    fn render_frame(&mut self) {
        let (Some(scheduler), Some(render_system)) =
            (self.scheduler.as_mut(), self.render_system.as_mut())
        else {
            return;
        };
        let Some(handle) = scheduler.take_pending() else {
            return;
        };

        if self
            .driver
            .on_frame(handle, &mut self.canvas, scheduler)
            .is_none()
        {
            return;
        }

        render_system.upload(&self.canvas);
        if let Err(e) = render_system.render() {
            log::error!("Render error: {}", e);
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(scheduler) = self.scheduler.as_mut() {
            self.driver.stop(scheduler);
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        // Create window
        let window_attributes = Window::default_attributes()
            .with_title("Aurora Bands")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        // No drawing surface means nothing to animate: stay quiet and leave
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::warn!("No window available ({}); aurora disabled", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let working = self
            .render_config
            .working_viewport(size.width.max(1), size.height.max(1));
        self.canvas.resize(working.width, working.height);

        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            (working.width, working.height),
            self.render_config.background,
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                log::warn!("No rendering surface available ({}); aurora disabled", e);
                event_loop.exit();
                return;
            }
        };

        let mut scheduler = WindowScheduler::new(Arc::clone(&window));
        self.driver.start(&mut scheduler);

        log::info!("Aurora is running (ESC to quit)");

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.scheduler = Some(scheduler);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Occluded(occluded) => {
                self.visibility.set_occluded(occluded);
                self.update_visibility();
            }
            WindowEvent::Resized(size) => {
                let size = Viewport::new(size.width, size.height);
                // The swapchain follows the window at once; only the raster waits
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
                self.resize.notify(size, Instant::now());
                self.visibility.set_size(size);
                self.update_visibility();
            }
            WindowEvent::RedrawRequested => self.render_frame(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.apply_pending_resize(Instant::now());

        match self.resize.deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Reduced motion: touch nothing, schedule nothing
    if args.reduced_motion {
        log::info!("Reduced motion preferred; aurora stays inert");
        return Ok(());
    }

    let render_config = args.render_config();
    let table = args.band_table()?;
    let mut rng = args.rng();
    let system = BandSystem::new(&table, render_config.sample_step_px, &mut rng);
    let mut driver = AnimationDriver::new(system, false);

    if let Some(recording_config) = args.recording_config() {
        let output_size = (render_config.window_width, render_config.window_height);
        recording::record(&mut driver, &render_config, &recording_config, output_size)?;
        return Ok(());
    }

    log::info!("Aurora Bands - {} bands", table.len());

    let mut app = App::new(render_config, driver);
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
