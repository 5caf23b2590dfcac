//! Window host: `HeartField` builder and the winit application.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::animator::{FrameRequest, FrameScheduler, ParticleFieldAnimator};
use crate::config::FieldConfig;
use crate::error::FieldError;
use crate::gpu::GpuState;
use crate::input::{Action, Input};
use crate::time::Clock;

/// A heart field window builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// ```ignore
/// HeartField::new()
///     .with_point_count(300)
///     .with_edge_threshold(0.38)
///     .with_reshape_interval(8.0)
///     .run()?;
/// ```
#[derive(Debug, Clone)]
pub struct HeartField {
    config: FieldConfig,
    title: String,
    window_size: (u32, u32),
}

impl HeartField {
    /// Create a heart field with default settings.
    pub fn new() -> Self {
        Self::from_config(FieldConfig::default())
    }

    pub fn from_config(config: FieldConfig) -> Self {
        Self {
            config,
            title: "Heart Field".to_string(),
            window_size: (1280, 720),
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn with_point_count(mut self, count: u32) -> Self {
        self.config.point_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the maximum distance at which two points are joined by a line.
    pub fn with_edge_threshold(mut self, threshold: f32) -> Self {
        self.config.edge_threshold = threshold;
        self
    }

    pub fn with_camera_distance(mut self, distance: f32) -> Self {
        self.config.camera_distance = distance;
        self
    }

    /// Set how far and how hard the pointer pushes points away.
    pub fn with_repulsion(mut self, radius: f32, strength: f32) -> Self {
        self.config.repel_radius = radius;
        self.config.repel_strength = strength;
        self
    }

    pub fn with_morph_rate(mut self, rate: f32) -> Self {
        self.config.morph_rate = rate;
        self
    }

    /// Set the two sinusoids of the breathing pulse.
    pub fn with_pulse(mut self, amplitudes: [f32; 2], frequencies: [f32; 2]) -> Self {
        self.config.pulse.amplitudes = amplitudes;
        self.config.pulse.frequencies = frequencies;
        self
    }

    pub fn with_jitter_amplitude(mut self, min: f32, max: f32) -> Self {
        self.config.jitter_amplitude = [min, max];
        self
    }

    /// Regenerate the shape every `secs` seconds.
    pub fn with_reshape_interval(mut self, secs: f32) -> Self {
        self.config.reshape.enabled = true;
        self.config.reshape.interval_secs = secs;
        self
    }

    /// Let the camera drift around the heart and follow the pointer.
    pub fn with_camera_orbit(mut self, enabled: bool) -> Self {
        self.config.camera_orbit = enabled;
        self
    }

    /// Set the point and line colour (RGB, 0.0-1.0).
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.config.visuals.color = color;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), FieldError> {
        self.config.validate()?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for HeartField {
    fn default() -> Self {
        Self::new()
    }
}

/// Schedules frames with `Window::request_redraw`.
///
/// A redraw request cannot be withdrawn, so cancellation only forgets the
/// request; the host drops redraws that arrive without one pending.
pub struct WindowScheduler {
    window: Arc<Window>,
    next: u64,
    pending: Option<FrameRequest>,
}

impl WindowScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next: 0,
            pending: None,
        }
    }

    /// Ask for the pending frame again, e.g. after the host was paused.
    fn wake(&self) {
        if self.pending.is_some() {
            self.window.request_redraw();
        }
    }
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next += 1;
        let request = FrameRequest(self.next);
        self.pending = Some(request);
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

type WindowAnimator = ParticleFieldAnimator<WindowScheduler, GpuState>;

struct App {
    builder: HeartField,
    window: Option<Arc<Window>>,
    animator: Option<WindowAnimator>,
    input: Input,
    clock: Clock,
    user_paused: bool,
    occluded: bool,
    error: Option<FieldError>,
}

impl App {
    fn new(builder: HeartField) -> Self {
        Self {
            builder,
            window: None,
            animator: None,
            input: Input::new(),
            clock: Clock::new(),
            user_paused: false,
            occluded: false,
            error: None,
        }
    }

    fn mount(&mut self, event_loop: &ActiveEventLoop) -> Result<(), FieldError> {
        let (width, height) = self.builder.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(self.builder.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(width, height))
            .with_transparent(self.builder.config.visuals.background[3] < 1.0);

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());

        let size = window.inner_size();
        let config = self.builder.config.clone();
        let gpu = pollster::block_on(GpuState::new(
            window.clone(),
            config.point_count as usize,
            config.visuals,
        ))?;

        self.input.set_window_size(size.width, size.height);
        let animator = ParticleFieldAnimator::mount(
            config,
            WindowScheduler::new(window),
            gpu,
            size.width,
            size.height,
        )?;
        self.animator = Some(animator);
        self.clock = Clock::new();
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(animator) = &mut self.animator {
            animator.dispose();
        }
        event_loop.exit();
    }

    fn set_paused(&mut self) {
        let paused = self.user_paused || self.occluded;
        if paused == self.clock.is_paused() {
            return;
        }
        if paused {
            log::debug!("Paused at {:.2}s", self.clock.elapsed());
            self.clock.pause();
        } else {
            log::debug!("Resumed at {:.2}s", self.clock.elapsed());
            self.clock.resume();
            if let Some(animator) = &self.animator {
                animator.scheduler().wake();
            }
        }
    }

    fn handle_actions(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.triggered(Action::Quit) {
            self.shutdown(event_loop);
        }
        if self.input.triggered(Action::Reshape) {
            if let Some(animator) = &mut self.animator {
                animator.reshape();
            }
        }
        if self.input.triggered(Action::TogglePause) {
            self.user_paused = !self.user_paused;
            self.set_paused();
        }
        self.input.begin_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.mount(event_loop) {
            log::error!("Failed to start heart field: {}", err);
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.input.handle_event(&event) {
            if let Some(animator) = &mut self.animator {
                animator.pointer_moved(self.input.pointer_ndc());
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(physical_size) => {
                let pointer = self
                    .input
                    .set_window_size(physical_size.width, physical_size.height);
                if let Some(animator) = &mut self.animator {
                    animator.resized(physical_size.width, physical_size.height);
                    if let Some(ndc) = pointer {
                        animator.pointer_moved(ndc);
                    }
                }
            }
            WindowEvent::Occluded(occluded) => {
                self.occluded = occluded;
                self.set_paused();
            }
            WindowEvent::KeyboardInput { .. } => {
                self.handle_actions(event_loop);
            }
            WindowEvent::RedrawRequested => {
                if self.clock.is_paused() {
                    return;
                }
                if let Some(animator) = &mut self.animator {
                    if !animator.has_pending_frame() {
                        return;
                    }
                    let elapsed = self.clock.tick();
                    animator.on_frame(elapsed);
                    if animator.is_disposed() {
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }
}
