//! Lifecycle of one mounted heart field.
//!
//! [`ParticleFieldAnimator::mount`] builds the field, hands the edges to the
//! renderer and requests the first frame. Each [`on_frame`] runs the motion
//! step, draws, and requests the next frame, so at most one frame is ever
//! pending and a paused host accumulates no backlog. [`dispose`] cancels the
//! pending frame and releases the renderer; it is idempotent and also runs
//! on drop.
//!
//! The two seams are traits so the loop can run without a window:
//!
//! - [`FrameScheduler`]: "call me on the next display refresh"
//! - [`FrameSink`]: receives edges once per shape and a [`Frame`] per tick
//!
//! [`on_frame`]: ParticleFieldAnimator::on_frame
//! [`dispose`]: ParticleFieldAnimator::dispose

use glam::{Mat4, Vec2};

use crate::config::FieldConfig;
use crate::edges::EdgeList;
use crate::error::{ConfigError, RenderError};
use crate::field::PointField;
use crate::motion::{MotionController, MotionParams, PointerSample};
use crate::viewport::Viewport;

/// Handle of a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Host primitive that runs a callback on the next display refresh.
pub trait FrameScheduler {
    /// Schedule one call to [`ParticleFieldAnimator::on_frame`].
    fn request_frame(&mut self) -> FrameRequest;
    /// Withdraw a request that has not fired yet.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Flat `x, y, z` live positions in group-local space.
    pub live: &'a [f32],
    /// Pulse scale and pointer tilt of the whole group.
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Frame<'_> {
    pub fn point_count(&self) -> usize {
        self.live.len() / 3
    }
}

/// Renderer side of the frame loop.
pub trait FrameSink {
    /// The host viewport changed size.
    fn resize(&mut self, width: u32, height: u32);
    /// A new edge set was built (at mount and after each reshape).
    fn update_edges(&mut self, edges: &EdgeList);
    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), RenderError>;
    /// Free all rendering resources. Called exactly once.
    fn release(&mut self);
}

/// A mounted heart field driving a scheduler and a sink.
pub struct ParticleFieldAnimator<S: FrameScheduler, R: FrameSink> {
    config: FieldConfig,
    field: PointField,
    motion: MotionController,
    viewport: Viewport,
    pointer: Option<Vec2>,
    scheduler: S,
    sink: R,
    pending: Option<FrameRequest>,
    disposed: bool,
    last_elapsed: f32,
    last_reshape: f32,
    frames: u64,
}

impl<S: FrameScheduler, R: FrameSink> ParticleFieldAnimator<S, R> {
    /// Build the field and start the frame loop.
    ///
    /// Fails only if `config` does not validate; nothing is scheduled then.
    pub fn mount(
        config: FieldConfig,
        mut scheduler: S,
        mut sink: R,
        width: u32,
        height: u32,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let field = PointField::from_config(&config);
        let motion = MotionController::new(MotionParams::from_config(&config));
        let viewport = Viewport::from_config(&config, width, height);

        sink.resize(width, height);
        sink.update_edges(field.edges());
        let pending = Some(scheduler.request_frame());

        log::info!(
            "Mounted heart field: {} points, {} edges (threshold {}, seed {})",
            field.len(),
            field.edges().len(),
            config.edge_threshold,
            config.seed
        );

        Ok(Self {
            config,
            field,
            motion,
            viewport,
            pointer: None,
            scheduler,
            sink,
            pending,
            disposed: false,
            last_elapsed: 0.0,
            last_reshape: 0.0,
            frames: 0,
        })
    }

    /// Run one tick at `elapsed` seconds since mount.
    ///
    /// Does nothing once disposed. Renderer failures are handled here and
    /// never propagate.
    pub fn on_frame(&mut self, elapsed: f32) {
        if self.disposed {
            return;
        }
        // The request that brought us here has fired.
        self.pending = None;
        self.last_elapsed = elapsed;

        let reshape = &self.config.reshape;
        if reshape.enabled && elapsed - self.last_reshape >= reshape.interval_secs {
            self.reshape();
        }

        // The pointer ray is cast through the camera this frame renders with.
        let ndc = self.pointer.unwrap_or(Vec2::ZERO);
        if self.config.camera_orbit {
            self.viewport.camera_mut().orbit(elapsed, ndc);
        }
        if self.pointer.is_some() {
            self.viewport.update_pointer_world(ndc);
        }

        let sample = PointerSample {
            ndc,
            world: self.viewport.pointer_world(),
        };
        self.motion.step(&mut self.field, elapsed, sample);

        let camera = self.viewport.camera();
        let frame = Frame {
            live: self.field.live(),
            model: self.motion.group().matrix(),
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
        };

        match self.sink.draw(&frame) {
            Ok(()) => self.frames += 1,
            Err(RenderError::SurfaceLost) => {
                log::debug!("Surface lost, reconfiguring");
                let (width, height) = self.viewport.size();
                self.sink.resize(width, height);
            }
            Err(RenderError::Skipped(reason)) => {
                log::warn!("Frame skipped: {}", reason);
            }
            Err(RenderError::Fatal(reason)) => {
                log::error!("Rendering stopped: {}", reason);
                self.dispose();
            }
        }

        if !self.disposed {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    /// Record the latest pointer position in normalized device coordinates.
    ///
    /// Last value wins; it is read once at the top of the next frame.
    pub fn pointer_moved(&mut self, ndc: Vec2) {
        self.pointer = Some(ndc);
    }

    /// Like [`pointer_moved`](Self::pointer_moved) with a position in
    /// viewport pixels.
    pub fn pointer_moved_pixels(&mut self, position: Vec2) {
        self.pointer = Some(self.viewport.to_ndc(position));
    }

    /// The host viewport changed size.
    pub fn resized(&mut self, width: u32, height: u32) {
        if self.disposed {
            return;
        }
        self.viewport.resize(width, height);
        self.sink.resize(width, height);
    }

    /// Regenerate the shape from the next seed generation and hand the new
    /// edges to the renderer. Returns the new generation, or `None` once
    /// disposed.
    pub fn reshape(&mut self) -> Option<u32> {
        if self.disposed {
            return None;
        }
        let generation = self.field.reshape();
        self.last_reshape = self.last_elapsed;
        self.sink.update_edges(self.field.edges());
        log::debug!(
            "Reshaped to generation {} ({} edges)",
            generation,
            self.field.edges().len()
        );
        Some(generation)
    }

    /// Stop the frame loop and release the renderer. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(request) = self.pending.take() {
            self.scheduler.cancel_frame(request);
        }
        self.sink.release();
        log::info!("Heart field disposed after {} frames", self.frames);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    /// Frames drawn successfully.
    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn field(&self) -> &PointField {
        &self.field
    }

    pub fn motion(&self) -> &MotionController {
        &self.motion
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut R {
        &mut self.sink
    }
}

impl<S: FrameScheduler, R: FrameSink> Drop for ParticleFieldAnimator<S, R> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::ray::Plane;

    #[derive(Default)]
    struct Scheduler {
        next: u64,
        live: Vec<FrameRequest>,
        cancelled: Vec<FrameRequest>,
    }

    impl FrameScheduler for Scheduler {
        fn request_frame(&mut self) -> FrameRequest {
            self.next += 1;
            let request = FrameRequest(self.next);
            self.live.push(request);
            request
        }

        fn cancel_frame(&mut self, request: FrameRequest) {
            self.live.retain(|r| *r != request);
            self.cancelled.push(request);
        }
    }

    #[derive(Default)]
    struct Sink {
        draws: usize,
        resizes: Vec<(u32, u32)>,
        edge_uploads: usize,
        releases: usize,
        fail_with: Option<RenderError>,
    }

    impl FrameSink for Sink {
        fn resize(&mut self, width: u32, height: u32) {
            self.resizes.push((width, height));
        }

        fn update_edges(&mut self, _edges: &EdgeList) {
            self.edge_uploads += 1;
        }

        fn draw(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
            assert!(frame.live.iter().all(|v| v.is_finite()));
            self.draws += 1;
            match self.fail_with.clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn release(&mut self) {
            self.releases += 1;
        }
    }

    fn small_config() -> FieldConfig {
        FieldConfig {
            point_count: 24,
            ..FieldConfig::default()
        }
    }

    fn mount(config: FieldConfig) -> ParticleFieldAnimator<Scheduler, Sink> {
        ParticleFieldAnimator::mount(config, Scheduler::default(), Sink::default(), 800, 600).unwrap()
    }

    #[test]
    fn test_mount_requests_first_frame() {
        let animator = mount(small_config());
        assert!(animator.has_pending_frame());
        assert_eq!(animator.scheduler().live.len(), 1);
        assert_eq!(animator.sink().edge_uploads, 1);
        assert_eq!(animator.sink().resizes, vec![(800, 600)]);
        assert_eq!(animator.field().live().len(), 72);
    }

    #[test]
    fn test_mount_rejects_invalid_config() {
        let config = FieldConfig {
            point_count: 0,
            ..FieldConfig::default()
        };
        let result =
            ParticleFieldAnimator::mount(config, Scheduler::default(), Sink::default(), 800, 600);
        assert!(matches!(result, Err(ConfigError::Invalid { field: "point_count", .. })));
    }

    #[test]
    fn test_frame_draws_then_reschedules() {
        let mut animator = mount(small_config());
        animator.on_frame(0.016);
        animator.on_frame(0.033);
        assert_eq!(animator.sink().draws, 2);
        assert_eq!(animator.frames_drawn(), 2);
        assert!(animator.has_pending_frame());
        assert_eq!(animator.scheduler().next, 3);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut animator = mount(small_config());
        animator.on_frame(0.016);
        animator.dispose();
        animator.dispose();

        assert!(animator.is_disposed());
        assert!(!animator.has_pending_frame());
        assert_eq!(animator.sink().releases, 1);
        assert_eq!(animator.scheduler().cancelled, vec![FrameRequest(2)]);

        animator.on_frame(0.033);
        animator.resized(10, 10);
        assert_eq!(animator.reshape(), None);
        assert_eq!(animator.sink().draws, 1);
        assert_eq!(animator.scheduler().next, 2);
    }

    #[test]
    fn test_recoverable_errors_keep_looping() {
        let mut animator = mount(small_config());
        animator.sink_mut().fail_with = Some(RenderError::SurfaceLost);
        animator.on_frame(0.016);
        assert!(animator.has_pending_frame());
        assert_eq!(animator.sink().resizes.last(), Some(&(800, 600)));

        animator.sink_mut().fail_with = Some(RenderError::Skipped("timeout".into()));
        animator.on_frame(0.033);
        assert!(animator.has_pending_frame());
        assert!(!animator.is_disposed());
        assert_eq!(animator.frames_drawn(), 0);
    }

    #[test]
    fn test_fatal_error_disposes() {
        let mut animator = mount(small_config());
        animator.sink_mut().fail_with = Some(RenderError::Fatal("device lost".into()));
        animator.on_frame(0.016);
        assert!(animator.is_disposed());
        assert!(!animator.has_pending_frame());
        assert_eq!(animator.sink().releases, 1);
    }

    #[test]
    fn test_periodic_reshape() {
        let mut config = small_config();
        config.reshape.enabled = true;
        config.reshape.interval_secs = 1.0;
        let mut animator = mount(config);

        animator.on_frame(0.5);
        assert_eq!(animator.field().generation(), 0);
        animator.on_frame(1.0);
        assert_eq!(animator.field().generation(), 1);
        animator.on_frame(1.5);
        assert_eq!(animator.field().generation(), 1);
        animator.on_frame(2.1);
        assert_eq!(animator.field().generation(), 2);
        assert_eq!(animator.sink().edge_uploads, 3);
    }

    #[test]
    fn test_reshape_disabled_by_default() {
        let mut animator = mount(small_config());
        for i in 0..10 {
            animator.on_frame(i as f32 * 10.0);
        }
        assert_eq!(animator.field().generation(), 0);
    }

    #[test]
    fn test_pointer_resolves_on_next_frame() {
        let mut animator = mount(small_config());
        animator.on_frame(0.016);
        assert!(animator.viewport().pointer_world().is_none());

        animator.pointer_moved_pixels(Vec2::new(400.0, 300.0));
        animator.on_frame(0.033);
        let world = animator.viewport().pointer_world().unwrap();
        assert!(world.length() < 1e-3);
    }

    #[test]
    fn test_pointer_ray_uses_orbited_camera() {
        let config = FieldConfig {
            camera_orbit: true,
            ..small_config()
        };
        let mut animator = mount(config);
        let ndc = Vec2::new(0.5, 0.3);
        animator.pointer_moved(ndc);
        animator.on_frame(4.0);

        let hit = |camera: &Camera| {
            camera
                .ray_through(ndc)
                .and_then(|ray| ray.intersect_plane(&Plane::XY))
                .unwrap()
        };
        let world = animator.viewport().pointer_world().unwrap();
        assert!(animator.viewport().camera().yaw > 0.0);
        assert!((world - hit(animator.viewport().camera())).length() < 1e-5);

        let mut resting = animator.viewport().camera().clone();
        resting.yaw = 0.0;
        resting.offset = glam::Vec3::ZERO;
        assert!((world - hit(&resting)).length() > 1e-3);
    }

    #[test]
    fn test_resize_updates_camera_and_sink() {
        let mut animator = mount(small_config());
        animator.resized(1920, 1080);
        assert_eq!(animator.viewport().size(), (1920, 1080));
        assert_eq!(animator.sink().resizes.last(), Some(&(1920, 1080)));
    }
}
