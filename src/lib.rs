//! # heartfield
//!
//! A heart-shaped field of drifting points joined by faint lines, drawn with
//! wgpu. The points breathe with a two-tone pulse, shiver with per-point
//! jitter, lean toward the cursor, and get out of its way.
//!
//! ## Quick Start
//!
//! ```ignore
//! use heartfield::prelude::*;
//!
//! fn main() -> Result<(), FieldError> {
//!     HeartField::new()
//!         .with_point_count(300)
//!         .with_edge_threshold(0.38)
//!         .with_repulsion(0.45, 0.12)
//!         .run()
//! }
//! ```
//!
//! ## Pipeline
//!
//! Four stages, each usable on its own:
//!
//! - [`PointGenerator`] samples the heart curve from an integer seed.
//!   Same seed, same points, every run.
//! - [`EdgeList::build`] joins every pair of base points closer than the
//!   threshold.
//! - [`MotionController::step`] runs once per frame: morph toward the
//!   target, heartbeat wave, jitter and pointer repulsion per point; pulse
//!   and tilt for the whole group.
//! - [`Viewport`] keeps the camera in sync with the host size and casts the
//!   pointer onto the `z = 0` plane.
//!
//! [`ParticleFieldAnimator`] ties them together into a frame loop that
//! runs against any [`FrameScheduler`] and [`FrameSink`], so the whole
//! lifecycle can be driven headless:
//!
//! ```ignore
//! let mut animator = ParticleFieldAnimator::mount(config, scheduler, sink, 800, 600)?;
//! animator.pointer_moved(Vec2::new(0.2, -0.1));
//! animator.on_frame(0.016);
//! animator.dispose();
//! ```
//!
//! ## Reshaping
//!
//! With `reshape.enabled` the field regenerates its shape from the next seed
//! every `reshape.interval_secs`; live points glide to the new positions.
//! [`ParticleFieldAnimator::reshape`] does the same on demand.

pub mod animator;
pub mod app;
pub mod camera;
pub mod config;
pub mod edges;
pub mod error;
pub mod field;
pub mod gpu;
pub mod input;
pub mod motion;
pub mod random;
pub mod ray;
pub mod shape;
pub mod time;
pub mod viewport;

pub use animator::{Frame, FrameRequest, FrameScheduler, FrameSink, ParticleFieldAnimator};
pub use app::{HeartField, WindowScheduler};
pub use camera::Camera;
pub use config::{FieldConfig, PulseConfig, ReshapeConfig, Sampling, VisualConfig};
pub use edges::{Edge, EdgeList, LineVertex};
pub use error::{ConfigError, FieldError, GpuError, RenderError};
pub use field::PointField;
pub use glam::{Mat4, Vec2, Vec3};
pub use gpu::GpuState;
pub use motion::{GroupTransform, MotionController, MotionParams, PointerSample};
pub use random::SeedSequence;
pub use ray::{Plane, Ray};
pub use shape::{JitterProfile, PointGenerator, Shape};
pub use time::Clock;
pub use viewport::Viewport;

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::animator::{Frame, FrameRequest, FrameScheduler, FrameSink, ParticleFieldAnimator};
    pub use crate::app::HeartField;
    pub use crate::config::{FieldConfig, Sampling};
    pub use crate::edges::EdgeList;
    pub use crate::error::{ConfigError, FieldError, RenderError};
    pub use crate::field::PointField;
    pub use crate::motion::{MotionController, PointerSample};
    pub use crate::shape::PointGenerator;
    pub use glam::{Vec2, Vec3};
}
