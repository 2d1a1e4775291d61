//! # sketchbook - canvas experiments
//!
//! A small skeleton for generative "simulate and render" sketches: seed a
//! set of point-like entities, push them around every frame with simple
//! forces, paint them onto a raster.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sketchbook::prelude::*;
//!
//! fn main() {
//!     let sketch = ParticleSketch::new("drift", 1_500, |ctx| {
//!         Point2D::new(ctx.random_in_bounds(), ctx.random_velocity(0.5))
//!     })
//!     .with_rule(Rule::FlowField { field: NoiseField::new(3), strength: 0.1 })
//!     .with_rule(Rule::Damping(0.96))
//!     .with_boundary(Boundary::Wrap);
//!
//!     let mut stage = Stage::new(800, 600, sketch).unwrap();
//!     for _ in 0..120 {
//!         stage.frame();
//!     }
//!     stage.snapshot("out").unwrap();
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Entities
//!
//! Anything implementing [`Entity`]: a position and velocity in surface
//! pixels, plus optional home, colour, radius and life. The built-in
//! [`Point2D`], [`Point3D`] and [`AgedParticle`] cover most sketches; custom
//! records use `#[derive(Entity)]`:
//!
//! ```ignore
//! #[derive(Entity, Clone)]
//! struct Mote {
//!     position: Vec2,
//!     velocity: Vec2,
//!     #[color]
//!     tint: Vec3,
//!     #[life]
//!     life: f32,
//! }
//! ```
//!
//! ### Rules
//!
//! Rules fold over each entity's velocity in the order they were added, then
//! the entity moves by its velocity (plain Euler, one step per frame) and the
//! boundary is applied:
//!
//! ```ignore
//! .with_rule(Rule::Pointer { .. })      // interaction
//! .with_rule(Rule::SpringHome { .. })   // forces
//! .with_rule(Rule::Damping(0.9))        // friction, never corrected
//! .with_boundary(Boundary::Wrap)
//! ```
//!
//! ### Stages and loops
//!
//! A [`Stage`] owns one experiment's surface, input, clock and sketch. An
//! [`AnimationLoop`] drives a stage from a host's frame callbacks and can be
//! stopped exactly once through its [`StopHandle`].
//!
//! ## Neighbour Connections
//!
//! Constellation-style lines between nearby entities use a Morton-keyed
//! uniform grid ([`SpatialGrid`]) by default; the direct all-pairs check is
//! kept as [`NeighborSearch::AllPairs`].

extern crate self as sketchbook;

pub mod config;
pub mod driver;
mod emitter;
pub mod entity;
pub mod error;
pub mod field;
pub mod gallery;
mod gpu;
pub mod input;
pub mod render;
pub mod rules;
pub mod sketch;
mod spawn;
pub mod spatial;
pub mod stage;
pub mod step;
pub mod store;
pub mod surface;
pub mod time;
pub mod visuals;
pub mod window;

pub use config::AppConfig;
pub use driver::{
    AnimationLoop, FrameRequest, FrameScheduler, LoopState, ManualScheduler, StopHandle,
};
pub use emitter::{burst, Emitter};
pub use entity::{AgedParticle, Entity, Point2D, Point3D, Projection};
pub use error::{ConfigError, GpuError, RunError, SurfaceError};
pub use field::NoiseField;
pub use glam::{Vec2, Vec3};
pub use gpu::{Presenter, BLIT_WGSL};
pub use input::{Input, KeyCode, MouseButton};
pub use render::Renderer;
pub use rules::{Boundary, Falloff, Kinematics, PointerMode, PointerTrigger, Rule};
pub use sketch::{FrameContext, ParticleSketch, Sketch};
pub use sketchbook_derive::Entity;
pub use spatial::SpatialGrid;
pub use spawn::SpawnContext;
pub use stage::Stage;
pub use step::{step, StepContext};
pub use store::{EntityStore, Overrides, Population};
pub use surface::{Pixel, Surface};
pub use time::{Clock, FrameTime};
pub use visuals::{
    Background, BlendMode, ColorMapping, Connections, NeighborSearch, Palette, ParticleShape,
    VisualConfig,
};

/// Everything a sketch usually needs.
///
/// ```ignore
/// use sketchbook::prelude::*;
/// ```
pub mod prelude {
    pub use crate::driver::{AnimationLoop, FrameScheduler, ManualScheduler};
    pub use crate::emitter::Emitter;
    pub use crate::entity::{AgedParticle, Entity, Point2D, Point3D};
    pub use crate::field::NoiseField;
    pub use crate::input::{Input, KeyCode, MouseButton};
    pub use crate::rules::{Boundary, Falloff, PointerMode, PointerTrigger, Rule};
    pub use crate::sketch::{FrameContext, ParticleSketch, Sketch};
    pub use crate::spawn::SpawnContext;
    pub use crate::stage::Stage;
    pub use crate::store::Population;
    pub use crate::surface::Surface;
    pub use crate::time::FrameTime;
    pub use crate::visuals::{
        Background, BlendMode, ColorMapping, Palette, ParticleShape, VisualConfig,
    };
    pub use crate::{Vec2, Vec3};
    pub use sketchbook_derive::Entity;
}
