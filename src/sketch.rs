//! The experiment contract and the generic particle sketch.
//!
//! A [`Sketch`] is one visual routine: it seeds its state for a surface size,
//! advances once per frame and paints onto the surface. Most experiments are
//! a [`ParticleSketch`], configured with the same builder pattern:
//!
//! ```ignore
//! let sketch = ParticleSketch::new("drift", 2_000, |ctx| {
//!         Point2D::new(ctx.random_in_bounds(), ctx.random_velocity(0.5))
//!     })
//!     .with_rule(Rule::FlowField { field: NoiseField::new(7), strength: 0.05 })
//!     .with_rule(Rule::Damping(0.98))
//!     .with_boundary(Boundary::Wrap)
//!     .with_visuals(|v| {
//!         v.background(Background::Fade { color: Vec3::ZERO, alpha: 0.08 });
//!     });
//! ```

use crate::emitter::Emitter;
use crate::entity::Entity;
use crate::render::Renderer;
use crate::rules::{Boundary, Rule};
use crate::spawn::SpawnContext;
use crate::step::{step, StepContext};
use crate::store::{EntityStore, Overrides, Population};
use crate::surface::Surface;
use crate::visuals::VisualConfig;
use glam::Vec2;

/// What a sketch sees each frame: input, frame time and surface bounds.
pub type FrameContext<'a> = StepContext<'a>;

/// Per-frame hook run before the step, for experiment-specific logic.
pub type UpdateHook<E> = Box<dyn FnMut(&mut EntityStore<E>, &FrameContext)>;

/// One visual experiment.
pub trait Sketch {
    /// Short identifier, used in logs and snapshot names.
    fn name(&self) -> &str;

    /// (Re)build all state for a surface of `bounds` pixels.
    fn seed(&mut self, bounds: Vec2);

    /// The surface changed size. Re-seeds unless overridden.
    fn resize(&mut self, bounds: Vec2) {
        self.seed(bounds);
    }

    /// Advance one frame.
    fn update(&mut self, ctx: &FrameContext);

    /// Paint the current state.
    fn render(&mut self, surface: &mut Surface, ctx: &FrameContext);

    /// Release state when the loop stops.
    fn dispose(&mut self) {}
}

impl<S: Sketch + ?Sized> Sketch for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn seed(&mut self, bounds: Vec2) {
        (**self).seed(bounds)
    }

    fn resize(&mut self, bounds: Vec2) {
        (**self).resize(bounds)
    }

    fn update(&mut self, ctx: &FrameContext) {
        (**self).update(ctx)
    }

    fn render(&mut self, surface: &mut Surface, ctx: &FrameContext) {
        (**self).render(surface, ctx)
    }

    fn dispose(&mut self) {
        (**self).dispose()
    }
}

/// A sketch made of entities driven by rules and drawn by a [`Renderer`].
///
/// Dead entities are recycled in place by the spawn rule, unless the sketch
/// has emitters: then dead slots of a fixed population stay dormant until an
/// emitter reuses them. Bounded populations always drop their dead.
pub struct ParticleSketch<E: Entity> {
    name: String,
    count: usize,
    store: EntityStore<E>,
    rules: Vec<Rule>,
    boundary: Boundary,
    emitters: Vec<Emitter>,
    renderer: Renderer,
    hook: Option<UpdateHook<E>>,
}

impl<E: Entity + 'static> ParticleSketch<E> {
    /// A sketch of `count` entities built by `spawner`, which is also used
    /// for recycling and emitters.
    pub fn new<F>(name: impl Into<String>, count: usize, spawner: F) -> Self
    where
        F: Fn(&mut SpawnContext) -> E + 'static,
    {
        Self::with_store(name, count, EntityStore::new(0, spawner))
    }

    /// A sketch over an existing store.
    pub fn with_store(name: impl Into<String>, count: usize, store: EntityStore<E>) -> Self {
        Self {
            name: name.into(),
            count,
            store,
            rules: Vec::new(),
            boundary: Boundary::None,
            emitters: Vec::new(),
            renderer: Renderer::new(VisualConfig::new()),
            hook: None,
        }
    }

    /// Seed the store's RNG so every run starts from the same population.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.store.reseed(seed);
        self
    }

    /// Number of entities created on seed.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Append a rule. Rules run in the order they were added.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_population(mut self, population: Population) -> Self {
        self.store = self.store.with_population(population);
        self
    }

    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.emitters.push(emitter);
        self
    }

    /// Configure drawing.
    pub fn with_visuals<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut VisualConfig),
    {
        let mut config = self.renderer.config().clone();
        configure(&mut config);
        self.renderer = Renderer::new(config);
        self
    }

    /// Run `hook` every frame before the rules.
    pub fn with_update<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut EntityStore<E>, &FrameContext) + 'static,
    {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn store(&self) -> &EntityStore<E> {
        &self.store
    }

    pub fn entities(&self) -> &[E] {
        self.store.entities()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl<E: Entity + 'static> Sketch for ParticleSketch<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn seed(&mut self, bounds: Vec2) {
        self.store.initialize(self.count, bounds);
        log::info!(
            "seeded '{}' with {} entities at {}x{}",
            self.name,
            self.store.len(),
            bounds.x,
            bounds.y
        );
    }

    fn update(&mut self, ctx: &FrameContext) {
        for emitter in &self.emitters {
            emitter.emit(&mut self.store, ctx);
        }
        if let Some(hook) = self.hook.as_mut() {
            hook(&mut self.store, ctx);
        }

        let dead = step(self.store.entities_mut(), &self.rules, self.boundary, ctx);
        if dead.is_empty() {
            return;
        }
        match self.store.population() {
            // Dead slots wait for an emitter; entities that only left the
            // surface come back at once.
            Population::Fixed if !self.emitters.is_empty() => {
                for index in dead {
                    if self.store.entities()[index].is_alive() {
                        self.store.reset(index, Overrides::default());
                    }
                }
            }
            _ => self.store.recycle(&dead),
        }
    }

    fn render(&mut self, surface: &mut Surface, ctx: &FrameContext) {
        self.renderer.render(surface, self.store.entities(), ctx.time);
    }

    fn dispose(&mut self) {
        self.store.clear();
        log::debug!("disposed '{}'", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AgedParticle, Point2D};
    use crate::input::{Input, MouseButton};
    use crate::time::FrameTime;

    fn frame(input: &Input, tick: u64) -> FrameContext<'_> {
        StepContext::new(
            input,
            FrameTime {
                tick,
                ..FrameTime::default()
            },
            Vec2::new(100.0, 100.0),
        )
    }

    #[test]
    fn test_seed_uses_spawner_and_count() {
        let mut sketch = ParticleSketch::new("dots", 25, |ctx| {
            Point2D::new(ctx.random_in_bounds(), Vec2::ZERO)
        })
        .with_seed(9);
        sketch.seed(Vec2::new(100.0, 100.0));
        assert_eq!(sketch.entities().len(), 25);
        assert_eq!(sketch.name(), "dots");
    }

    #[test]
    fn test_fixed_population_recycles_dead() {
        let mut sketch = ParticleSketch::new("sparks", 10, |ctx| {
            AgedParticle::new(ctx.random_in_bounds(), Vec2::ZERO, 2.0)
        });
        sketch.seed(Vec2::new(100.0, 100.0));
        let input = Input::new();
        for tick in 0..5 {
            sketch.update(&frame(&input, tick));
        }
        assert_eq!(sketch.entities().len(), 10);
        assert!(sketch.entities().iter().all(|e| e.is_alive()));
    }

    #[test]
    fn test_bounded_with_burst_grows_then_drains() {
        let mut sketch = ParticleSketch::new("burst", 0, |ctx| {
            let p = ctx.origin.unwrap_or(Vec2::ZERO);
            AgedParticle::new(p, Vec2::ZERO, 3.0)
        })
        .with_population(Population::Bounded { capacity: 50 })
        .with_emitter(Emitter::PointerBurst { count: 20, speed: 1.0 });
        sketch.seed(Vec2::new(100.0, 100.0));

        let mut input = Input::new();
        input.pointer_moved(Vec2::new(50.0, 50.0));
        input.button_pressed(MouseButton::Left);
        sketch.update(&frame(&input, 0));
        assert_eq!(sketch.entities().len(), 20);

        input.end_frame();
        for tick in 1..4 {
            sketch.update(&frame(&input, tick));
        }
        assert!(sketch.entities().is_empty());
    }

    #[test]
    fn test_fixed_with_emitter_respawns_departed() {
        let mut sketch = ParticleSketch::new("runners", 3, |ctx| {
            Point2D::new(ctx.random_in_bounds(), Vec2::new(30.0, 0.0))
        })
        .with_emitter(Emitter::Continuous { per_frame: 1 })
        .with_boundary(Boundary::Respawn);
        sketch.seed(Vec2::new(100.0, 100.0));

        let input = Input::new();
        for tick in 0..20 {
            sketch.update(&frame(&input, tick));
            assert_eq!(sketch.entities().len(), 3);
            for e in sketch.entities() {
                assert!(e.position.x >= 0.0 && e.position.x < 100.0, "x = {}", e.position.x);
            }
        }
    }

    #[test]
    fn test_fixed_with_emitter_keeps_dead_slots_dormant() {
        let mut sketch = ParticleSketch::new("embers", 4, |ctx| {
            AgedParticle::new(ctx.random_in_bounds(), Vec2::ZERO, 1.0)
        })
        .with_emitter(Emitter::PointerBurst { count: 1, speed: 0.0 });
        sketch.seed(Vec2::new(100.0, 100.0));

        let input = Input::new();
        sketch.update(&frame(&input, 0));
        sketch.update(&frame(&input, 1));
        assert_eq!(sketch.entities().len(), 4);
        assert!(sketch.entities().iter().all(|e| !e.is_alive()));
    }

    #[test]
    fn test_boxed_sketch_is_a_sketch() {
        let mut boxed: Box<dyn Sketch> = Box::new(
            ParticleSketch::new("boxed", 3, |ctx| Point2D::new(ctx.random_in_bounds(), Vec2::ZERO)),
        );
        boxed.seed(Vec2::splat(10.0));
        let input = Input::new();
        let mut surface = Surface::new(10, 10).unwrap();
        boxed.update(&frame(&input, 0));
        boxed.render(&mut surface, &frame(&input, 0));
        assert_eq!(boxed.name(), "boxed");
        boxed.dispose();
    }
}
