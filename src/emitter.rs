//! Emitters for runtime spawning.
//!
//! Emitters bring entities into a store while the sketch runs. In a fixed
//! population they reuse dead slots; in a bounded one they push until the
//! capacity is reached. Either way a full store simply refuses.
//!
//! # Emitter Types
//!
//! | Type | Fires |
//! |------|-------|
//! | [`Emitter::PointerBurst`] | A ring of entities at the pointer on each left click |
//! | [`Emitter::PointerTrail`] | A few entities per frame while the pointer moves |
//! | [`Emitter::Continuous`] | A few entities every frame, placed by the spawn rule |
//!
//! Spawned entities come from the store's spawn rule with the pointer passed
//! as the spawn origin, so the rule decides life, colour and size.

use crate::entity::Entity;
use crate::field::{hash_signed, hash_unit};
use crate::input::MouseButton;
use crate::step::StepContext;
use crate::store::{EntityStore, Overrides};
use glam::Vec2;
use std::f32::consts::TAU;

/// Runtime spawning configuration.
///
/// ```ignore
/// ParticleSketch::new("sparks", 0, |ctx| {
///     AgedParticle::new(ctx.origin.unwrap_or_default(), Vec2::ZERO, 60.0)
/// })
///     .with_population(Population::Bounded { capacity: 4000 })
///     .with_emitter(Emitter::PointerBurst { count: 120, speed: 4.0 })
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Emitter {
    /// On a left click, `count` entities at the pointer flying outward in
    /// an even ring, speeds jittered between half and full `speed`.
    PointerBurst { count: usize, speed: f32 },

    /// While the pointer moves, `per_frame` entities at the pointer with a
    /// random direction and up to `speed` pixels per tick.
    PointerTrail { per_frame: usize, speed: f32 },

    /// `per_frame` entities every frame with spawn-rule positions and
    /// velocities.
    Continuous { per_frame: usize },
}

impl Emitter {
    /// Spawn this frame's entities. Returns how many were accepted.
    pub fn emit<E: Entity>(&self, store: &mut EntityStore<E>, ctx: &StepContext) -> usize {
        let input = ctx.input;
        let tick = ctx.time.tick;
        let mut spawned = 0;
        match *self {
            Emitter::PointerBurst { count, speed } => {
                if !(input.pointer_present() && input.mouse_pressed(MouseButton::Left)) {
                    return 0;
                }
                spawned = burst(store, input.pointer(), count, speed, tick);
            }
            Emitter::PointerTrail { per_frame, speed } => {
                if !input.pointer_present() || input.pointer_delta() == Vec2::ZERO {
                    return 0;
                }
                let origin = input.pointer();
                for k in 0..per_frame {
                    let jitter = Vec2::new(hash_signed(2 * k, tick), hash_signed(2 * k + 1, tick));
                    let overrides = Overrides::at(origin).with_velocity(jitter * speed);
                    if store.spawn(overrides).is_none() {
                        break;
                    }
                    spawned += 1;
                }
            }
            Emitter::Continuous { per_frame } => {
                for _ in 0..per_frame {
                    if store.spawn(Overrides::default()).is_none() {
                        break;
                    }
                    spawned += 1;
                }
            }
        }
        spawned
    }
}

/// Spawn `count` entities at `origin` moving outward in an even ring, with
/// speeds between half and full `speed`. Returns how many were accepted.
pub fn burst<E: Entity>(
    store: &mut EntityStore<E>,
    origin: Vec2,
    count: usize,
    speed: f32,
    tick: u64,
) -> usize {
    let mut spawned = 0;
    for k in 0..count {
        let angle = TAU * k as f32 / count as f32;
        let magnitude = speed * (0.5 + 0.5 * hash_unit(k, tick));
        let overrides = Overrides::at(origin).with_velocity(Vec2::from_angle(angle) * magnitude);
        if store.spawn(overrides).is_none() {
            break;
        }
        spawned += 1;
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::AgedParticle;
    use crate::input::Input;
    use crate::store::Population;
    use crate::time::FrameTime;

    fn sparks(capacity: usize) -> EntityStore<AgedParticle> {
        let mut store = EntityStore::new(1, |ctx| {
            let p = ctx.origin.unwrap_or_else(|| ctx.random_in_bounds());
            AgedParticle::new(p, Vec2::ZERO, 30.0)
        })
        .with_population(Population::Bounded { capacity });
        store.initialize(0, Vec2::new(200.0, 100.0));
        store
    }

    #[test]
    fn test_burst_needs_a_click() {
        let mut store = sparks(100);
        let mut input = Input::new();
        input.pointer_moved(Vec2::new(50.0, 40.0));
        let burst = Emitter::PointerBurst { count: 12, speed: 3.0 };

        let ctx = StepContext::new(&input, FrameTime::default(), Vec2::new(200.0, 100.0));
        assert_eq!(burst.emit(&mut store, &ctx), 0);

        input.button_pressed(MouseButton::Left);
        let ctx = StepContext::new(&input, FrameTime::default(), Vec2::new(200.0, 100.0));
        assert_eq!(burst.emit(&mut store, &ctx), 12);
        for e in store.entities() {
            assert_eq!(e.position, Vec2::new(50.0, 40.0));
            let speed = e.velocity.length();
            assert!((1.5 - 1e-4..=3.0 + 1e-4).contains(&speed));
        }
    }

    #[test]
    fn test_capacity_caps_emission() {
        let mut store = sparks(5);
        let input = Input::new();
        let ctx = StepContext::new(&input, FrameTime::default(), Vec2::new(200.0, 100.0));
        assert_eq!(Emitter::Continuous { per_frame: 8 }.emit(&mut store, &ctx), 5);
        assert_eq!(Emitter::Continuous { per_frame: 8 }.emit(&mut store, &ctx), 0);
    }

    #[test]
    fn test_trail_only_while_moving() {
        let mut store = sparks(100);
        let mut input = Input::new();
        input.pointer_moved(Vec2::new(10.0, 10.0));
        let trail = Emitter::PointerTrail { per_frame: 3, speed: 1.0 };
        let ctx = StepContext::new(&input, FrameTime::default(), Vec2::new(200.0, 100.0));
        assert_eq!(trail.emit(&mut store, &ctx), 0);

        input.pointer_moved(Vec2::new(14.0, 10.0));
        let ctx = StepContext::new(&input, FrameTime::default(), Vec2::new(200.0, 100.0));
        assert_eq!(trail.emit(&mut store, &ctx), 3);
    }
}
