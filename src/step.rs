//! The per-frame simulation step.
//!
//! For each entity, in order: fold the rules over its velocity, integrate
//! with Euler, apply the boundary, then age it. One pass per frame, no
//! substeps.

use crate::entity::Entity;
use crate::input::Input;
use crate::rules::{Boundary, Rule};
use crate::time::FrameTime;
use glam::Vec2;

/// Read-only state the rules see during a step.
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub input: &'a Input,
    pub time: FrameTime,
    /// Surface size in pixels.
    pub bounds: Vec2,
}

impl<'a> StepContext<'a> {
    pub fn new(input: &'a Input, time: FrameTime, bounds: Vec2) -> Self {
        Self { input, time, bounds }
    }
}

/// Advance every entity by one tick.
///
/// Returns the indices, in ascending order, of entities that died this tick
/// or left the surface under [`Boundary::Respawn`].
pub fn step<E: Entity>(
    entities: &mut [E],
    rules: &[Rule],
    boundary: Boundary,
    ctx: &StepContext,
) -> Vec<usize> {
    let mut dead = Vec::new();
    for (index, entity) in entities.iter_mut().enumerate() {
        let velocity = rules
            .iter()
            .fold(entity.velocity(), |v, rule| rule.apply(index, &*entity, v, ctx));
        entity.set_velocity(velocity);
        entity.integrate();
        let left = boundary.apply(entity, ctx.bounds);
        entity.age();
        if left || !entity.is_alive() {
            dead.push(index);
        }
    }
    dead
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AgedParticle, Point2D};

    #[test]
    fn test_rules_fold_in_order() {
        let input = Input::new();
        let ctx = StepContext::new(&input, FrameTime::default(), Vec2::splat(1000.0));
        let mut entities = vec![Point2D::new(Vec2::splat(10.0), Vec2::ZERO)];

        // add then damp: (0 + 2) * 0.5 = 1
        step(&mut entities, &[Rule::Gravity(2.0), Rule::Damping(0.5)], Boundary::None, &ctx);
        assert_eq!(entities[0].velocity, Vec2::new(0.0, 1.0));
        assert_eq!(entities[0].position, Vec2::new(10.0, 11.0));

        // damp then add: 1 * 0.5 + 2 = 2.5
        step(&mut entities, &[Rule::Damping(0.5), Rule::Gravity(2.0)], Boundary::None, &ctx);
        assert_eq!(entities[0].velocity, Vec2::new(0.0, 2.5));
    }

    #[test]
    fn test_reports_dead_and_departed() {
        let input = Input::new();
        let ctx = StepContext::new(&input, FrameTime::default(), Vec2::splat(100.0));
        let mut sparks = vec![
            AgedParticle::new(Vec2::splat(50.0), Vec2::ZERO, 1.0),
            AgedParticle::new(Vec2::splat(50.0), Vec2::ZERO, 5.0),
            AgedParticle::new(Vec2::new(99.5, 50.0), Vec2::X, 5.0),
        ];
        let dead = step(&mut sparks, &[], Boundary::Respawn, &ctx);
        assert_eq!(dead, vec![0, 2]);
    }
}
