//! Forces and boundaries.
//!
//! Rules adjust an entity's velocity once per tick and are applied in the
//! order they were added. After the rules the step integrates with Euler
//! (`position += velocity`) and applies the [`Boundary`].
//!
//! # Rule Categories
//!
//! - **Basic Physics**: Gravity, Acceleration, Damping, SpeedLimit, Wander
//! - **Fields**: FlowField, Vortex
//! - **Springs**: SpringHome
//! - **Interaction**: Pointer
//! - **Custom**: Custom (closure)
//!
//! Constants are taken as given. `Damping(0.98)` and `Damping(0.95)` feel
//! different, and neither is corrected for frame rate.

use crate::entity::Entity;
use crate::field::{hash_unit, NoiseField};
use crate::step::StepContext;
use glam::Vec2;
use std::f32::consts::TAU;
use std::fmt;
use std::sync::Arc;

/// Distance below which direction-based forces are skipped.
const MIN_DISTANCE: f32 = 1e-3;

/// Distance falloff functions for force-based rules.
///
/// Controls how a force's strength changes with distance from the source.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Falloff {
    /// Constant force regardless of distance.
    #[default]
    Constant,

    /// Force decreases linearly to zero at the radius.
    Linear,

    /// force = 1/distance (with softening).
    Inverse,

    /// force = 1/distance².
    InverseSquare,

    /// Smoothstep from full strength at the source to zero at the radius.
    Smooth,
}

impl Falloff {
    /// Strength multiplier at `dist` for a force reaching `radius`.
    pub fn factor(&self, dist: f32, radius: f32) -> f32 {
        match self {
            Falloff::Constant => 1.0,
            Falloff::Linear => {
                if radius > 0.0 {
                    (1.0 - dist / radius).max(0.0)
                } else {
                    0.0
                }
            }
            Falloff::Inverse => 1.0 / (dist + 0.01),
            Falloff::InverseSquare => 1.0 / (dist * dist + 0.0001),
            Falloff::Smooth => 1.0 - smoothstep(0.0, radius, dist),
        }
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Direction of a pointer force.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerMode {
    #[default]
    Attract,
    Repel,
}

/// When a pointer force is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerTrigger {
    /// Whenever the pointer is over the surface.
    #[default]
    Always,
    /// Only while a mouse button is held.
    WhileDown,
}

/// What a custom rule sees of the entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kinematics {
    pub index: usize,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Custom force: returns the new velocity.
pub type CustomRule = Arc<dyn Fn(Kinematics, &StepContext) -> Vec2 + Send + Sync>;

/// Rules that adjust entity velocity every tick.
///
/// # Example
///
/// ```ignore
/// ParticleSketch::new("drift", 800, |ctx| Point2D::new(ctx.random_in_bounds(), Vec2::ZERO))
///     .with_rule(Rule::FlowField { field: NoiseField::new(7), strength: 0.1 })
///     .with_rule(Rule::Damping(0.96))
///     .with_rule(Rule::SpeedLimit { min: 0.0, max: 2.0 })
///     .with_boundary(Boundary::Wrap)
/// ```
#[derive(Clone)]
pub enum Rule {
    /// Constant downward pull in pixels per tick². Negative values pull up.
    Gravity(f32),

    /// Constant acceleration in an arbitrary direction.
    Acceleration(Vec2),

    /// Steer along a flow field.
    ///
    /// Adds `field.direction(position, tick) * strength` to the velocity.
    FlowField {
        field: NoiseField,
        strength: f32,
    },

    /// Hooke pull toward the entity's home position.
    ///
    /// Adds `(home - position) * stiffness`. Entities without a home are
    /// unaffected. Pair with [`Rule::Damping`] or the spring oscillates
    /// forever.
    SpringHome {
        stiffness: f32,
    },

    /// Attract to or repel from the pointer within a radius.
    ///
    /// # Example
    ///
    /// ```ignore
    /// Rule::Pointer {
    ///     radius: 120.0,
    ///     strength: 0.6,
    ///     falloff: Falloff::Linear,
    ///     mode: PointerMode::Repel,
    ///     trigger: PointerTrigger::Always,
    ///     smoothed: false,
    /// }
    /// ```
    Pointer {
        /// Effect radius in pixels.
        radius: f32,
        /// Force at full falloff factor.
        strength: f32,
        falloff: Falloff,
        mode: PointerMode,
        trigger: PointerTrigger,
        /// Follow the lagged pointer instead of the raw one.
        smoothed: bool,
    },

    /// Tangential swirl around a point.
    ///
    /// `center` is a fraction of the surface size, so `Vec2::splat(0.5)` is
    /// the middle of the screen whatever its dimensions. Positive strength
    /// turns clockwise on screen (y points down).
    Vortex {
        center: Vec2,
        strength: f32,
    },

    /// Random nudge, deterministic per entity and tick.
    Wander {
        strength: f32,
    },

    /// Multiply velocity by a constant each tick.
    Damping(f32),

    /// Clamp speed to `min..=max`. A stopped entity stays stopped.
    SpeedLimit {
        min: f32,
        max: f32,
    },

    /// Arbitrary force as a closure. Build with [`Rule::custom`].
    Custom(CustomRule),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Gravity(g) => f.debug_tuple("Gravity").field(g).finish(),
            Rule::Acceleration(a) => f.debug_tuple("Acceleration").field(a).finish(),
            Rule::FlowField { field, strength } => f
                .debug_struct("FlowField")
                .field("field", field)
                .field("strength", strength)
                .finish(),
            Rule::SpringHome { stiffness } => {
                f.debug_struct("SpringHome").field("stiffness", stiffness).finish()
            }
            Rule::Pointer {
                radius,
                strength,
                falloff,
                mode,
                trigger,
                smoothed,
            } => f
                .debug_struct("Pointer")
                .field("radius", radius)
                .field("strength", strength)
                .field("falloff", falloff)
                .field("mode", mode)
                .field("trigger", trigger)
                .field("smoothed", smoothed)
                .finish(),
            Rule::Vortex { center, strength } => f
                .debug_struct("Vortex")
                .field("center", center)
                .field("strength", strength)
                .finish(),
            Rule::Wander { strength } => {
                f.debug_struct("Wander").field("strength", strength).finish()
            }
            Rule::Damping(d) => f.debug_tuple("Damping").field(d).finish(),
            Rule::SpeedLimit { min, max } => f
                .debug_struct("SpeedLimit")
                .field("min", min)
                .field("max", max)
                .finish(),
            Rule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Rule {
    /// Wrap a closure as a [`Rule::Custom`].
    ///
    /// ```ignore
    /// Rule::custom(|k, ctx| {
    ///     k.velocity + Vec2::new((ctx.time.elapsed * 2.0).sin() * 0.05, 0.0)
    /// })
    /// ```
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Kinematics, &StepContext) -> Vec2 + Send + Sync + 'static,
    {
        Rule::Custom(Arc::new(f))
    }

    /// Velocity after this rule for the entity at `index`.
    pub fn apply<E: Entity>(
        &self,
        index: usize,
        entity: &E,
        velocity: Vec2,
        ctx: &StepContext,
    ) -> Vec2 {
        let position = entity.position();
        match self {
            Rule::Gravity(g) => velocity + Vec2::new(0.0, *g),

            Rule::Acceleration(a) => velocity + *a,

            Rule::FlowField { field, strength } => {
                velocity + field.direction(position, ctx.time.tick) * *strength
            }

            Rule::SpringHome { stiffness } => match entity.home() {
                Some(home) => velocity + (home - position) * *stiffness,
                None => velocity,
            },

            Rule::Pointer {
                radius,
                strength,
                falloff,
                mode,
                trigger,
                smoothed,
            } => {
                let input = ctx.input;
                if !input.pointer_present() {
                    return velocity;
                }
                if *trigger == PointerTrigger::WhileDown && !input.is_pointer_down() {
                    return velocity;
                }
                let target = if *smoothed {
                    input.smoothed_pointer()
                } else {
                    input.pointer()
                };
                let to_target = target - position;
                let dist = to_target.length();
                if dist >= *radius || dist < MIN_DISTANCE {
                    return velocity;
                }
                let push = to_target / dist * *strength * falloff.factor(dist, *radius);
                match mode {
                    PointerMode::Attract => velocity + push,
                    PointerMode::Repel => velocity - push,
                }
            }

            Rule::Vortex { center, strength } => {
                let radial = position - *center * ctx.bounds;
                let dist = radial.length();
                if dist < MIN_DISTANCE {
                    return velocity;
                }
                velocity + radial.perp() / dist * *strength
            }

            Rule::Wander { strength } => {
                let angle = hash_unit(index, ctx.time.tick) * TAU;
                velocity + Vec2::from_angle(angle) * *strength
            }

            Rule::Damping(d) => velocity * *d,

            Rule::SpeedLimit { min, max } => {
                let speed = velocity.length();
                if speed > *max {
                    velocity / speed * *max
                } else if speed < *min && speed > 0.0 {
                    velocity / speed * *min
                } else {
                    velocity
                }
            }

            Rule::Custom(f) => f(
                Kinematics {
                    index,
                    position,
                    velocity,
                },
                ctx,
            ),
        }
    }
}

/// Margin that keeps clamped positions strictly inside the right and
/// bottom edges. On wide surfaces the next float below the edge is used
/// instead, since `size - EDGE` rounds back up to `size` there.
const EDGE: f32 = 1e-3;

/// What happens when an entity reaches the edge of the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Boundary {
    /// Entities may leave; nothing happens.
    #[default]
    None,
    /// Toroidal: leaving one side re-enters on the opposite side.
    Wrap,
    /// Pinned to the edge, velocity untouched.
    Clamp,
    /// Pinned to the edge with the outward velocity component reflected and
    /// scaled by `restitution`.
    Bounce { restitution: f32 },
    /// Entities that leave are reported to the caller for a reset.
    Respawn,
}

impl Boundary {
    /// Apply to one entity. Returns `true` when a [`Boundary::Respawn`]
    /// entity is outside the surface.
    pub fn apply<E: Entity>(&self, entity: &mut E, bounds: Vec2) -> bool {
        if bounds.x <= 0.0 || bounds.y <= 0.0 {
            return false;
        }
        let p = entity.position();
        match self {
            Boundary::None => false,
            Boundary::Wrap => {
                entity.set_position(Vec2::new(wrap(p.x, bounds.x), wrap(p.y, bounds.y)));
                false
            }
            Boundary::Clamp => {
                entity.set_position(Vec2::new(pin(p.x, bounds.x), pin(p.y, bounds.y)));
                false
            }
            Boundary::Bounce { restitution } => {
                let mut v = entity.velocity();
                if p.x < 0.0 {
                    v.x = v.x.abs() * restitution;
                } else if p.x >= bounds.x {
                    v.x = -v.x.abs() * restitution;
                }
                if p.y < 0.0 {
                    v.y = v.y.abs() * restitution;
                } else if p.y >= bounds.y {
                    v.y = -v.y.abs() * restitution;
                }
                entity.set_position(Vec2::new(pin(p.x, bounds.x), pin(p.y, bounds.y)));
                entity.set_velocity(v);
                false
            }
            Boundary::Respawn => p.x < 0.0 || p.y < 0.0 || p.x >= bounds.x || p.y >= bounds.y,
        }
    }
}

/// `x` modulo `size`, in `[0, size)`.
fn wrap(x: f32, size: f32) -> f32 {
    let w = x.rem_euclid(size);
    // rem_euclid of a tiny negative can round up to size itself
    if w >= size {
        0.0
    } else {
        w
    }
}

fn pin(x: f32, size: f32) -> f32 {
    let below = f32::from_bits(size.to_bits() - 1);
    x.clamp(0.0, (size - EDGE).min(below).max(0.0))
}
