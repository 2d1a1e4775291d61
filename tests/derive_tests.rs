//! Integration tests for the `#[derive(Entity)]` macro.
//!
//! These tests use the derived implementations through the public API, the
//! way a sketch defined outside the crate would.

use sketchbook::prelude::*;
use sketchbook::{step, Projection, StepContext};

// ============================================================================
// Minimal Entity
// ============================================================================

#[derive(Entity, Clone, Debug, PartialEq)]
struct Dot {
    position: Vec2,
    velocity: Vec2,
}

#[test]
fn test_minimal_entity_accessors() {
    let mut dot = Dot {
        position: Vec2::new(1.0, 2.0),
        velocity: Vec2::new(0.5, -0.5),
    };
    assert_eq!(dot.position(), Vec2::new(1.0, 2.0));
    assert_eq!(dot.velocity(), Vec2::new(0.5, -0.5));

    dot.set_position(Vec2::new(3.0, 4.0));
    dot.set_velocity(Vec2::ZERO);
    assert_eq!(dot.position, Vec2::new(3.0, 4.0));
    assert_eq!(dot.velocity, Vec2::ZERO);
}

#[test]
fn test_minimal_entity_defaults() {
    let mut dot = Dot {
        position: Vec2::new(10.0, 10.0),
        velocity: Vec2::new(1.0, 0.0),
    };
    assert_eq!(dot.home(), None);
    assert_eq!(dot.color(), Vec3::ONE);
    assert_eq!(dot.alpha(), 1.0);
    assert_eq!(dot.life_fraction(), None);
    assert!(dot.is_alive());

    dot.age();
    assert!(dot.is_alive(), "entities without #[life] never die");

    dot.integrate();
    assert_eq!(dot.position, Vec2::new(11.0, 10.0));
    assert_eq!(
        dot.project(Vec2::splat(100.0)),
        Projection {
            position: Vec2::new(11.0, 10.0),
            scale: 1.0
        }
    );
}

// ============================================================================
// Marked Fields
// ============================================================================

#[derive(Entity, Clone, Debug)]
struct Firefly {
    position: Vec2,
    velocity: Vec2,
    #[home]
    nest: Vec2,
    #[color]
    glow: Vec3,
    #[alpha]
    brightness: f32,
    #[radius]
    size: f32,
    #[life]
    life: f32,
    #[max_life]
    max_life: f32,
    // Unmarked fields are ignored by the derive.
    blink_phase: f32,
}

fn firefly(life: f32) -> Firefly {
    Firefly {
        position: Vec2::new(5.0, 5.0),
        velocity: Vec2::ZERO,
        nest: Vec2::new(50.0, 60.0),
        glow: Vec3::new(0.9, 1.0, 0.3),
        brightness: 0.7,
        size: 3.0,
        life,
        max_life: 4.0,
        blink_phase: 0.25,
    }
}

#[test]
fn test_marked_fields_are_used() {
    let fly = firefly(4.0);
    assert_eq!(fly.home(), Some(Vec2::new(50.0, 60.0)));
    assert_eq!(fly.color(), Vec3::new(0.9, 1.0, 0.3));
    assert_eq!(fly.alpha(), 0.7);
    assert_eq!(fly.radius(), 3.0);
    assert_eq!(fly.life_fraction(), Some(1.0));
    assert_eq!(fly.blink_phase, 0.25);
}

#[test]
fn test_life_counts_down_per_tick() {
    let mut fly = firefly(2.0);
    fly.age();
    assert!(fly.is_alive());
    assert_eq!(fly.life_fraction(), Some(0.25));
    fly.age();
    assert!(!fly.is_alive());
    assert_eq!(fly.life_fraction(), Some(0.0));
}

#[derive(Entity, Clone, Debug)]
struct Ember {
    position: Vec2,
    velocity: Vec2,
    #[life]
    heat: f32,
}

#[test]
fn test_life_without_max_has_no_fraction() {
    let mut ember = Ember {
        position: Vec2::ZERO,
        velocity: Vec2::ZERO,
        heat: 1.0,
    };
    assert_eq!(ember.life_fraction(), None);
    ember.age();
    assert!(!ember.is_alive());
}

// ============================================================================
// Derived Entities in the Pipeline
// ============================================================================

#[test]
fn test_spring_home_uses_home_field() {
    let input = Input::new();
    let ctx = StepContext::new(&input, FrameTime::default(), Vec2::splat(100.0));
    let mut flies = vec![firefly(100.0)];

    step(&mut flies, &[Rule::SpringHome { stiffness: 0.1 }], Boundary::None, &ctx);
    // (50,60) - (5,5) = (45,55), times 0.1
    assert!((flies[0].velocity - Vec2::new(4.5, 5.5)).length() < 1e-5);
    assert!((flies[0].position - Vec2::new(9.5, 10.5)).length() < 1e-5);
}

#[test]
fn test_derived_entity_in_particle_sketch() {
    let sketch = ParticleSketch::new("embers", 30, |ctx| Ember {
        position: ctx.random_in_bounds(),
        velocity: ctx.random_velocity(1.0),
        heat: ctx.random_range(5.0, 10.0),
    })
    .with_rule(Rule::Gravity(0.1))
    .with_boundary(Boundary::Clamp);

    let mut stage = Stage::new(64, 48, sketch).expect("surface");
    for _ in 0..25 {
        stage.frame();
    }
    let embers = stage.sketch().entities();
    assert_eq!(embers.len(), 30);
    assert!(embers.iter().all(|e| e.is_alive()));
}
