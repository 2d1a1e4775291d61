//! Point-like entities.
//!
//! Every experiment animates a collection of small mutable records. Their
//! shapes differ (some have depth, some age and die, some remember a home
//! position) so instead of one struct with a pile of optional fields there is
//! one trait and a small family of variants:
//!
//! | Type | Use |
//! |------|-----|
//! | [`Point2D`] | Drifting dots, constellations, spring grids |
//! | [`Point3D`] | Depth with perspective projection (starfields) |
//! | [`AgedParticle`] | Sparks and trails with a life counter |
//!
//! Custom records implement [`Entity`] with `#[derive(Entity)]`.

use glam::{Vec2, Vec3};
use sketchbook_derive::Entity;

/// Where and how large an entity appears on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Screen position in pixels.
    pub position: Vec2,
    /// Size multiplier from depth (1.0 for flat entities).
    pub scale: f32,
}

/// A mutable point-like record that is simulated and drawn every frame.
///
/// Positions and velocities are in surface pixels and pixels per tick.
/// Only the four accessors are required; everything else has a sensible
/// default for entities that don't carry the attribute.
pub trait Entity: Clone {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);

    /// Rest position for spring forces.
    fn home(&self) -> Option<Vec2> {
        None
    }

    /// RGB colour in `0.0..=1.0`.
    fn color(&self) -> Vec3 {
        Vec3::ONE
    }

    fn alpha(&self) -> f32 {
        1.0
    }

    /// Draw radius in pixels.
    fn radius(&self) -> f32 {
        1.5
    }

    /// Remaining life in `0.0..=1.0`, for entities that age.
    fn life_fraction(&self) -> Option<f32> {
        None
    }

    /// Advance the life counter by one tick.
    fn age(&mut self) {}

    fn is_alive(&self) -> bool {
        true
    }

    /// Euler integration: `position += velocity`.
    fn integrate(&mut self) {
        let p = self.position() + self.velocity();
        self.set_position(p);
    }

    /// Screen placement for drawing on a surface of the given size.
    fn project(&self, _bounds: Vec2) -> Projection {
        Projection {
            position: self.position(),
            scale: 1.0,
        }
    }
}

/// A flat point with a home position.
#[derive(Entity, Clone, Debug, PartialEq)]
pub struct Point2D {
    pub position: Vec2,
    pub velocity: Vec2,
    #[home]
    pub home: Vec2,
    #[radius]
    pub radius: f32,
    #[color]
    pub color: Vec3,
}

impl Point2D {
    /// A white point whose home is where it starts.
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            home: position,
            radius: 1.5,
            color: Vec3::ONE,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_home(mut self, home: Vec2) -> Self {
        self.home = home;
        self
    }
}

/// A particle with a life counter measured in ticks.
///
/// It dies when `life` reaches zero; the store then recycles or removes it.
#[derive(Entity, Clone, Debug, PartialEq)]
pub struct AgedParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    #[life]
    pub life: f32,
    #[max_life]
    pub max_life: f32,
    #[radius]
    pub radius: f32,
    #[color]
    pub color: Vec3,
}

impl AgedParticle {
    pub fn new(position: Vec2, velocity: Vec2, life: f32) -> Self {
        Self {
            position,
            velocity,
            life,
            max_life: life,
            radius: 2.0,
            color: Vec3::ONE,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }
}

/// Nearest depth before a [`Point3D`] counts as having passed the viewer.
pub const NEAR_PLANE: f32 = 1.0;

/// A point in camera space: `x`, `y` relative to the surface centre, `z`
/// the distance in front of the viewer.
///
/// The 2D accessors of [`Entity`] see only `x` and `y`, so planar forces
/// work unchanged; depth moves with `velocity.z` during integration.
#[derive(Clone, Debug, PartialEq)]
pub struct Point3D {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
    pub color: Vec3,
    /// Focal length in pixels; larger is a narrower field of view.
    pub focal: f32,
}

impl Point3D {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            radius: 1.0,
            color: Vec3::ONE,
            focal: 256.0,
        }
    }

    pub fn with_focal(mut self, focal: f32) -> Self {
        self.focal = focal;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    /// Perspective factor at the current depth.
    pub fn depth_scale(&self) -> f32 {
        self.focal / self.position.z.max(NEAR_PLANE)
    }
}

impl Entity for Point3D {
    fn position(&self) -> Vec2 {
        self.position.truncate()
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position.extend(self.position.z);
    }

    fn velocity(&self) -> Vec2 {
        self.velocity.truncate()
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity.extend(self.velocity.z);
    }

    fn color(&self) -> Vec3 {
        self.color
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn is_alive(&self) -> bool {
        self.position.z > NEAR_PLANE
    }

    fn integrate(&mut self) {
        self.position += self.velocity;
    }

    fn project(&self, bounds: Vec2) -> Projection {
        let scale = self.depth_scale();
        Projection {
            position: bounds * 0.5 + self.position.truncate() * scale,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point2d_home_defaults_to_start() {
        let p = Point2D::new(Vec2::new(3.0, 4.0), Vec2::ZERO);
        assert_eq!(p.home(), Some(Vec2::new(3.0, 4.0)));
        assert!(p.is_alive());
        assert_eq!(p.life_fraction(), None);
    }

    #[test]
    fn test_integrate_is_euler() {
        let mut p = Point2D::new(Vec2::new(1.0, 1.0), Vec2::new(0.5, -2.0));
        p.integrate();
        assert_eq!(p.position(), Vec2::new(1.5, -1.0));
    }

    #[test]
    fn test_aged_particle_dies_after_life_ticks() {
        let mut p = AgedParticle::new(Vec2::ZERO, Vec2::ZERO, 3.0);
        assert_eq!(p.life_fraction(), Some(1.0));
        p.age();
        assert!((p.life_fraction().unwrap() - 2.0 / 3.0).abs() < 1e-6);
        p.age();
        assert!(p.is_alive());
        p.age();
        assert!(!p.is_alive());
        assert_eq!(p.life_fraction(), Some(0.0));
    }

    #[test]
    fn test_point3d_keeps_depth_through_2d_setters() {
        let mut p = Point3D::new(Vec3::new(1.0, 2.0, 50.0), Vec3::new(0.0, 0.0, -5.0));
        p.set_velocity(Vec2::new(1.0, 1.0));
        assert_eq!(p.velocity, Vec3::new(1.0, 1.0, -5.0));
        p.integrate();
        assert_eq!(p.position, Vec3::new(2.0, 3.0, 45.0));
    }

    #[test]
    fn test_point3d_projection_and_death() {
        let p = Point3D::new(Vec3::new(10.0, 0.0, 128.0), Vec3::ZERO).with_focal(256.0);
        let proj = p.project(Vec2::new(200.0, 100.0));
        assert_eq!(proj.scale, 2.0);
        assert_eq!(proj.position, Vec2::new(120.0, 50.0));

        let passed = Point3D::new(Vec3::new(0.0, 0.0, 0.5), Vec3::ZERO);
        assert!(!passed.is_alive());
    }
}
