//! Spawn context for entity initialization.
//!
//! Spawn rules receive a [`SpawnContext`] and return a fresh entity. The
//! context borrows the store's seeded RNG, so a given seed always produces the
//! same population.
//!
//! ```ignore
//! EntityStore::new(seed, |ctx| {
//!     let position = ctx.origin.unwrap_or_else(|| ctx.random_in_bounds());
//!     AgedParticle::new(position, ctx.random_velocity(2.0), ctx.random_range(30.0, 90.0))
//! })
//! ```

use crate::visuals::hsv_to_rgb;
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::Rng;
use std::f32::consts::TAU;

/// Context handed to spawn rules, with helpers for common spawn patterns.
pub struct SpawnContext<'a> {
    /// Index of the entity being (re)spawned.
    pub index: usize,
    /// Population size at the time of the spawn.
    pub count: usize,
    /// Surface size in pixels.
    pub bounds: Vec2,
    /// Requested spawn point, set when spawning at the pointer.
    pub origin: Option<Vec2>,
    rng: &'a mut SmallRng,
}

impl<'a> SpawnContext<'a> {
    pub(crate) fn new(index: usize, count: usize, bounds: Vec2, rng: &'a mut SmallRng) -> Self {
        Self {
            index,
            count,
            bounds,
            origin: None,
            rng,
        }
    }

    pub(crate) fn at(mut self, origin: Option<Vec2>) -> Self {
        self.origin = origin;
        self
    }

    /// Normalized progress through the population (0.0 to 1.0).
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.index as f32 / self.count as f32
        }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `min..max`. An empty range returns `min`.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random usize in `min..max`. An empty range returns `min`.
    #[inline]
    pub fn random_index(&mut self, min: usize, max: usize) -> usize {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    // ========== Position helpers ==========

    /// Random point on the surface, inside `[0, width) x [0, height)`.
    pub fn random_in_bounds(&mut self) -> Vec2 {
        Vec2::new(
            self.random_range(0.0, self.bounds.x),
            self.random_range(0.0, self.bounds.y),
        )
    }

    /// Random point on a circle around `center`.
    pub fn random_on_circle(&mut self, center: Vec2, radius: f32) -> Vec2 {
        let angle = self.random_range(0.0, TAU);
        center + Vec2::from_angle(angle) * radius
    }

    /// Random point inside a disk, uniform by area.
    pub fn random_in_disk(&mut self, center: Vec2, radius: f32) -> Vec2 {
        let angle = self.random_range(0.0, TAU);
        let r = radius * self.random().sqrt();
        center + Vec2::from_angle(angle) * r
    }

    /// Position on a `cols x rows` lattice spanning the surface with a
    /// half-cell margin.
    pub fn grid_position(&self, cols: usize, rows: usize) -> Vec2 {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let idx = self.index % (cols * rows);
        let cell = self.bounds / Vec2::new(cols as f32, rows as f32);
        Vec2::new((idx % cols) as f32 + 0.5, (idx / cols) as f32 + 0.5) * cell
    }

    // ========== Velocity helpers ==========

    /// Random velocity with each component in `-max_speed..max_speed`.
    pub fn random_velocity(&mut self, max_speed: f32) -> Vec2 {
        Vec2::new(
            self.random_range(-max_speed, max_speed),
            self.random_range(-max_speed, max_speed),
        )
    }

    /// Velocity of random direction and the given speed.
    pub fn random_direction(&mut self, speed: f32) -> Vec2 {
        Vec2::from_angle(self.random_range(0.0, TAU)) * speed
    }

    // ========== Color helpers ==========

    /// Random hue at the given saturation and value.
    pub fn random_hue(&mut self, saturation: f32, value: f32) -> Vec3 {
        let hue = self.random();
        hsv_to_rgb(hue, saturation, value)
    }

    /// Hue from spawn progress, a rainbow across the population.
    pub fn rainbow(&self, saturation: f32, value: f32) -> Vec3 {
        hsv_to_rgb(self.progress(), saturation, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_context_progress() {
        let mut rng = SmallRng::seed_from_u64(1);
        let ctx = SpawnContext::new(50, 100, Vec2::splat(10.0), &mut rng);
        assert!((ctx.progress() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_random_in_bounds_stays_inside() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut ctx = SpawnContext::new(0, 1, Vec2::new(30.0, 5.0), &mut rng);
        for _ in 0..500 {
            let p = ctx.random_in_bounds();
            assert!(p.x >= 0.0 && p.x < 30.0);
            assert!(p.y >= 0.0 && p.y < 5.0);
        }
    }

    #[test]
    fn test_empty_range_returns_min() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut ctx = SpawnContext::new(0, 1, Vec2::ZERO, &mut rng);
        assert_eq!(ctx.random_range(3.0, 3.0), 3.0);
        assert_eq!(ctx.random_index(4, 2), 4);
    }

    #[test]
    fn test_grid_position_centers_cells() {
        let mut rng = SmallRng::seed_from_u64(0);
        let ctx = SpawnContext::new(5, 6, Vec2::new(300.0, 200.0), &mut rng);
        // index 5 in a 3x2 lattice is column 2, row 1
        assert_eq!(ctx.grid_position(3, 2), Vec2::new(250.0, 150.0));
    }

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = SmallRng::seed_from_u64(99);
        let mut b = SmallRng::seed_from_u64(99);
        let va = SpawnContext::new(0, 1, Vec2::ONE, &mut a).random_velocity(2.0);
        let vb = SpawnContext::new(0, 1, Vec2::ONE, &mut b).random_velocity(2.0);
        assert_eq!(va, vb);
    }
}
