//! Flow fields and deterministic hashing.
//!
//! A flow field maps a position and a time to a direction. [`NoiseField`]
//! samples seeded Perlin noise at `(x * scale, y * scale, tick * time_scale)`
//! and turns the value into an angle, which gives the slow organic drift used
//! by most of the gallery.
//!
//! The integer hashes give per-entity, per-tick jitter without touching an
//! RNG, so the same entity at the same tick always draws the same value.

use glam::Vec2;
use noise::{NoiseFn, Perlin};
use std::f32::consts::TAU;
use std::fmt;

/// Seeded Perlin flow field.
#[derive(Clone)]
pub struct NoiseField {
    perlin: Perlin,
    seed: u32,
    /// Spatial frequency: noise units per pixel.
    pub scale: f32,
    /// Temporal frequency: noise units per tick.
    pub time_scale: f32,
    /// How many full turns the noise range maps onto.
    pub angle_multiplier: f32,
    /// fBm octaves, at least 1.
    pub octaves: u32,
}

impl fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseField")
            .field("seed", &self.seed)
            .field("scale", &self.scale)
            .field("time_scale", &self.time_scale)
            .field("angle_multiplier", &self.angle_multiplier)
            .field("octaves", &self.octaves)
            .finish()
    }
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
            scale: 0.005,
            time_scale: 0.002,
            angle_multiplier: 1.0,
            octaves: 1,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn with_angle_multiplier(mut self, multiplier: f32) -> Self {
        self.angle_multiplier = multiplier;
        self
    }

    pub fn with_octaves(mut self, octaves: u32) -> Self {
        self.octaves = octaves.max(1);
        self
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Raw noise at a position and tick, roughly in `-1.0..=1.0`.
    pub fn sample(&self, position: Vec2, tick: u64) -> f32 {
        let x = (position.x * self.scale) as f64;
        let y = (position.y * self.scale) as f64;
        let t = tick as f64 * self.time_scale as f64;

        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut norm = 0.0;
        for _ in 0..self.octaves.max(1) {
            total += self.perlin.get([x * frequency, y * frequency, t * frequency]) * amplitude;
            norm += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }
        (total / norm) as f32
    }

    /// Field angle in radians.
    pub fn angle(&self, position: Vec2, tick: u64) -> f32 {
        self.sample(position, tick) * TAU * self.angle_multiplier
    }

    /// Unit direction of the field.
    pub fn direction(&self, position: Vec2, tick: u64) -> Vec2 {
        Vec2::from_angle(self.angle(position, tick))
    }
}

/// Integer avalanche hash.
#[inline]
pub fn hash_u32(n: u32) -> u32 {
    let mut x = n;
    x ^= x >> 17;
    x = x.wrapping_mul(0xed5a_d4bb);
    x ^= x >> 11;
    x = x.wrapping_mul(0xac4c_1b51);
    x ^= x >> 15;
    x = x.wrapping_mul(0x3184_8bab);
    x ^= x >> 14;
    x
}

/// Hash of a pair, order sensitive.
#[inline]
pub fn hash2(a: u32, b: u32) -> u32 {
    hash_u32(a.wrapping_add(hash_u32(b)))
}

/// Deterministic value in `[0, 1)` for an entity index at a tick.
#[inline]
pub fn hash_unit(index: usize, tick: u64) -> f32 {
    let h = hash2(index as u32, tick as u32 ^ (tick >> 32) as u32);
    // 24 bits keep the result strictly below 1.0 in f32
    (h >> 8) as f32 / (1u32 << 24) as f32
}

/// Deterministic value in `[-1, 1)`.
#[inline]
pub fn hash_signed(index: usize, tick: u64) -> f32 {
    hash_unit(index, tick) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_is_deterministic() {
        let a = NoiseField::new(9).with_octaves(3);
        let b = NoiseField::new(9).with_octaves(3);
        let p = Vec2::new(123.0, 45.0);
        assert_eq!(a.angle(p, 17), b.angle(p, 17));
    }

    #[test]
    fn test_direction_is_unit() {
        let field = NoiseField::new(1).with_scale(0.01);
        for i in 0..50 {
            let d = field.direction(Vec2::new(i as f32 * 13.7, i as f32 * 3.1), i);
            assert!((d.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_field_varies_over_space() {
        let field = NoiseField::new(3).with_scale(0.01);
        let samples: Vec<f32> = (0..20)
            .map(|i| field.sample(Vec2::new(i as f32 * 37.3, 11.0), 0))
            .collect();
        assert!(samples.iter().any(|s| (s - samples[0]).abs() > 1e-3));
    }

    #[test]
    fn test_hash_unit_range() {
        for index in 0..1000 {
            let v = hash_unit(index, index as u64 * 7);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_hash_stable_and_spread() {
        assert_eq!(hash_u32(12345), hash_u32(12345));
        assert_ne!(hash_u32(1), hash_u32(2));
        assert_ne!(hash2(1, 2), hash2(2, 1));
    }
}
