//! Visual configuration for entity rendering.
//!
//! These options control how entities appear, separate from the rules that
//! control how they move.
//!
//! # Usage
//!
//! ```ignore
//! ParticleSketch::new("embers", 600, |ctx| {
//!     AgedParticle::new(ctx.random_in_bounds(), ctx.random_velocity(1.0), 90.0)
//! })
//!     .with_visuals(|v| {
//!         v.blend_mode(BlendMode::Additive);
//!         v.background(Background::Fade { color: Vec3::ZERO, alpha: 0.08 });
//!         v.palette(Palette::Fire, ColorMapping::Life);
//!         v.fade_out();
//!     })
//! ```

use glam::Vec3;

pub use crate::surface::BlendMode;

/// Pre-defined colour palettes.
///
/// Sampled with a [`ColorMapping`] to colour entities automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    /// No palette: use the entity's own colour (default).
    #[default]
    None,

    /// Viridis - perceptually uniform, colorblind-friendly (purple to yellow).
    Viridis,

    /// Magma - perceptually uniform (black to yellow through red).
    Magma,

    /// Plasma - perceptually uniform (purple to yellow through pink).
    Plasma,

    /// Rainbow - classic rainbow gradient (red through violet).
    Rainbow,

    /// Sunset - warm oranges and pinks.
    Sunset,

    /// Ocean - cool blues and teals.
    Ocean,

    /// Fire - black through red, orange, yellow, white.
    Fire,

    /// Ice - white through light blue to deep blue.
    Ice,

    /// Neon - vibrant cyberpunk colors (pink, cyan, purple).
    Neon,

    /// Grayscale - black to white.
    Grayscale,
}

impl Palette {
    /// The five colour stops of this palette.
    pub fn colors(&self) -> [Vec3; 5] {
        match self {
            Palette::None => [Vec3::ONE; 5],
            Palette::Viridis => [
                Vec3::new(0.267, 0.004, 0.329), // Dark purple
                Vec3::new(0.282, 0.140, 0.458), // Purple
                Vec3::new(0.127, 0.566, 0.551), // Teal
                Vec3::new(0.369, 0.789, 0.383), // Green
                Vec3::new(0.993, 0.906, 0.144), // Yellow
            ],
            Palette::Magma => [
                Vec3::new(0.001, 0.0, 0.014),   // Black
                Vec3::new(0.329, 0.071, 0.435), // Purple
                Vec3::new(0.716, 0.215, 0.475), // Pink
                Vec3::new(0.994, 0.541, 0.380), // Orange
                Vec3::new(0.987, 0.991, 0.749), // Light yellow
            ],
            Palette::Plasma => [
                Vec3::new(0.050, 0.030, 0.528), // Dark blue
                Vec3::new(0.494, 0.012, 0.658), // Purple
                Vec3::new(0.798, 0.280, 0.470), // Pink
                Vec3::new(0.973, 0.580, 0.254), // Orange
                Vec3::new(0.940, 0.975, 0.131), // Yellow
            ],
            Palette::Rainbow => [
                Vec3::new(1.0, 0.0, 0.0), // Red
                Vec3::new(1.0, 1.0, 0.0), // Yellow
                Vec3::new(0.0, 1.0, 0.0), // Green
                Vec3::new(0.0, 1.0, 1.0), // Cyan
                Vec3::new(0.5, 0.0, 1.0), // Purple
            ],
            Palette::Sunset => [
                Vec3::new(0.1, 0.0, 0.2), // Dark purple
                Vec3::new(0.5, 0.0, 0.5), // Purple
                Vec3::new(1.0, 0.2, 0.4), // Pink
                Vec3::new(1.0, 0.5, 0.2), // Orange
                Vec3::new(1.0, 0.9, 0.4), // Yellow
            ],
            Palette::Ocean => [
                Vec3::new(0.0, 0.05, 0.15), // Deep blue
                Vec3::new(0.0, 0.2, 0.4),   // Dark blue
                Vec3::new(0.0, 0.4, 0.6),   // Blue
                Vec3::new(0.2, 0.6, 0.8),   // Light blue
                Vec3::new(0.6, 0.9, 1.0),   // Cyan
            ],
            Palette::Fire => [
                Vec3::new(0.1, 0.0, 0.0), // Dark red
                Vec3::new(0.5, 0.0, 0.0), // Red
                Vec3::new(1.0, 0.3, 0.0), // Orange
                Vec3::new(1.0, 0.7, 0.0), // Yellow-orange
                Vec3::new(1.0, 1.0, 0.8), // White-yellow
            ],
            Palette::Ice => [
                Vec3::new(1.0, 1.0, 1.0), // White
                Vec3::new(0.8, 0.9, 1.0), // Light blue
                Vec3::new(0.4, 0.7, 1.0), // Blue
                Vec3::new(0.1, 0.4, 0.8), // Medium blue
                Vec3::new(0.0, 0.1, 0.4), // Dark blue
            ],
            Palette::Neon => [
                Vec3::new(1.0, 0.0, 0.5), // Pink
                Vec3::new(0.5, 0.0, 1.0), // Purple
                Vec3::new(0.0, 0.5, 1.0), // Blue
                Vec3::new(0.0, 1.0, 1.0), // Cyan
                Vec3::new(0.5, 1.0, 0.5), // Green
            ],
            Palette::Grayscale => [
                Vec3::ZERO,
                Vec3::splat(0.25),
                Vec3::splat(0.5),
                Vec3::splat(0.75),
                Vec3::ONE,
            ],
        }
    }

    /// Linear interpolation between the stops, `t` clamped to `0.0..=1.0`.
    pub fn sample(&self, t: f32) -> Vec3 {
        let stops = self.colors();
        let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        stops[i].lerp(stops[i + 1], scaled - i as f32)
    }
}

/// How entity properties map to palette colours.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColorMapping {
    /// Use the entity's own colour (default).
    #[default]
    None,

    /// Position in the store, first to last.
    Index,

    /// Speed in pixels per tick, `min` to `max`.
    Speed { min: f32, max: f32 },

    /// Remaining life, dying to fresh. Entities without life use the end
    /// of the palette.
    Life,

    /// Vertical position, top to bottom of the surface.
    PositionY,

    /// Hue cycling, independent of the palette.
    ///
    /// Hue is `offset + spread * index / count + speed * elapsed_seconds`,
    /// wrapped to one turn.
    Hue { offset: f32, spread: f32, speed: f32 },
}

/// How the previous frame is treated before drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    /// Hard clear to a colour.
    Clear(Vec3),
    /// Trail fade: a low-alpha fill over the previous frame. Lower alpha
    /// means longer trails.
    Fade { color: Vec3, alpha: f32 },
    /// Draw over the previous frame untouched.
    Keep,
}

impl Default for Background {
    fn default() -> Self {
        Background::Clear(Vec3::new(0.02, 0.02, 0.05))
    }
}

/// Primitive drawn for each entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParticleShape {
    /// Anti-aliased disc of the entity radius (default).
    #[default]
    Circle,

    /// Axis-aligned square, side twice the radius.
    Square,

    /// Line from the entity back along its velocity, `length` ticks long,
    /// as wide as the radius.
    Streak { length: f32 },

    /// A bitmap glyph scaled by the radius.
    Glyph(char),
}

/// Which neighbour search the connection pass uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighborSearch {
    /// Morton-keyed bucket grid.
    #[default]
    Grid,
    /// Direct nested loop over all pairs.
    AllPairs,
}

/// Lines between entities closer than `distance`.
///
/// Line alpha falls off linearly from `alpha` at zero distance to nothing at
/// `distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connections {
    pub distance: f32,
    pub color: Vec3,
    pub alpha: f32,
    pub search: NeighborSearch,
}

impl Connections {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            color: Vec3::new(0.5, 0.7, 1.0),
            alpha: 0.6,
            search: NeighborSearch::Grid,
        }
    }

    /// Alpha of a line between two entities `dist` apart.
    pub fn alpha_at(&self, dist: f32) -> f32 {
        if self.distance <= 0.0 {
            return 0.0;
        }
        self.alpha * (1.0 - dist / self.distance).clamp(0.0, 1.0)
    }
}

/// Configuration for entity visuals.
///
/// Built with the closure passed to `ParticleSketch::with_visuals`.
#[derive(Debug, Clone, Default)]
pub struct VisualConfig {
    pub background: Background,
    pub blend_mode: BlendMode,
    pub shape: ParticleShape,
    pub palette: Palette,
    pub color_mapping: ColorMapping,
    pub connections: Option<Connections>,
    /// Scale alpha by remaining life.
    pub fade_out: bool,
    /// Scale radius by remaining life.
    pub shrink_out: bool,
}

impl VisualConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn background(&mut self, background: Background) -> &mut Self {
        self.background = background;
        self
    }

    /// Set the blend mode.
    ///
    /// ```ignore
    /// .with_visuals(|v| {
    ///     v.blend_mode(BlendMode::Additive); // Glowy particles
    /// })
    /// ```
    pub fn blend_mode(&mut self, mode: BlendMode) -> &mut Self {
        self.blend_mode = mode;
        self
    }

    pub fn shape(&mut self, shape: ParticleShape) -> &mut Self {
        self.shape = shape;
        self
    }

    /// Override entity colours with a palette.
    ///
    /// ```ignore
    /// .with_visuals(|v| {
    ///     v.palette(Palette::Fire, ColorMapping::Speed { min: 0.0, max: 2.0 });
    /// })
    /// ```
    pub fn palette(&mut self, palette: Palette, mapping: ColorMapping) -> &mut Self {
        self.palette = palette;
        self.color_mapping = mapping;
        self
    }

    /// Draw lines between entities within `distance` pixels.
    pub fn connections(&mut self, distance: f32) -> &mut Self {
        self.connections = Some(Connections::new(distance));
        self
    }

    /// Full connection settings.
    pub fn connections_with(&mut self, connections: Connections) -> &mut Self {
        self.connections = Some(connections);
        self
    }

    pub fn fade_out(&mut self) -> &mut Self {
        self.fade_out = true;
        self
    }

    pub fn shrink_out(&mut self) -> &mut Self {
        self.shrink_out = true;
        self
    }
}

/// Convert HSV (all components `0.0..=1.0`, hue wraps) to RGB.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn test_palette_endpoints_and_midpoint() {
        let stops = Palette::Viridis.colors();
        assert!(close(Palette::Viridis.sample(0.0), stops[0]));
        assert!(close(Palette::Viridis.sample(1.0), stops[4]));
        assert!(close(Palette::Viridis.sample(0.5), stops[2]));
        assert!(close(Palette::Grayscale.sample(0.125), Vec3::splat(0.125)));
        assert!(close(Palette::Viridis.sample(7.0), stops[4]));
    }

    #[test]
    fn test_hsv_to_rgb() {
        assert!(close(hsv_to_rgb(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), Vec3::new(0.0, 1.0, 0.0)));
        // hue wraps
        assert!(close(hsv_to_rgb(1.25, 1.0, 1.0), hsv_to_rgb(0.25, 1.0, 1.0)));
        assert!(close(hsv_to_rgb(0.7, 0.0, 0.5), Vec3::splat(0.5)));
    }

    #[test]
    fn test_connection_alpha_falloff() {
        let c = Connections::new(100.0);
        assert!((c.alpha_at(0.0) - 0.6).abs() < 1e-6);
        assert!((c.alpha_at(50.0) - 0.3).abs() < 1e-6);
        assert_eq!(c.alpha_at(150.0), 0.0);
    }

    #[test]
    fn test_builder_chains() {
        let mut v = VisualConfig::new();
        v.blend_mode(BlendMode::Additive).shape(ParticleShape::Square).fade_out();
        assert_eq!(v.blend_mode, BlendMode::Additive);
        assert_eq!(v.shape, ParticleShape::Square);
        assert!(v.fade_out && !v.shrink_out);
        assert!(v.connections.is_none());
    }
}
