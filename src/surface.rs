//! The raster drawing surface.
//!
//! A [`Surface`] is a plain RGBA8 pixel grid sized to the viewport. Sketches
//! paint into it with a handful of primitives (circles, lines, rectangles,
//! glyphs) and the host presents it however it likes: the desktop binary
//! uploads it to a GPU texture, tests read pixels back directly.
//!
//! Trails are made by fading instead of clearing:
//!
//! ```ignore
//! surface.fade(Vec3::ZERO, 0.08);  // low alpha = long trails
//! surface.fill_circle(p, 2.0, Vec3::ONE, 1.0, BlendMode::Alpha);
//! ```

use crate::error::SurfaceError;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use std::path::Path;

/// Width of a built-in glyph in font cells.
pub const GLYPH_WIDTH: u32 = 3;
/// Height of a built-in glyph in font cells.
pub const GLYPH_HEIGHT: u32 = 5;

/// One RGBA8 pixel, laid out exactly as the GPU texture expects.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    /// Fully transparent black.
    pub const TRANSPARENT: Pixel = Pixel { r: 0, g: 0, b: 0, a: 0 };

    /// Opaque pixel from an RGB colour in `0.0..=1.0`.
    pub fn from_rgb(color: Vec3) -> Self {
        Self {
            r: to_byte(color.x),
            g: to_byte(color.y),
            b: to_byte(color.z),
            a: 255,
        }
    }

    /// RGB components in `0.0..=1.0`.
    pub fn rgb(self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// How a drawn primitive combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source-over alpha blending.
    #[default]
    Alpha,
    /// Saturating additive blending ("lighter"). Overlaps glow.
    Additive,
}

/// RGBA raster sized to the viewport.
#[derive(Clone, Debug)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::ZeroSized { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![Pixel::TRANSPARENT; width as usize * height as usize],
        })
    }

    /// Reallocate the raster for a new viewport size.
    ///
    /// Previous contents are discarded. Zero-sized requests (minimised
    /// windows, teardown) are ignored. Returns `true` if the size changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::debug!("ignoring zero-sized resize to {}x{}", width, height);
            return false;
        }
        if width == self.width && height == self.height {
            return false;
        }
        log::debug!(
            "surface resized {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        self.width = width;
        self.height = height;
        self.pixels = vec![Pixel::TRANSPARENT; width as usize * height as usize];
        true
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size as a vector, the coordinate space entities live in.
    #[inline]
    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Raw RGBA bytes, ready for a texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Pixel at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    // ========== Whole-surface operations ==========

    /// Hard clear to an opaque colour.
    pub fn clear(&mut self, color: Vec3) {
        self.pixels.fill(Pixel::from_rgb(color));
    }

    /// Paint a translucent layer of `color` over everything.
    ///
    /// This is the motion-trail technique: each frame only partially covers
    /// the previous one. 8-bit rounding means very low alphas never fully
    /// reach `color`, leaving faint ghosts. That residue is part of the look.
    pub fn fade(&mut self, color: Vec3, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let alpha = alpha.min(1.0);
        for px in &mut self.pixels {
            *px = blend_pixel(*px, color, alpha, BlendMode::Alpha);
        }
    }

    // ========== Primitives ==========

    /// Blend a single pixel. Out-of-range coordinates are ignored.
    #[inline]
    pub fn plot(&mut self, x: i64, y: i64, color: Vec3, alpha: f32, mode: BlendMode) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] = blend_pixel(self.pixels[idx], color, alpha, mode);
    }

    /// Axis-aligned filled rectangle.
    pub fn fill_rect(
        &mut self,
        origin: Vec2,
        size: Vec2,
        color: Vec3,
        alpha: f32,
        mode: BlendMode,
    ) {
        let Some((x0, x1)) = self.clip_span(origin.x, origin.x + size.x, self.width) else {
            return;
        };
        let Some((y0, y1)) = self.clip_span(origin.y, origin.y + size.y, self.height) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.plot(x, y, color, alpha, mode);
            }
        }
    }

    /// Filled circle with a one pixel anti-aliased rim.
    pub fn fill_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        color: Vec3,
        alpha: f32,
        mode: BlendMode,
    ) {
        if radius <= 0.0 || alpha <= 0.0 || !center.is_finite() {
            return;
        }
        let r = radius.max(0.5);
        let (lo, hi) = (center - Vec2::splat(r + 1.0), center + Vec2::splat(r + 1.0));
        let Some((x0, x1)) = self.clip_span(lo.x, hi.x, self.width) else {
            return;
        };
        let Some((y0, y1)) = self.clip_span(lo.y, hi.y, self.height) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
                let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.plot(x, y, color, alpha * coverage, mode);
                }
            }
        }
    }

    /// Line segment. Widths above 1.5 are stamped with circles.
    pub fn draw_line(
        &mut self,
        a: Vec2,
        b: Vec2,
        width: f32,
        color: Vec3,
        alpha: f32,
        mode: BlendMode,
    ) {
        if alpha <= 0.0 || !a.is_finite() || !b.is_finite() {
            return;
        }
        let delta = b - a;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0);
        // Far off-screen lines would otherwise walk millions of steps.
        if steps > 4.0 * (self.width + self.height) as f32 {
            return;
        }
        let n = steps as u32;
        for i in 0..=n {
            let p = a + delta * (i as f32 / steps);
            if width > 1.5 {
                self.fill_circle(p, width * 0.5, color, alpha, mode);
            } else {
                self.plot(p.x.floor() as i64, p.y.floor() as i64, color, alpha, mode);
            }
        }
    }

    /// Draw a character from the built-in 3x5 font with its top-left at
    /// `origin`, each font cell `scale` pixels wide.
    pub fn draw_glyph(
        &mut self,
        ch: char,
        origin: Vec2,
        scale: u32,
        color: Vec3,
        alpha: f32,
        mode: BlendMode,
    ) {
        let rows = glyph_rows(ch);
        let cell = scale.max(1) as f32;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                    let at = origin + Vec2::new(col as f32 * cell, row as f32 * cell);
                    self.fill_rect(at, Vec2::splat(cell), color, alpha, mode);
                }
            }
        }
    }

    // ========== Snapshots ==========

    /// Copy the raster into an `image` buffer.
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            let p = self.pixels[(y * self.width + x) as usize];
            image::Rgba([p.r, p.g, p.b, p.a])
        })
    }

    /// Write the current frame as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), SurfaceError> {
        let path = path.as_ref();
        self.to_image().save_with_format(path, image::ImageFormat::Png)?;
        log::info!("saved snapshot to {}", path.display());
        Ok(())
    }

    /// Clip a float span `[start, end)` to whole pixels in `0..limit`.
    fn clip_span(&self, start: f32, end: f32, limit: u32) -> Option<(i64, i64)> {
        if !(start.is_finite() && end.is_finite()) {
            return None;
        }
        let lo = start.floor().max(0.0) as i64;
        let hi = (end.ceil() as i64).min(limit as i64);
        (lo < hi).then_some((lo, hi))
    }
}

fn blend_pixel(dst: Pixel, color: Vec3, alpha: f32, mode: BlendMode) -> Pixel {
    let alpha = alpha.clamp(0.0, 1.0);
    let d = dst.rgb();
    let da = dst.a as f32 / 255.0;
    let (rgb, a) = match mode {
        BlendMode::Alpha => (d + (color - d) * alpha, da + (1.0 - da) * alpha),
        BlendMode::Additive => ((d + color * alpha).min(Vec3::ONE), da.max(alpha)),
    };
    Pixel {
        r: to_byte(rgb.x),
        g: to_byte(rgb.y),
        b: to_byte(rgb.z),
        a: to_byte(a),
    }
}

/// Row bitmaps for the built-in font. Bit 2 is the leftmost column.
fn glyph_rows(ch: char) -> [u8; 5] {
    match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        ' ' => [0; 5],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '*' => [0b101, 0b010, 0b101, 0b010, 0b101],
        _ => [0b111; 5],
    }
}
