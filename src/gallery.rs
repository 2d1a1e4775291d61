//! The built-in experiments.
//!
//! Each entry is an independent sketch with its own constants. They share
//! nothing but the skeleton, and their numbers are tuned by eye, so treat
//! them as data rather than as something to normalise.
//!
//! | Id | What it shows |
//! |----|---------------|
//! | `flow-field` | Noise-driven drift with long additive trails |
//! | `constellation` | Bouncing dots linked by distance, drawn to the pointer |
//! | `spring-grid` | A lattice pushed by the pointer and springing back |
//! | `fireworks` | Bursts on click and on a timer, falling under gravity |
//! | `starfield` | Perspective stars flying toward the viewer |
//! | `cursor-trail` | Rising sparks left behind by the moving pointer |
//! | `glyph-rain` | Falling columns of bitmap glyphs |

use crate::emitter::{burst, Emitter};
use crate::entity::{AgedParticle, Point2D, Point3D, NEAR_PLANE};
use crate::error::ConfigError;
use crate::field::{hash2, hash_unit, NoiseField};
use crate::rules::{Boundary, Falloff, PointerMode, PointerTrigger, Rule};
use crate::sketch::{FrameContext, ParticleSketch, Sketch};
use crate::store::Population;
use crate::surface::{Surface, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::visuals::{Background, BlendMode, ColorMapping, Palette, ParticleShape};
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Knobs shared by every experiment constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GallerySettings {
    /// RNG seed for the initial population.
    pub seed: u64,
    /// Replace the experiment's own entity count.
    pub count: Option<usize>,
}

impl GallerySettings {
    fn count_or(&self, default: usize) -> usize {
        self.count.unwrap_or(default)
    }
}

/// One catalogue entry.
#[derive(Clone, Copy)]
pub struct Experiment {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    constructor: fn(&GallerySettings) -> Box<dyn Sketch>,
}

impl Experiment {
    /// Construct a fresh, unseeded sketch.
    pub fn build(&self, settings: &GallerySettings) -> Box<dyn Sketch> {
        (self.constructor)(settings)
    }
}

impl std::fmt::Debug for Experiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Experiment").field("id", &self.id).field("title", &self.title).finish()
    }
}

static CATALOG: [Experiment; 7] = [
    Experiment {
        id: "flow-field",
        title: "Flow Field",
        description: "Particles drifting along Perlin noise, leaving additive trails",
        constructor: flow_field,
    },
    Experiment {
        id: "constellation",
        title: "Constellation",
        description: "Bouncing points joined by fading lines; the pointer gathers them",
        constructor: constellation,
    },
    Experiment {
        id: "spring-grid",
        title: "Spring Grid",
        description: "A lattice of points pushed away by the pointer, springing home",
        constructor: spring_grid,
    },
    Experiment {
        id: "fireworks",
        title: "Fireworks",
        description: "Spark bursts on click and every few seconds",
        constructor: fireworks,
    },
    Experiment {
        id: "starfield",
        title: "Starfield",
        description: "Stars in perspective rushing past the viewer",
        constructor: starfield,
    },
    Experiment {
        id: "cursor-trail",
        title: "Cursor Trail",
        description: "Colourful sparks shed by the moving pointer",
        constructor: cursor_trail,
    },
    Experiment {
        id: "glyph-rain",
        title: "Glyph Rain",
        description: "Columns of falling characters",
        constructor: glyph_rain,
    },
];

/// Every experiment, in display order.
pub fn catalog() -> &'static [Experiment] {
    &CATALOG
}

pub fn find(id: &str) -> Option<&'static Experiment> {
    CATALOG.iter().find(|e| e.id == id)
}

/// Build the experiment called `id`.
pub fn build(id: &str, settings: &GallerySettings) -> Result<Box<dyn Sketch>, ConfigError> {
    let experiment = find(id).ok_or_else(|| ConfigError::UnknownExperiment(id.to_string()))?;
    log::debug!("building '{}' with {:?}", experiment.id, settings);
    Ok(experiment.build(settings))
}

// ========== Experiments ==========

fn flow_field(settings: &GallerySettings) -> Box<dyn Sketch> {
    let field = NoiseField::new(settings.seed as u32)
        .with_scale(0.0035)
        .with_time_scale(0.003)
        .with_octaves(2);
    let sketch = ParticleSketch::new("flow-field", settings.count_or(2_500), |ctx| {
        Point2D::new(ctx.random_in_bounds(), Vec2::ZERO).with_radius(0.9)
    })
    .with_seed(settings.seed)
    .with_rule(Rule::FlowField { field, strength: 0.12 })
    .with_rule(Rule::Damping(0.95))
    .with_rule(Rule::SpeedLimit { min: 0.0, max: 2.2 })
    .with_boundary(Boundary::Wrap)
    .with_visuals(|v| {
        v.background(Background::Fade {
            color: Vec3::new(0.01, 0.01, 0.03),
            alpha: 0.05,
        })
        .blend_mode(BlendMode::Additive)
        .shape(ParticleShape::Square)
        .palette(Palette::Ocean, ColorMapping::Speed { min: 0.0, max: 2.2 });
    });
    Box::new(sketch)
}

fn constellation(settings: &GallerySettings) -> Box<dyn Sketch> {
    let sketch = ParticleSketch::new("constellation", settings.count_or(140), |ctx| {
        Point2D::new(ctx.random_in_bounds(), ctx.random_velocity(0.4))
            .with_radius(ctx.random_range(1.2, 2.6))
            .with_color(Vec3::new(0.85, 0.9, 1.0))
    })
    .with_seed(settings.seed)
    .with_rule(Rule::Pointer {
        radius: 160.0,
        strength: 0.03,
        falloff: Falloff::Linear,
        mode: PointerMode::Attract,
        trigger: PointerTrigger::Always,
        smoothed: true,
    })
    .with_rule(Rule::SpeedLimit { min: 0.0, max: 1.2 })
    .with_boundary(Boundary::Bounce { restitution: 1.0 })
    .with_visuals(|v| {
        v.background(Background::Clear(Vec3::new(0.03, 0.03, 0.08)))
            .connections(110.0);
    });
    Box::new(sketch)
}

fn spring_grid(settings: &GallerySettings) -> Box<dyn Sketch> {
    let count = settings.count_or(1_200).max(1);
    let cols = ((count as f32 * 1.6).sqrt().ceil() as usize).max(1);
    let rows = count.div_ceil(cols);
    let sketch = ParticleSketch::new("spring-grid", cols * rows, move |ctx| {
        let home = ctx.grid_position(cols, rows);
        Point2D::new(home, Vec2::ZERO).with_radius(1.6).with_home(home)
    })
    .with_seed(settings.seed)
    .with_rule(Rule::Pointer {
        radius: 120.0,
        strength: 2.5,
        falloff: Falloff::Smooth,
        mode: PointerMode::Repel,
        trigger: PointerTrigger::Always,
        smoothed: false,
    })
    .with_rule(Rule::SpringHome { stiffness: 0.04 })
    .with_rule(Rule::Damping(0.86))
    .with_visuals(|v| {
        v.background(Background::Clear(Vec3::new(0.02, 0.02, 0.04)))
            .palette(Palette::Sunset, ColorMapping::Speed { min: 0.0, max: 4.0 });
    });
    Box::new(sketch)
}

/// Ticks between automatic bursts.
const FIREWORK_INTERVAL: u64 = 50;

fn fireworks(settings: &GallerySettings) -> Box<dyn Sketch> {
    let capacity = settings.count_or(6_000);
    let sketch = ParticleSketch::new("fireworks", 0, |ctx| {
        let origin = ctx.origin.unwrap_or_else(|| ctx.random_in_bounds());
        AgedParticle::new(origin, Vec2::ZERO, ctx.random_range(45.0, 90.0))
            .with_radius(1.8)
            .with_color(ctx.random_hue(0.7, 1.0))
    })
    .with_seed(settings.seed)
    .with_population(Population::Bounded { capacity })
    .with_emitter(Emitter::PointerBurst { count: 140, speed: 5.0 })
    .with_update(|store, ctx: &FrameContext| {
        let tick = ctx.time.tick;
        if tick % FIREWORK_INTERVAL != 1 {
            return;
        }
        let origin = Vec2::new(
            ctx.bounds.x * (0.15 + 0.7 * hash_unit(0, tick)),
            ctx.bounds.y * (0.15 + 0.45 * hash_unit(1, tick)),
        );
        burst(store, origin, 100, 4.0, tick);
    })
    .with_rule(Rule::Gravity(0.06))
    .with_rule(Rule::Damping(0.975))
    .with_visuals(|v| {
        v.background(Background::Fade {
            color: Vec3::new(0.02, 0.02, 0.05),
            alpha: 0.18,
        })
        .blend_mode(BlendMode::Additive)
        .fade_out();
    });
    Box::new(sketch)
}

/// Farthest star depth.
const STAR_DEPTH: f32 = 1_000.0;

fn starfield(settings: &GallerySettings) -> Box<dyn Sketch> {
    let sketch = ParticleSketch::new("starfield", settings.count_or(900), |ctx| {
        let spread = ctx.bounds * 2.0;
        let x = ctx.random_range(-spread.x, spread.x);
        let y = ctx.random_range(-spread.y, spread.y);
        let z = ctx.random_range(NEAR_PLANE + 1.0, STAR_DEPTH);
        let speed = ctx.random_range(3.0, 7.0);
        Point3D::new(Vec3::new(x, y, z), Vec3::new(0.0, 0.0, -speed)).with_radius(0.7)
    })
    .with_seed(settings.seed)
    .with_visuals(|v| {
        v.background(Background::Fade {
            color: Vec3::ZERO,
            alpha: 0.4,
        })
        .blend_mode(BlendMode::Additive);
    });
    Box::new(sketch)
}

fn cursor_trail(settings: &GallerySettings) -> Box<dyn Sketch> {
    let capacity = settings.count_or(3_000);
    let sketch = ParticleSketch::new("cursor-trail", 0, |ctx| {
        let origin = ctx.origin.unwrap_or_else(|| ctx.random_in_bounds());
        AgedParticle::new(origin, Vec2::ZERO, ctx.random_range(40.0, 70.0))
            .with_radius(ctx.random_range(2.0, 4.0))
    })
    .with_seed(settings.seed)
    .with_population(Population::Bounded { capacity })
    .with_emitter(Emitter::PointerTrail { per_frame: 6, speed: 1.2 })
    .with_rule(Rule::Gravity(-0.03))
    .with_rule(Rule::Wander { strength: 0.06 })
    .with_rule(Rule::Damping(0.96))
    .with_visuals(|v| {
        v.background(Background::Fade {
            color: Vec3::new(0.02, 0.01, 0.03),
            alpha: 0.25,
        })
        .blend_mode(BlendMode::Additive)
        .palette(Palette::None, ColorMapping::Hue {
            offset: 0.0,
            spread: 0.5,
            speed: 0.08,
        })
        .fade_out()
        .shrink_out();
    });
    Box::new(sketch)
}

fn glyph_rain(settings: &GallerySettings) -> Box<dyn Sketch> {
    if settings.count.is_some() {
        log::debug!("glyph-rain sizes itself from the surface; count override ignored");
    }
    Box::new(GlyphRain::new(settings.seed))
}

// ========== Glyph rain ==========

const RAIN_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const RAIN_SCALE: u32 = 2;
/// Column pitch in pixels: glyph plus one scaled cell of gap.
const RAIN_PITCH_X: f32 = ((GLYPH_WIDTH + 1) * RAIN_SCALE) as f32;
const RAIN_PITCH_Y: f32 = ((GLYPH_HEIGHT + 1) * RAIN_SCALE) as f32;
/// Ticks a glyph keeps its character before it flickers.
const RAIN_FLICKER: u64 = 6;

#[derive(Debug, Clone, Copy)]
struct RainColumn {
    /// Row of the leading glyph, fractional.
    head: f32,
    /// Rows per tick.
    speed: f32,
    /// Trail length in rows.
    length: f32,
}

/// Columns of falling glyphs. Hand-written rather than entity based: the
/// state is one head per column.
#[derive(Debug)]
pub struct GlyphRain {
    rng: SmallRng,
    columns: Vec<RainColumn>,
    rows: f32,
    tick: u64,
}

impl GlyphRain {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            columns: Vec::new(),
            rows: 0.0,
            tick: 0,
        }
    }

    fn fresh_column(rng: &mut SmallRng, rows: f32, start_above: bool) -> RainColumn {
        let head = if start_above {
            -rng.gen_range(0.0..rows.max(1.0))
        } else {
            rng.gen_range(-rows.max(1.0)..rows.max(1.0))
        };
        RainColumn {
            head,
            speed: rng.gen_range(0.15..0.55),
            length: rng.gen_range(6.0..24.0),
        }
    }

    fn glyph_at(&self, column: usize, row: i64) -> char {
        let h = hash2(hash2(column as u32, row as u32), (self.tick / RAIN_FLICKER) as u32);
        RAIN_CHARS[h as usize % RAIN_CHARS.len()] as char
    }

    pub fn columns(&self) -> usize {
        self.columns.len()
    }
}

impl Sketch for GlyphRain {
    fn name(&self) -> &str {
        "glyph-rain"
    }

    fn seed(&mut self, bounds: Vec2) {
        let count = (bounds.x / RAIN_PITCH_X).floor().max(1.0) as usize;
        self.rows = (bounds.y / RAIN_PITCH_Y).ceil();
        let rows = self.rows;
        let rng = &mut self.rng;
        self.columns = (0..count).map(|_| Self::fresh_column(rng, rows, false)).collect();
        log::info!("seeded 'glyph-rain' with {} columns", count);
    }

    fn update(&mut self, ctx: &FrameContext) {
        self.tick = ctx.time.tick;
        let rows = self.rows;
        for column in &mut self.columns {
            column.head += column.speed;
            if column.head - column.length > rows {
                *column = Self::fresh_column(&mut self.rng, rows, true);
            }
        }
    }

    fn render(&mut self, surface: &mut Surface, _ctx: &FrameContext) {
        surface.fade(Vec3::ZERO, 0.35);
        let body = Vec3::new(0.1, 0.85, 0.35);
        let lead = Vec3::new(0.8, 1.0, 0.85);
        for (index, column) in self.columns.iter().enumerate() {
            let head = column.head.floor() as i64;
            let tail = (column.head - column.length).floor() as i64;
            let x = index as f32 * RAIN_PITCH_X;
            for row in tail.max(0)..=head {
                let behind = (head - row) as f32;
                let (color, alpha) = if row == head {
                    (lead, 1.0)
                } else {
                    (body, 1.0 - behind / column.length)
                };
                let origin = Vec2::new(x, row as f32 * RAIN_PITCH_Y);
                let glyph = self.glyph_at(index, row);
                surface.draw_glyph(glyph, origin, RAIN_SCALE, color, alpha, BlendMode::Alpha);
            }
        }
    }

    fn dispose(&mut self) {
        self.columns.clear();
    }
}
