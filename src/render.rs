//! Draws an entity list onto a [`Surface`] according to a [`VisualConfig`].
//!
//! Order per frame: background (clear, fade or keep), connection lines, then
//! one primitive per living entity in store order.

use crate::entity::Entity;
use crate::spatial::{all_pairs, SpatialGrid};
use crate::surface::{Surface, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::time::FrameTime;
use crate::visuals::{
    hsv_to_rgb, Background, ColorMapping, NeighborSearch, Palette, ParticleShape, VisualConfig,
};
use glam::{Vec2, Vec3};

/// Stateful renderer; keeps the neighbour grid between frames.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: VisualConfig,
    grid: SpatialGrid,
    positions: Vec<Vec2>,
}

impl Renderer {
    pub fn new(config: VisualConfig) -> Self {
        let cell = config.connections.map(|c| c.distance).unwrap_or(1.0);
        Self {
            config,
            grid: SpatialGrid::new(cell),
            positions: Vec::new(),
        }
    }

    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    /// Paint one frame.
    pub fn render<E: Entity>(&mut self, surface: &mut Surface, entities: &[E], time: FrameTime) {
        match self.config.background {
            Background::Clear(color) => surface.clear(color),
            Background::Fade { color, alpha } => surface.fade(color, alpha),
            Background::Keep => {}
        }

        let bounds = surface.bounds();
        if self.config.connections.is_some() {
            self.draw_connections(surface, entities);
        }

        let count = entities.len();
        let mode = self.config.blend_mode;
        for (index, entity) in entities.iter().enumerate() {
            if !entity.is_alive() {
                continue;
            }
            let projection = entity.project(bounds);
            let life = entity.life_fraction().unwrap_or(1.0);
            let alpha = entity.alpha() * if self.config.fade_out { life } else { 1.0 };
            let shrink = if self.config.shrink_out { life } else { 1.0 };
            let radius = entity.radius() * projection.scale * shrink;
            if alpha <= 0.0 || radius <= 0.0 {
                continue;
            }
            let color = self.color_for(entity, index, count, bounds, time);
            let at = projection.position;

            match self.config.shape {
                ParticleShape::Circle => surface.fill_circle(at, radius, color, alpha, mode),
                ParticleShape::Square => {
                    let corner = at - Vec2::splat(radius);
                    surface.fill_rect(corner, Vec2::splat(radius * 2.0), color, alpha, mode)
                }
                ParticleShape::Streak { length } => {
                    let tail = at - entity.velocity() * projection.scale * length;
                    surface.draw_line(tail, at, radius, color, alpha, mode);
                }
                ParticleShape::Glyph(ch) => {
                    let scale = radius.round().max(1.0) as u32;
                    let size =
                        Vec2::new((GLYPH_WIDTH * scale) as f32, (GLYPH_HEIGHT * scale) as f32);
                    surface.draw_glyph(ch, at - size * 0.5, scale, color, alpha, mode);
                }
            }
        }
    }

    fn draw_connections<E: Entity>(&mut self, surface: &mut Surface, entities: &[E]) {
        let Some(links) = self.config.connections else {
            return;
        };
        let bounds = surface.bounds();
        self.positions.clear();
        self.positions.extend(entities.iter().map(|e| e.project(bounds).position));

        let mode = self.config.blend_mode;
        let positions = &self.positions;
        let mut draw = |i: usize, j: usize, dist: f32| {
            if !(entities[i].is_alive() && entities[j].is_alive()) {
                return;
            }
            let alpha = links.alpha_at(dist);
            surface.draw_line(positions[i], positions[j], 1.0, links.color, alpha, mode);
        };

        match links.search {
            NeighborSearch::Grid => {
                if self.grid.cell_size() != links.distance.max(1.0) {
                    self.grid = SpatialGrid::new(links.distance);
                }
                self.grid.rebuild(positions.iter().copied());
                self.grid.for_each_pair(links.distance, &mut draw);
            }
            NeighborSearch::AllPairs => all_pairs(positions, links.distance, &mut draw),
        }
    }

    fn color_for<E: Entity>(
        &self,
        entity: &E,
        index: usize,
        count: usize,
        bounds: Vec2,
        time: FrameTime,
    ) -> Vec3 {
        let palette = self.config.palette;
        let t = match self.config.color_mapping {
            ColorMapping::None => return entity.color(),
            ColorMapping::Hue { offset, spread, speed } => {
                let progress = if count > 0 { index as f32 / count as f32 } else { 0.0 };
                let hue = offset + spread * progress + speed * time.elapsed;
                return hsv_to_rgb(hue, 0.8, 1.0);
            }
            _ if palette == Palette::None => return entity.color(),
            ColorMapping::Index => {
                if count > 1 {
                    index as f32 / (count - 1) as f32
                } else {
                    0.0
                }
            }
            ColorMapping::Speed { min, max } => {
                if max > min {
                    (entity.velocity().length() - min) / (max - min)
                } else {
                    0.0
                }
            }
            ColorMapping::Life => entity.life_fraction().unwrap_or(1.0),
            ColorMapping::PositionY => {
                if bounds.y > 0.0 {
                    entity.position().y / bounds.y
                } else {
                    0.0
                }
            }
        };
        palette.sample(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AgedParticle, Point2D};
    use crate::visuals::{BlendMode, Connections};

    fn surface() -> Surface {
        Surface::new(40, 20).unwrap()
    }

    #[test]
    fn test_clear_then_draw() {
        let mut s = surface();
        let mut config = VisualConfig::new();
        config.background(Background::Clear(Vec3::ZERO));
        let mut renderer = Renderer::new(config);
        let dots = vec![Point2D::new(Vec2::new(10.5, 10.5), Vec2::ZERO).with_radius(2.0)];
        renderer.render(&mut s, &dots, FrameTime::default());

        assert_eq!(s.pixel(10, 10).map(|p| p.r), Some(255));
        assert_eq!(s.pixel(30, 5).map(|p| p.r), Some(0));
        assert_eq!(s.pixel(30, 5).map(|p| p.a), Some(255));
    }

    #[test]
    fn test_dead_entities_are_skipped() {
        let mut s = surface();
        let mut renderer = Renderer::new(VisualConfig::new());
        let mut spark = AgedParticle::new(Vec2::new(10.5, 10.5), Vec2::ZERO, 1.0);
        spark.age();
        renderer.render(&mut s, &[spark], FrameTime::default());
        assert!(s.pixel(10, 10).map(|p| p.r < 10).unwrap_or(false));
    }

    #[test]
    fn test_fade_out_scales_alpha() {
        let mut config = VisualConfig::new();
        config
            .background(Background::Clear(Vec3::ZERO))
            .blend_mode(BlendMode::Additive)
            .shape(ParticleShape::Square)
            .fade_out();
        let mut renderer = Renderer::new(config);
        let mut spark = AgedParticle::new(Vec2::new(10.0, 10.0), Vec2::ZERO, 2.0);
        spark.age();

        let mut s = surface();
        renderer.render(&mut s, &[spark], FrameTime::default());
        let r = s.pixel(10, 10).map(|p| p.r).unwrap_or(0);
        assert!((120..=135).contains(&r), "half life gives half brightness, got {r}");
    }

    #[test]
    fn test_connections_grid_and_all_pairs_agree() {
        let dots: Vec<Point2D> = [(5.0, 5.0), (15.0, 6.0), (30.0, 15.0), (34.0, 12.0)]
            .iter()
            .map(|&(x, y)| Point2D::new(Vec2::new(x, y), Vec2::ZERO).with_radius(0.0))
            .collect();

        let render_with = |search| {
            let mut config = VisualConfig::new();
            config.background(Background::Clear(Vec3::ZERO)).connections_with(Connections {
                search,
                ..Connections::new(12.0)
            });
            let mut s = surface();
            Renderer::new(config).render(&mut s, &dots, FrameTime::default());
            s.as_bytes().to_vec()
        };
        let grid = render_with(NeighborSearch::Grid);
        assert_eq!(grid, render_with(NeighborSearch::AllPairs));
        // both close pairs are linked
        assert!(grid.iter().step_by(4).any(|&r| r > 0));
    }

    #[test]
    fn test_palette_mapping_by_index() {
        let mut config = VisualConfig::new();
        config.palette(Palette::Grayscale, ColorMapping::Index);
        let renderer = Renderer::new(config);
        let dot = Point2D::new(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(renderer.color_for(&dot, 0, 3, Vec2::ONE, FrameTime::default()), Vec3::ZERO);
        assert_eq!(renderer.color_for(&dot, 2, 3, Vec2::ONE, FrameTime::default()), Vec3::ONE);
    }
}
