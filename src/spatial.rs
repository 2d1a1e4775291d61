//! Neighbour search for connection lines, using Morton encoding (Z-order
//! curve) over a uniform grid.
//!
//! Positions are bucketed into square cells, each keyed by the Morton code of
//! its cell coordinates, and sorted by key. A query for one entity then only
//! looks at the runs of neighbouring cells, found by binary search in the
//! sorted key list.
//!
//! [`all_pairs`] is the direct nested loop. Both report the same set of
//! pairs, each unordered pair once with its distance.

use glam::Vec2;

/// Largest cell coordinate on each axis (16 bits, 32-bit Morton code).
const MAX_CELL: i64 = 0xFFFF;

/// Spread the low 16 bits of `v` so there is a zero between each bit.
fn expand_bits(v: u32) -> u32 {
    let mut x = v & 0x0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333;
    x = (x | (x << 1)) & 0x5555_5555;
    x
}

/// Gather every other bit back into the low 16 bits.
fn compact_bits(v: u32) -> u32 {
    let mut x = v & 0x5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333;
    x = (x | (x >> 2)) & 0x0F0F_0F0F;
    x = (x | (x >> 4)) & 0x00FF_00FF;
    x = (x | (x >> 8)) & 0x0000_FFFF;
    x
}

/// 32-bit Morton code for a 2D cell (each coordinate 0-65535).
pub fn morton_encode(x: u32, y: u32) -> u32 {
    expand_bits(x) | (expand_bits(y) << 1)
}

/// Cell coordinates back from a Morton code.
pub fn morton_decode(code: u32) -> (u32, u32) {
    (compact_bits(code), compact_bits(code >> 1))
}

/// Uniform bucket grid over entity positions.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    positions: Vec<Vec2>,
    /// (morton code, entity index), sorted by code.
    keys: Vec<(u32, usize)>,
}

impl SpatialGrid {
    /// A grid whose cells are `cell_size` pixels wide. Use the link distance.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            positions: Vec::new(),
            keys: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Cell of a position, clamped to the addressable grid.
    ///
    /// Clamping can only merge cells, never separate neighbours, so entities
    /// off the surface are still found.
    fn cell_of(&self, p: Vec2) -> (i64, i64) {
        let cx = (p.x / self.cell_size).floor() as i64;
        let cy = (p.y / self.cell_size).floor() as i64;
        (cx.clamp(0, MAX_CELL), cy.clamp(0, MAX_CELL))
    }

    /// Re-bucket from scratch. Called once per frame.
    pub fn rebuild<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Vec2>,
    {
        self.positions.clear();
        self.positions.extend(positions);
        self.keys.clear();
        for (index, p) in self.positions.iter().enumerate() {
            let (cx, cy) = self.cell_of(*p);
            self.keys.push((morton_encode(cx as u32, cy as u32), index));
        }
        self.keys.sort_unstable();
    }

    /// Entity indices in one cell, as a run of the sorted key list.
    fn cell_run(&self, code: u32) -> &[(u32, usize)] {
        let start = self.keys.partition_point(|(k, _)| *k < code);
        let end = self.keys.partition_point(|(k, _)| *k <= code);
        &self.keys[start..end]
    }

    /// Call `f(i, j, distance)` for every pair closer than `max_dist`, with
    /// `i < j`.
    pub fn for_each_pair<F>(&self, max_dist: f32, mut f: F)
    where
        F: FnMut(usize, usize, f32),
    {
        if max_dist <= 0.0 {
            return;
        }
        let reach = (max_dist / self.cell_size).ceil() as i64;
        let max_sq = max_dist * max_dist;

        for (i, &p) in self.positions.iter().enumerate() {
            let (cx, cy) = self.cell_of(p);
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let (nx, ny) = (cx + dx, cy + dy);
                    if !(0..=MAX_CELL).contains(&nx) || !(0..=MAX_CELL).contains(&ny) {
                        continue;
                    }
                    for &(_, j) in self.cell_run(morton_encode(nx as u32, ny as u32)) {
                        if j <= i {
                            continue;
                        }
                        let d_sq = p.distance_squared(self.positions[j]);
                        if d_sq < max_sq {
                            f(i, j, d_sq.sqrt());
                        }
                    }
                }
            }
        }
    }

    /// Every pair closer than `max_dist`, as `(i, j, distance)` with `i < j`.
    pub fn pairs(&self, max_dist: f32) -> Vec<(usize, usize, f32)> {
        let mut out = Vec::new();
        self.for_each_pair(max_dist, |i, j, d| out.push((i, j, d)));
        out
    }
}

/// Direct O(n²) search: `f(i, j, distance)` for every pair closer than
/// `max_dist`, with `i < j`.
pub fn all_pairs<F>(positions: &[Vec2], max_dist: f32, mut f: F)
where
    F: FnMut(usize, usize, f32),
{
    let max_sq = max_dist * max_dist;
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let d_sq = positions[i].distance_squared(positions[j]);
            if d_sq < max_sq {
                f(i, j, d_sq.sqrt());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_morton_round_trip_corners() {
        for (x, y) in [(0, 0), (1, 0), (0, 1), (65535, 65535), (1234, 4321)] {
            assert_eq!(morton_decode(morton_encode(x, y)), (x, y));
        }
        assert_eq!(morton_encode(1, 0), 1);
        assert_eq!(morton_encode(0, 1), 2);
        assert_eq!(morton_encode(1, 1), 3);
    }

    fn sorted_pairs(mut v: Vec<(usize, usize, f32)>) -> Vec<(usize, usize)> {
        v.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        v.into_iter().map(|(i, j, _)| (i, j)).collect()
    }

    #[test]
    fn test_grid_matches_all_pairs() {
        let mut rng = SmallRng::seed_from_u64(5);
        let positions: Vec<Vec2> = (0..400)
            .map(|_| Vec2::new(rng.gen_range(-20.0..520.0), rng.gen_range(-20.0..320.0)))
            .collect();

        for dist in [12.0, 40.0, 75.0] {
            let mut grid = SpatialGrid::new(40.0);
            grid.rebuild(positions.iter().copied());

            let mut brute = Vec::new();
            all_pairs(&positions, dist, |i, j, d| brute.push((i, j, d)));

            assert_eq!(sorted_pairs(grid.pairs(dist)), sorted_pairs(brute), "distance {dist}");
        }
    }

    #[test]
    fn test_pairs_reported_once_with_distance() {
        let mut grid = SpatialGrid::new(10.0);
        grid.rebuild([Vec2::new(5.0, 5.0), Vec2::new(8.0, 9.0), Vec2::new(100.0, 100.0)]);
        let pairs = grid.pairs(10.0);
        assert_eq!(pairs.len(), 1);
        let (i, j, d) = pairs[0];
        assert_eq!((i, j), (0, 1));
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_and_zero_distance() {
        let mut grid = SpatialGrid::new(10.0);
        grid.rebuild(std::iter::empty());
        assert!(grid.pairs(10.0).is_empty());
        grid.rebuild([Vec2::ZERO, Vec2::ZERO]);
        assert!(grid.pairs(0.0).is_empty());
    }
}
