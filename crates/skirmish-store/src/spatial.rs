//! Uniform hash grid over unit slots.

use indexmap::IndexMap;
use smallvec::SmallVec;
use skirmish_core::Vec2;

use crate::block::UnitBlock;

type Bucket = SmallVec<[usize; 8]>;

/// Sparse hash grid for neighbour queries.
///
/// Built from a [`UnitBlock`] snapshot; rebuild it whenever positions
/// change. Query results are sorted by slot so callers see a
/// deterministic order.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: IndexMap<(i32, i32), Bucket>,
}

impl SpatialGrid {
    /// An empty grid. `cell_size` is clamped to a small positive minimum.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: if cell_size.is_finite() {
                cell_size.max(0.01)
            } else {
                1.0
            },
            cells: IndexMap::new(),
        }
    }

    /// Grid built from every living unit in `block`.
    pub fn from_block(cell_size: f32, block: &UnitBlock) -> Self {
        let mut grid = Self::new(cell_size);
        grid.rebuild(block);
        grid
    }

    /// Edge length of a cell.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Insert a slot at `pos`.
    pub fn insert(&mut self, index: usize, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push(index);
    }

    /// Re-index every living unit in `block`.
    pub fn rebuild(&mut self, block: &UnitBlock) {
        self.clear();
        for i in 0..block.capacity() {
            if block.is_alive(i) {
                self.insert(i, block.position(i));
            }
        }
    }

    /// Slots whose position lies within `radius` of `center`, ascending.
    pub fn query_radius(&self, block: &UnitBlock, center: Vec2, radius: f32) -> Vec<usize> {
        if radius.is_nan() || radius < 0.0 || !center.is_finite() {
            return Vec::new();
        }
        let r_sq = radius * radius;
        let mut out: Vec<usize> = self
            .candidates(center, radius)
            .into_iter()
            .filter(|&i| block.position(i).distance_squared(center) <= r_sq)
            .collect();
        out.sort_unstable();
        out
    }

    /// Slots inside the axis-aligned rectangle `[min, max]`, ascending.
    pub fn query_rect(&self, block: &UnitBlock, min: Vec2, max: Vec2) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .slots_in_cells(self.cell_coord(min), self.cell_coord(max))
            .into_iter()
            .filter(|&i| {
                let p = block.position(i);
                p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
            })
            .collect();
        out.sort_unstable();
        out
    }

    /// Every unordered pair `(lo, hi)` with `lo < hi` whose distance is at
    /// most `max_distance`, sorted by `(lo, hi)`.
    pub fn pairs_within(&self, block: &UnitBlock, max_distance: f32) -> Vec<(usize, usize)> {
        if max_distance.is_nan() || max_distance < 0.0 {
            return Vec::new();
        }
        let d_sq = max_distance * max_distance;
        let mut out = Vec::new();
        for bucket in self.cells.values() {
            for &i in bucket {
                let pi = block.position(i);
                for j in self.candidates(pi, max_distance) {
                    if j > i && block.position(j).distance_squared(pi) <= d_sq {
                        out.push((i, j));
                    }
                }
            }
        }
        out.sort_unstable();
        out
    }

    fn candidates(&self, center: Vec2, radius: f32) -> Vec<usize> {
        let (cx, cy) = self.cell_coord(center);
        let reach = (radius / self.cell_size).ceil().min(1024.0) as i32;
        self.slots_in_cells(
            (cx.saturating_sub(reach), cy.saturating_sub(reach)),
            (cx.saturating_add(reach), cy.saturating_add(reach)),
        )
    }

    /// Slots in the occupied cells of the inclusive block `lo..=hi`.
    ///
    /// Walks the block cell by cell when it is smaller than the occupied
    /// set, and scans the occupied cells otherwise.
    fn slots_in_cells(&self, lo: (i32, i32), hi: (i32, i32)) -> Vec<usize> {
        let (x0, y0) = lo;
        let (x1, y1) = hi;
        if x0 > x1 || y0 > y1 {
            return Vec::new();
        }
        let area = (i64::from(x1) - i64::from(x0) + 1)
            .saturating_mul(i64::from(y1) - i64::from(y0) + 1);
        let mut out = Vec::new();
        if area > self.cells.len() as i64 {
            for (&(cx, cy), bucket) in &self.cells {
                if (x0..=x1).contains(&cx) && (y0..=y1).contains(&cy) {
                    out.extend_from_slice(bucket);
                }
            }
        } else {
            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    if let Some(bucket) = self.cells.get(&(cx, cy)) {
                        out.extend_from_slice(bucket);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnitManager;
    use skirmish_core::{Team, UnitRecord};

    fn manager(points: &[(f32, f32)]) -> UnitManager {
        let mut m = UnitManager::new(points.len());
        for (n, &(x, y)) in points.iter().enumerate() {
            m.add(UnitRecord::new(format!("u{n}"), Team::Friendly, Vec2::new(x, y)))
                .unwrap();
        }
        m
    }

    #[test]
    fn radius_query_crosses_cells() {
        let m = manager(&[(0.0, 0.0), (2.9, 0.0), (6.0, 0.0), (-2.5, -1.0)]);
        let grid = SpatialGrid::from_block(1.0, m.block());
        assert_eq!(grid.query_radius(m.block(), Vec2::ZERO, 3.0), vec![0, 1, 3]);
    }

    #[test]
    fn rect_query_is_inclusive() {
        let m = manager(&[(0.0, 0.0), (1.0, 1.0), (1.5, 0.0)]);
        let grid = SpatialGrid::from_block(2.0, m.block());
        assert_eq!(
            grid.query_rect(m.block(), Vec2::ZERO, Vec2::new(1.0, 1.0)),
            vec![0, 1]
        );
    }

    #[test]
    fn pairs_are_unique_and_ordered() {
        let m = manager(&[(0.0, 0.0), (0.5, 0.0), (1.0, 0.0), (9.0, 9.0)]);
        let grid = SpatialGrid::from_block(1.0, m.block());
        assert_eq!(
            grid.pairs_within(m.block(), 1.0),
            vec![(0, 1), (0, 2), (1, 2)]
        );
    }

    #[test]
    fn nan_radius_matches_nothing() {
        let m = manager(&[(0.0, 0.0)]);
        let grid = SpatialGrid::from_block(1.0, m.block());
        assert!(grid.query_radius(m.block(), Vec2::ZERO, f32::NAN).is_empty());
    }

    #[test]
    fn far_flung_units_pair_without_overflow() {
        let m = manager(&[(1e12, -1e12), (1e12, -1e12), (0.0, 0.0), (-1e12, 1e12)]);
        let grid = SpatialGrid::from_block(1.0, m.block());
        assert_eq!(grid.pairs_within(m.block(), 1.0), vec![(0, 1)]);
        assert_eq!(
            grid.query_radius(m.block(), Vec2::new(1e12, -1e12), 2.0),
            vec![0, 1]
        );
    }

    #[test]
    fn huge_rect_scans_occupied_cells_only() {
        let m = manager(&[(0.0, 0.0), (3.0, 4.0), (2e5, 0.0)]);
        let grid = SpatialGrid::from_block(2.0, m.block());
        let everything = grid.query_rect(
            m.block(),
            Vec2::new(-1e5, -1e5),
            Vec2::new(1e5, 1e5),
        );
        assert_eq!(everything, vec![0, 1]);
        let all = grid.query_rect(
            m.block(),
            Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
            Vec2::new(f32::INFINITY, f32::INFINITY),
        );
        assert_eq!(all, vec![0, 1, 2]);
    }

    #[test]
    fn inverted_rect_is_empty() {
        let m = manager(&[(1.0, 1.0)]);
        let grid = SpatialGrid::from_block(1.0, m.block());
        assert!(grid
            .query_rect(m.block(), Vec2::new(2.0, 2.0), Vec2::ZERO)
            .is_empty());
    }
}
