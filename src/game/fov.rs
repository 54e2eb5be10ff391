//! # Visibility Engine
//!
//! Recursive shadowcasting over eight octants. Opaque cells are themselves
//! visible but hide what lies behind them, and the radius is a hard cutoff
//! measured as Euclidean distance from the origin. Every cell marked visible is
//! also marked explored on the grid, permanently.

use crate::{Grid, Position};
use serde::{Deserialize, Serialize};

/// Octant transforms as (xx, xy, yx, yy).
const OCTANTS: [(i32, i32, i32, i32); 8] = [
    (1, 0, 0, 1),
    (0, 1, 1, 0),
    (0, -1, 1, 0),
    (-1, 0, 0, 1),
    (-1, 0, 0, -1),
    (0, -1, -1, 0),
    (0, 1, -1, 0),
    (1, 0, 0, -1),
];

/// Per-cell "currently visible" flags for the active grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisibilityMap {
    width: i32,
    height: i32,
    visible: Vec<bool>,
}

impl VisibilityMap {
    /// Creates an all-dark map sized for `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        let mut map = Self::default();
        map.resize(grid.width(), grid.height());
        map
    }

    fn resize(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.visible = vec![false; (width.max(0) * height.max(0)) as usize];
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    /// Whether `pos` was in view at the last recomputation.
    pub fn is_visible(&self, pos: Position) -> bool {
        self.index(pos).map(|i| self.visible[i]).unwrap_or(false)
    }

    /// Number of cells currently in view.
    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|&&v| v).count()
    }

    /// Recomputes visibility from `origin` and marks every visible cell explored.
    pub fn recompute(&mut self, grid: &mut Grid, origin: Position, radius: i32) {
        if self.width != grid.width() || self.height != grid.height() {
            self.resize(grid.width(), grid.height());
        } else {
            self.visible.iter_mut().for_each(|v| *v = false);
        }

        if !grid.in_bounds(origin) {
            return;
        }
        self.reveal(grid, origin);

        for octant in OCTANTS {
            self.cast_light(grid, origin, radius, 1, 1.0, 0.0, octant);
        }
    }

    fn reveal(&mut self, grid: &mut Grid, pos: Position) {
        if let Some(i) = self.index(pos) {
            self.visible[i] = true;
            if let Some(tile) = grid.get_mut(pos) {
                tile.mark_explored();
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn cast_light(
        &mut self,
        grid: &mut Grid,
        origin: Position,
        radius: i32,
        row: i32,
        mut start: f64,
        end: f64,
        (xx, xy, yx, yy): (i32, i32, i32, i32),
    ) {
        if start < end {
            return;
        }
        let radius_sq = radius * radius;
        let mut new_start = 0.0;

        for j in row..=radius {
            let dy = -j;
            let mut blocked = false;

            for dx in -j..=0 {
                let l_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
                let r_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);
                if start < r_slope {
                    continue;
                } else if end > l_slope {
                    break;
                }

                let pos = Position::new(
                    origin.x + dx * xx + dy * xy,
                    origin.y + dx * yx + dy * yy,
                );
                if dx * dx + dy * dy <= radius_sq {
                    self.reveal(grid, pos);
                }

                let opaque = grid.blocks_sight(pos);
                if blocked {
                    if opaque {
                        new_start = r_slope;
                    } else {
                        blocked = false;
                        start = new_start;
                    }
                } else if opaque && j < radius {
                    blocked = true;
                    self.cast_light(
                        grid,
                        origin,
                        radius,
                        j + 1,
                        start,
                        l_slope,
                        (xx, xy, yx, yy),
                    );
                    new_start = r_slope;
                }
            }

            if blocked {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tile;
    use proptest::prelude::*;

    fn open_room(width: i32, height: i32) -> Grid {
        let mut grid = Grid::walls(width, height);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                grid.set(Position::new(x, y), Tile::floor()).unwrap();
            }
        }
        grid
    }

    #[test]
    fn test_origin_and_neighbors_visible() {
        let mut grid = open_room(20, 20);
        let mut fov = VisibilityMap::for_grid(&grid);
        fov.recompute(&mut grid, Position::new(10, 10), 5);

        assert!(fov.is_visible(Position::new(10, 10)));
        assert!(fov.is_visible(Position::new(11, 10)));
        assert!(fov.is_visible(Position::new(10, 11)));
        assert!(fov.is_visible(Position::new(13, 13)));
        assert!(grid.get(Position::new(10, 10)).unwrap().is_explored());
    }

    #[test]
    fn test_radius_is_hard_cutoff() {
        let mut grid = open_room(30, 30);
        let mut fov = VisibilityMap::for_grid(&grid);
        let origin = Position::new(15, 15);
        fov.recompute(&mut grid, origin, 4);

        for pos in grid.positions().collect::<Vec<_>>() {
            if fov.is_visible(pos) {
                assert!(origin.euclidean_distance(pos) <= 4.0, "{:?} beyond radius", pos);
            }
        }
        assert!(fov.is_visible(Position::new(19, 15)));
        assert!(!fov.is_visible(Position::new(20, 15)));
        assert!(!grid.get(Position::new(20, 15)).unwrap().is_explored());
    }

    #[test]
    fn test_walls_block_sight() {
        let mut grid = open_room(20, 9);
        // Vertical wall at x = 10 across the room.
        for y in 1..8 {
            grid.set(Position::new(10, y), Tile::wall()).unwrap();
        }
        let mut fov = VisibilityMap::for_grid(&grid);
        fov.recompute(&mut grid, Position::new(5, 4), 12);

        assert!(fov.is_visible(Position::new(9, 4)));
        assert!(fov.is_visible(Position::new(10, 4)), "the wall itself is seen");
        assert!(!fov.is_visible(Position::new(11, 4)));
        assert!(!fov.is_visible(Position::new(15, 4)));
    }

    #[test]
    fn test_transparent_obstacle_does_not_block_sight() {
        let mut grid = open_room(20, 9);
        grid.set(Position::new(8, 4), Tile::with_sight(true, false, '~'))
            .unwrap();
        let mut fov = VisibilityMap::for_grid(&grid);
        fov.recompute(&mut grid, Position::new(5, 4), 10);
        assert!(fov.is_visible(Position::new(12, 4)));
    }

    #[test]
    fn test_visibility_cleared_but_explored_kept() {
        let mut grid = open_room(40, 12);
        let mut fov = VisibilityMap::for_grid(&grid);
        fov.recompute(&mut grid, Position::new(5, 5), 3);
        assert!(fov.is_visible(Position::new(6, 5)));

        fov.recompute(&mut grid, Position::new(30, 5), 3);
        assert!(!fov.is_visible(Position::new(6, 5)));
        assert!(grid.get(Position::new(6, 5)).unwrap().is_explored());
        assert!(fov.is_visible(Position::new(31, 5)));
    }

    #[test]
    fn test_symmetric_along_open_line() {
        let mut grid = open_room(30, 10);
        let a = Position::new(3, 4);
        let b = Position::new(12, 4);

        let mut fov = VisibilityMap::for_grid(&grid);
        fov.recompute(&mut grid, a, 10);
        assert!(fov.is_visible(b));
        fov.recompute(&mut grid, b, 10);
        assert!(fov.is_visible(a));
    }

    proptest! {
        #[test]
        fn prop_explored_is_monotonic(origins in proptest::collection::vec((1i32..24, 1i32..14), 1..12)) {
            let mut grid = open_room(25, 15);
            grid.set(Position::new(12, 7), Tile::wall()).unwrap();
            let mut fov = VisibilityMap::for_grid(&grid);
            let mut explored_before: Vec<bool> = grid.tiles().map(|t| t.is_explored()).collect();

            for (x, y) in origins {
                fov.recompute(&mut grid, Position::new(x, y), 6);
                let explored_now: Vec<bool> = grid.tiles().map(|t| t.is_explored()).collect();
                for (before, now) in explored_before.iter().zip(explored_now.iter()) {
                    prop_assert!(!before || *now);
                }
                explored_before = explored_now;
            }
        }
    }
}
