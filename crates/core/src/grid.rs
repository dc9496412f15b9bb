//! Grid module - occupancy map for one play field
//!
//! The grid is a 6x13 map from cell to puyo handle, stored as a flat array
//! for cache locality. It holds back-references only: pieces themselves live
//! in the [`PuyoPool`](crate::pool::PuyoPool). Coordinates are (x, y) with
//! x in 0..6 left to right and y in 0..13 bottom to top; anything out of
//! bounds reads as closed.

use arrayvec::ArrayVec;

use crate::pool::{PuyoHandle, PuyoPool};
use crate::types::{GRID_CELLS, GRID_HEIGHT, GRID_WIDTH, MIN_COMBO_SIZE};

/// Reusable staging buffer for combo detection.
///
/// After [`Grid::find_combos`] returns `count`, the first `count` entries are
/// exactly the pieces of the promoted combo groups, contiguous per group.
pub type ComboStaging = ArrayVec<PuyoHandle, GRID_CELLS>;

/// Occupancy map for one player's play field.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Flat array of cells, row-major order (y * WIDTH + x).
    cells: [Option<PuyoHandle>; GRID_CELLS],
}

impl Grid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self {
            cells: [None; GRID_CELLS],
        }
    }

    /// Calculate flat index from (x, y) coordinates.
    #[inline(always)]
    fn index(x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= GRID_WIDTH || y < 0 || y >= GRID_HEIGHT {
            return None;
        }
        Some((y * GRID_WIDTH + x) as usize)
    }

    pub fn width(&self) -> i32 {
        GRID_WIDTH
    }

    pub fn height(&self) -> i32 {
        GRID_HEIGHT
    }

    /// Store a piece at (x, y) and write the cell position into the piece.
    ///
    /// The target must be in bounds and empty; callers validate with
    /// [`is_open`](Self::is_open) first, so a violation is a programming
    /// error and fails fast.
    pub fn add_piece(&mut self, pool: &mut PuyoPool, handle: PuyoHandle, x: i32, y: i32) {
        let idx = Self::index(x, y)
            .unwrap_or_else(|| panic!("add_piece out of bounds at ({}, {})", x, y));
        assert!(
            self.cells[idx].is_none(),
            "add_piece into occupied cell ({}, {})",
            x,
            y
        );

        let puyo = pool.get_mut(handle);
        puyo.x = x as f32;
        puyo.y = y as f32;
        self.cells[idx] = Some(handle);
    }

    /// Clear the cell at (x, y), returning whatever was stored there.
    pub fn remove_piece(&mut self, x: i32, y: i32) -> Option<PuyoHandle> {
        let idx = Self::index(x, y)
            .unwrap_or_else(|| panic!("remove_piece out of bounds at ({}, {})", x, y));
        self.cells[idx].take()
    }

    /// Handle stored at (x, y). Out-of-bounds and empty both read as `None`.
    pub fn piece_at(&self, x: i32, y: i32) -> Option<PuyoHandle> {
        Self::index(x, y).and_then(|idx| self.cells[idx])
    }

    /// True only for in-bounds, unoccupied cells.
    pub fn is_open(&self, x: i32, y: i32) -> bool {
        match Self::index(x, y) {
            Some(idx) => self.cells[idx].is_none(),
            None => false,
        }
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Empty every cell. Instance teardown only; pieces are freed elsewhere.
    pub fn clear(&mut self) {
        self.cells = [None; GRID_CELLS];
    }

    /// Find all combo groups and stage their pieces.
    ///
    /// Scans row-major, flood-filling each unvisited piece's 4-connected
    /// same-color group. Groups of at least [`MIN_COMBO_SIZE`] stay in the
    /// staging buffer and count toward the returned total; smaller groups
    /// are compacted away, so `staging[..count]` is exactly the set of
    /// pieces to remove.
    pub fn find_combos(&self, pool: &mut PuyoPool, staging: &mut ComboStaging) -> usize {
        self.reset_checked(pool);
        staging.clear();

        let mut total = 0usize;
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                let handle = match self.piece_at(x, y) {
                    Some(h) => h,
                    None => continue,
                };
                if pool.get(handle).checked {
                    continue;
                }

                let group_start = staging.len();
                self.flood_fill(pool, x, y, staging);
                let group_size = staging.len() - group_start;

                if group_size >= MIN_COMBO_SIZE {
                    total += group_size;
                } else {
                    staging.truncate(group_start);
                }
            }
        }

        total
    }

    fn reset_checked(&self, pool: &mut PuyoPool) {
        for cell in self.cells.iter().flatten() {
            pool.get_mut(*cell).checked = false;
        }
    }

    /// Depth-first fill over 4-neighbors of the same color, with an explicit
    /// stack. Bounded by the cell count, so the stack never reallocates.
    fn flood_fill(&self, pool: &mut PuyoPool, x: i32, y: i32, staging: &mut ComboStaging) {
        let start = match self.piece_at(x, y) {
            Some(h) => h,
            None => return,
        };
        let color = pool.get(start).color;

        let mut stack: ArrayVec<(i32, i32), GRID_CELLS> = ArrayVec::new();
        pool.get_mut(start).checked = true;
        stack.push((x, y));

        while let Some((cx, cy)) = stack.pop() {
            let handle = self.piece_at(cx, cy).unwrap();
            staging.push(handle);

            for (nx, ny) in [(cx + 1, cy), (cx - 1, cy), (cx, cy + 1), (cx, cy - 1)] {
                if let Some(neighbor) = self.piece_at(nx, ny) {
                    let p = pool.get_mut(neighbor);
                    if p.color == color && !p.checked {
                        p.checked = true;
                        stack.push((nx, ny));
                    }
                }
            }
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PuyoColor;

    fn fill(
        grid: &mut Grid,
        pool: &mut PuyoPool,
        cells: &[(i32, i32, PuyoColor)],
    ) -> Vec<PuyoHandle> {
        cells
            .iter()
            .map(|&(x, y, color)| {
                let h = pool.alloc(color).unwrap();
                grid.add_piece(pool, h, x, y);
                h
            })
            .collect()
    }

    #[test]
    fn index_calculation() {
        assert_eq!(Grid::index(0, 0), Some(0));
        assert_eq!(Grid::index(5, 0), Some(5));
        assert_eq!(Grid::index(0, 1), Some(6));
        assert_eq!(Grid::index(5, 12), Some(77));
        assert_eq!(Grid::index(-1, 0), None);
        assert_eq!(Grid::index(6, 0), None);
        assert_eq!(Grid::index(0, 13), None);
    }

    #[test]
    fn add_piece_writes_position() {
        let mut pool = PuyoPool::new(4);
        let mut grid = Grid::new();
        let h = pool.alloc(PuyoColor::Red).unwrap();
        grid.add_piece(&mut pool, h, 2, 7);

        assert_eq!(grid.piece_at(2, 7), Some(h));
        assert_eq!(pool.get(h).grid_x(), 2);
        assert_eq!(pool.get(h).grid_y(), 7);
    }

    #[test]
    #[should_panic(expected = "occupied cell")]
    fn add_piece_into_occupied_cell_panics() {
        let mut pool = PuyoPool::new(4);
        let mut grid = Grid::new();
        let a = pool.alloc(PuyoColor::Red).unwrap();
        let b = pool.alloc(PuyoColor::Blue).unwrap();
        grid.add_piece(&mut pool, a, 0, 0);
        grid.add_piece(&mut pool, b, 0, 0);
    }

    #[test]
    fn combo_staging_is_compacted() {
        let mut pool = PuyoPool::new(16);
        let mut grid = Grid::new();

        // A 4-group of red along the floor and a 2-group of blue above it.
        let reds = fill(
            &mut grid,
            &mut pool,
            &[
                (0, 0, PuyoColor::Red),
                (1, 0, PuyoColor::Red),
                (2, 0, PuyoColor::Red),
                (3, 0, PuyoColor::Red),
            ],
        );
        fill(
            &mut grid,
            &mut pool,
            &[(0, 1, PuyoColor::Blue), (1, 1, PuyoColor::Blue)],
        );

        let mut staging = ComboStaging::new();
        let count = grid.find_combos(&mut pool, &mut staging);

        assert_eq!(count, 4);
        assert_eq!(staging.len(), 4, "sub-threshold group left in staging");
        for h in &staging[..count] {
            assert!(reds.contains(h));
        }
    }

    #[test]
    fn diagonal_adjacency_does_not_connect() {
        let mut pool = PuyoPool::new(16);
        let mut grid = Grid::new();
        fill(
            &mut grid,
            &mut pool,
            &[
                (0, 0, PuyoColor::Green),
                (1, 1, PuyoColor::Green),
                (2, 2, PuyoColor::Green),
                (3, 3, PuyoColor::Green),
            ],
        );

        let mut staging = ComboStaging::new();
        assert_eq!(grid.find_combos(&mut pool, &mut staging), 0);
        assert!(staging.is_empty());
    }

    #[test]
    fn find_combos_is_repeatable() {
        let mut pool = PuyoPool::new(16);
        let mut grid = Grid::new();
        fill(
            &mut grid,
            &mut pool,
            &[
                (0, 0, PuyoColor::Red),
                (0, 1, PuyoColor::Red),
                (0, 2, PuyoColor::Red),
                (0, 3, PuyoColor::Red),
            ],
        );

        let mut staging = ComboStaging::new();
        assert_eq!(grid.find_combos(&mut pool, &mut staging), 4);
        // Checked markers are reset on every call.
        assert_eq!(grid.find_combos(&mut pool, &mut staging), 4);
    }
}
