//! Unit module - the falling pair the player manipulates
//!
//! A unit is a pivot puyo plus an orbiting puyo held at one of the four
//! cardinal offsets. The pivot position and orientation are authoritative;
//! the orbiting position is a cache recomputed after every mutation, and
//! both logical positions are propagated into the pool's pieces so the
//! render layer sees them.
//!
//! The unit performs no grid validation. Whether a move or rotation is legal
//! is decided by the instance before it mutates the unit.

use crate::pool::{PuyoHandle, PuyoPool};
use crate::types::Orientation;

/// Index of the pivot puyo within a unit.
pub const PIVOT: usize = 0;
/// Index of the orbiting puyo within a unit.
pub const ORBIT: usize = 1;

/// A pivot/orbit pair of puyos with position and orientation state.
#[derive(Debug, Clone)]
pub struct Unit {
    puyos: [PuyoHandle; 2],
    orientation: Orientation,
    /// Cached positions of pivot and orbit, derived from pivot + orientation.
    positions: [(f32, f32); 2],
}

impl Unit {
    /// Build a unit over two allocated pieces, pivot first, oriented upward.
    pub fn new(pool: &mut PuyoPool, pivot: PuyoHandle, orbit: PuyoHandle) -> Self {
        let mut unit = Self {
            puyos: [pivot, orbit],
            orientation: Orientation::Up,
            positions: [(0.0, 0.0); 2],
        };
        unit.refresh(pool);
        unit
    }

    /// Handle of the piece at `index` ([`PIVOT`] or [`ORBIT`]).
    pub fn puyo(&self, index: usize) -> PuyoHandle {
        self.puyos[index]
    }

    /// Logical position of the piece at `index`.
    pub fn position(&self, index: usize) -> (f32, f32) {
        self.positions[index]
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Place the pivot at (x, y).
    pub fn set_position(&mut self, pool: &mut PuyoPool, x: f32, y: f32) {
        self.positions[PIVOT] = (x, y);
        self.refresh(pool);
    }

    /// Move the pivot by (dx, dy).
    pub fn translate(&mut self, pool: &mut PuyoPool, dx: f32, dy: f32) {
        self.positions[PIVOT].0 += dx;
        self.positions[PIVOT].1 += dy;
        self.refresh(pool);
    }

    /// Set the orientation directly (used after rotation resolution).
    pub fn set_rotation(&mut self, pool: &mut PuyoPool, orientation: Orientation) {
        self.orientation = orientation;
        self.refresh(pool);
    }

    /// Apply one 90° rotation step to the orientation.
    pub fn rotate(&mut self, pool: &mut PuyoPool, counter_clockwise: bool) {
        self.orientation = if counter_clockwise {
            self.orientation.rotated_ccw()
        } else {
            self.orientation.rotated_cw()
        };
        self.refresh(pool);
    }

    /// Swap in a fresh pair of pieces (queue slot refill). Resets the
    /// orientation to the spawn default.
    pub fn assign_puyos(&mut self, pool: &mut PuyoPool, pivot: PuyoHandle, orbit: PuyoHandle) {
        self.puyos = [pivot, orbit];
        self.orientation = Orientation::Up;
        self.refresh(pool);
    }

    /// Recompute the orbiting position and push both positions into the pool.
    fn refresh(&mut self, pool: &mut PuyoPool) {
        let (px, py) = self.positions[PIVOT];
        let (ox, oy) = self.orientation.offset();
        self.positions[ORBIT] = (px + ox as f32, py + oy as f32);

        for i in [PIVOT, ORBIT] {
            let p = pool.get_mut(self.puyos[i]);
            p.x = self.positions[i].0;
            p.y = self.positions[i].1;
        }
    }
}
