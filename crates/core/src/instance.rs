//! Instance module - one player's play field state machine
//!
//! Ties together the grid, queue, RNG, active unit, and the set of pieces
//! currently mid-fall, and drives the player-control / resolve / paused /
//! game-over states once per frame.
//!
//! The driving loop calls [`Instance::update`] with the frame delta. Input is
//! sampled from the controller exactly once at the start of the tick and the
//! whole tick runs synchronously on the caller's thread. The shared piece
//! pool is an explicit `&mut` context argument rather than ambient state, so
//! two instances in one session simply take turns against the same pool.

use arrayvec::ArrayVec;

use crate::grid::{ComboStaging, Grid};
use crate::pool::{PoolError, PuyoHandle, PuyoPool};
use crate::queue::UnitQueue;
use crate::rng::SimpleRng;
use crate::types::{
    PuyoController, PuyoIntents, FALL_SPEED, FAST_FALL_SPEED, GRID_CELLS, GRID_HEIGHT, GRID_WIDTH,
    SPAWN_X, SPAWN_Y,
};
use crate::unit::{ORBIT, PIVOT};

/// Play-field state. The instance starts in `Resolving` with nothing falling,
/// so the very first update dispenses a unit and hands control to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    PlayerControl,
    Resolving,
    GameOver,
    Paused,
}

/// Tunable simulation parameters.
///
/// Defaults come from the shared constants; tests override the speeds to
/// compress or stretch the fall without touching globals.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Descent speed under player control, cells per second (negative).
    pub fall_speed: f32,
    /// Descent speed with the fall intent held, and during resolution.
    pub fast_fall_speed: f32,
    /// Spawn column for a dispensed unit's pivot.
    pub spawn_x: i32,
    /// Spawn row (continuous) for a dispensed unit's pivot.
    pub spawn_y: f32,
    /// Display anchor for the queue, in local cells.
    pub queue_origin: (f32, f32),
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fall_speed: FALL_SPEED,
            fast_fall_speed: FAST_FALL_SPEED,
            spawn_x: SPAWN_X,
            spawn_y: SPAWN_Y,
            queue_origin: (GRID_WIDTH as f32 + 1.5, GRID_HEIGHT as f32 - 1.0),
        }
    }
}

/// What one tick produced.
///
/// `pieces_cleared` is the combo yield of this tick; a session can forward
/// it to a rival instance as garbage (the mechanic itself lives outside the
/// core).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// False once the instance has reached game over.
    pub running: bool,
    /// Pieces removed by combo resolution during this tick.
    pub pieces_cleared: u32,
}

/// One player's play field: grid, queue, active unit, and falling pieces.
#[derive(Debug, Clone)]
pub struct Instance {
    grid: Grid,
    queue: UnitQueue,
    rng: SimpleRng,
    /// Slot index of the active unit inside queue storage, if any.
    active: Option<usize>,
    /// Pieces descending independently, disjoint from grid occupancy.
    falling: ArrayVec<PuyoHandle, GRID_CELLS>,
    /// Scratch buffer reused by every combo check.
    combo_staging: ComboStaging,
    state: InstanceState,
    config: SimConfig,
}

impl Instance {
    /// Build a play field with its own seeded RNG against the shared pool.
    pub fn new(pool: &mut PuyoPool, seed: u32, config: SimConfig) -> Result<Self, PoolError> {
        let mut rng = SimpleRng::new(seed);
        let queue = UnitQueue::new(pool, &mut rng, config.queue_origin)?;
        Ok(Self {
            grid: Grid::new(),
            queue,
            rng,
            active: None,
            falling: ArrayVec::new(),
            combo_staging: ComboStaging::new(),
            state: InstanceState::Resolving,
            config,
        })
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access, for scenario setup and session teardown.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn queue(&self) -> &UnitQueue {
        &self.queue
    }

    /// The unit currently under player control, if any.
    pub fn active_unit(&self) -> Option<&crate::unit::Unit> {
        self.active.map(|slot| self.queue.unit(slot))
    }

    /// Number of pieces currently mid-fall.
    pub fn falling_count(&self) -> usize {
        self.falling.len()
    }

    /// Handles of the pieces currently mid-fall, for rendering.
    pub fn falling_pieces(&self) -> &[PuyoHandle] {
        &self.falling
    }

    /// Force the terminal state. External extension point; the core itself
    /// only enters game over on a blocked spawn or an overfilled column.
    pub fn trigger_game_over(&mut self) {
        self.state = InstanceState::GameOver;
        self.active = None;
    }

    /// Advance the simulation by `dt` seconds.
    pub fn update(
        &mut self,
        pool: &mut PuyoPool,
        controller: &dyn PuyoController,
        dt: f32,
    ) -> Result<TickOutcome, PoolError> {
        let intents = controller.sample();

        match self.state {
            InstanceState::GameOver => Ok(TickOutcome {
                running: false,
                pieces_cleared: 0,
            }),
            InstanceState::Paused => {
                if intents.pause {
                    self.state = InstanceState::PlayerControl;
                }
                Ok(TickOutcome {
                    running: true,
                    pieces_cleared: 0,
                })
            }
            InstanceState::PlayerControl => {
                if intents.pause {
                    self.state = InstanceState::Paused;
                } else {
                    self.player_control(pool, intents, dt);
                }
                Ok(TickOutcome {
                    running: true,
                    pieces_cleared: 0,
                })
            }
            InstanceState::Resolving => self.resolve(pool, dt),
        }
    }

    // ------------------------------------------------------------------
    // Player control
    // ------------------------------------------------------------------

    fn player_control(&mut self, pool: &mut PuyoPool, intents: PuyoIntents, dt: f32) {
        let slot = self
            .active
            .expect("player control state without an active unit");

        if intents.flip {
            self.try_rotation(pool, slot);
        }

        // Left wins when both are held.
        let want_dx = if intents.move_left {
            -1
        } else if intents.move_right {
            1
        } else {
            0
        };
        let dx = if want_dx != 0 && self.check_valid_move(slot, want_dx) {
            want_dx
        } else {
            0
        };

        let speed = if intents.fall {
            self.config.fast_fall_speed
        } else {
            self.config.fall_speed
        };
        let dy = speed * dt;

        self.queue.unit_mut(slot).translate(pool, dx as f32, dy);

        self.check_contact(pool, slot);
    }

    /// True if both unit cells can occupy the column shifted by `dx`.
    fn check_valid_move(&self, slot: usize, dx: i32) -> bool {
        let unit = self.queue.unit(slot);
        for i in [PIVOT, ORBIT] {
            let (x, y) = unit.position(i);
            if !self.check_valid_space(x as i32 + dx, y) {
                return false;
            }
        }
        true
    }

    /// Open-space test at a continuous height, mapping y to a row via floor.
    fn check_valid_space(&self, x: i32, y: f32) -> bool {
        self.grid.is_open(x, y.floor() as i32)
    }

    /// Attempt a clockwise rotation, with a one-cell kick fallback.
    ///
    /// Tries successive 90° candidates; for each, rotating in place is
    /// preferred, then a translation of one cell opposite the candidate's
    /// offset (so a unit pressed against a wall kicks away from it). If no
    /// candidate fits the request is dropped without effect.
    fn try_rotation(&mut self, pool: &mut PuyoPool, slot: usize) {
        let (px, py) = self.queue.unit(slot).position(PIVOT);
        let gx = px as i32;
        let gy = py.floor() as i32;

        let mut candidate = self.queue.unit(slot).orientation();
        for _ in 0..3 {
            candidate = candidate.rotated_cw();
            let (ox, oy) = candidate.offset();

            if self.grid.is_open(gx + ox, gy + oy) {
                self.queue.unit_mut(slot).set_rotation(pool, candidate);
                return;
            }

            // Kick: shift the pivot one cell away from the blocked side. The
            // orbit then lands on the pivot's old cell, which the unit itself
            // occupies, so only the kicked pivot cell needs checking.
            if self.grid.is_open(gx - ox, gy - oy) {
                let unit = self.queue.unit_mut(slot);
                unit.translate(pool, -ox as f32, -oy as f32);
                unit.set_rotation(pool, candidate);
                return;
            }
        }
    }

    /// Detect contact below either unit cell and hand the pieces over to the
    /// grid and falling set.
    fn check_contact(&mut self, pool: &mut PuyoPool, slot: usize) {
        let unit = self.queue.unit(slot);
        let cells: [(PuyoHandle, f32, f32); 2] = [
            (unit.puyo(PIVOT), unit.position(PIVOT).0, unit.position(PIVOT).1),
            (unit.puyo(ORBIT), unit.position(ORBIT).0, unit.position(ORBIT).1),
        ];

        let contact = [
            !self.check_valid_space(cells[0].1 as i32, cells[0].2),
            !self.check_valid_space(cells[1].1 as i32, cells[1].2),
        ];
        if !contact[0] && !contact[1] {
            return;
        }

        // The unit dissolves: its pieces now belong to the grid or fall on.
        self.active = None;
        self.state = InstanceState::Resolving;

        for i in 0..2 {
            if contact[i] {
                let (h, x, y) = cells[i];
                self.settle_piece(pool, h, x as i32, y.floor() as i32 + 1);
            }
        }
        for i in 0..2 {
            if !contact[i] {
                let (h, x, y) = cells[i];
                // The partner's landing may have closed this cell too.
                if !self.check_valid_space(x as i32, y) {
                    self.settle_piece(pool, h, x as i32, y.floor() as i32 + 1);
                } else {
                    self.falling.push(h);
                }
            }
        }
    }

    /// Commit a piece at the lowest open row at or above `row`, searching
    /// upward past occupied cells. Running off the top of the column means
    /// the field is full there: the piece is freed and the game ends.
    fn settle_piece(&mut self, pool: &mut PuyoPool, handle: PuyoHandle, x: i32, mut row: i32) {
        while row < GRID_HEIGHT && !self.grid.is_open(x, row) {
            row += 1;
        }
        if row >= GRID_HEIGHT {
            pool.free(handle);
            self.trigger_game_over();
            return;
        }
        self.grid.add_piece(pool, handle, x, row);
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    fn resolve(&mut self, pool: &mut PuyoPool, dt: f32) -> Result<TickOutcome, PoolError> {
        self.advance_falling(pool, dt);
        if self.state == InstanceState::GameOver {
            return Ok(TickOutcome {
                running: false,
                pieces_cleared: 0,
            });
        }
        if !self.falling.is_empty() {
            return Ok(TickOutcome {
                running: true,
                pieces_cleared: 0,
            });
        }

        let count = self.grid.find_combos(pool, &mut self.combo_staging);
        if count > 0 {
            self.remove_combo_puyos(pool, count);
            self.release_floating(pool);
            return Ok(TickOutcome {
                running: true,
                pieces_cleared: count as u32,
            });
        }

        self.dispense_next(pool)?;
        Ok(TickOutcome {
            running: self.state != InstanceState::GameOver,
            pieces_cleared: 0,
        })
    }

    /// Advance every falling piece by gravity, snapping landed pieces into
    /// the grid at the lowest open row at or above the collision point.
    fn advance_falling(&mut self, pool: &mut PuyoPool, dt: f32) {
        let step = self.config.fast_fall_speed * dt;

        let mut i = 0;
        while i < self.falling.len() {
            let handle = self.falling[i];
            let (x, y) = {
                let p = pool.get(handle);
                (p.grid_x(), p.y)
            };
            let ny = y + step;

            if self.grid.is_open(x, ny.floor() as i32) {
                pool.get_mut(handle).y = ny;
                i += 1;
                continue;
            }

            self.falling.swap_remove(i);
            self.settle_piece(pool, handle, x, ny.floor() as i32 + 1);
            if self.state == InstanceState::GameOver {
                return;
            }
        }
    }

    /// Free every staged combo piece and clear its grid cell.
    fn remove_combo_puyos(&mut self, pool: &mut PuyoPool, count: usize) {
        for i in 0..count {
            let handle = self.combo_staging[i];
            let (x, y) = {
                let p = pool.get(handle);
                (p.grid_x(), p.grid_y())
            };
            let removed = self.grid.remove_piece(x, y);
            debug_assert_eq!(removed, Some(handle));
            pool.free(handle);
        }
        self.combo_staging.clear();
    }

    /// Move every piece with an empty cell below it back into the falling
    /// set. Scanning each column bottom-to-top (row 0 can never float) also
    /// releases whole stacks above a gap in one pass.
    fn release_floating(&mut self, pool: &mut PuyoPool) {
        for x in 0..GRID_WIDTH {
            for y in 1..GRID_HEIGHT {
                let handle = match self.grid.piece_at(x, y) {
                    Some(h) => h,
                    None => continue,
                };
                if self.grid.is_open(x, y - 1) {
                    self.grid.remove_piece(x, y);
                    // Keep the continuous position where the cell was.
                    let p = pool.get_mut(handle);
                    p.x = x as f32;
                    p.y = y as f32;
                    self.falling.push(handle);
                }
            }
        }
    }

    /// Pull the next unit from the queue and spawn it, or end the game if
    /// the spawn cells are blocked.
    fn dispense_next(&mut self, pool: &mut PuyoPool) -> Result<(), PoolError> {
        let slot = self.queue.next_unit(pool, &mut self.rng)?;
        let unit = self.queue.unit_mut(slot);
        unit.set_position(pool, self.config.spawn_x as f32, self.config.spawn_y);

        let blocked = [PIVOT, ORBIT].into_iter().any(|i| {
            let (x, y) = unit.position(i);
            !self.grid.is_open(x as i32, y.floor() as i32)
        });
        if blocked {
            self.trigger_game_over();
            return Ok(());
        }

        self.active = Some(slot);
        self.state = InstanceState::PlayerControl;
        Ok(())
    }
}
