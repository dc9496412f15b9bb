//! Queue module - ring of pre-built units waiting to be dispensed
//!
//! A fixed ring of [`QUEUE_UNITS`] unit slots with a head index. Dispensing
//! returns the head slot (as an index into queue storage, so the caller can
//! keep a non-owning reference to the active unit) and refills the ring one
//! step behind, so the queue always shows `QUEUE_UNITS - 1` fully built
//! future units and never an uninitialized slot.

use crate::pool::{PoolError, PuyoPool};
use crate::rng::SimpleRng;
use crate::types::{QUEUE_SLOT_SPACING, QUEUE_UNITS};
use crate::unit::Unit;

/// The dispense ring beside one play field.
#[derive(Debug, Clone)]
pub struct UnitQueue {
    units: Vec<Unit>,
    head: usize,
    /// Per slot: true while the slot's pieces are out with the player.
    /// A dispensed pair migrates into the grid or falling set, so refilling
    /// such a slot must not free it; an undispensed pair is still ours and
    /// is freed on overwrite.
    dispensed: [bool; QUEUE_UNITS],
    /// Display anchor of the head slot, in the instance's local cells.
    origin: (f32, f32),
}

impl UnitQueue {
    /// Build the ring with two freshly rolled pieces per slot.
    pub fn new(
        pool: &mut PuyoPool,
        rng: &mut SimpleRng,
        origin: (f32, f32),
    ) -> Result<Self, PoolError> {
        let mut units = Vec::with_capacity(QUEUE_UNITS);
        for _ in 0..QUEUE_UNITS {
            let pivot = pool.alloc(rng.random_color())?;
            let orbit = pool.alloc(rng.random_color())?;
            units.push(Unit::new(pool, pivot, orbit));
        }

        let mut queue = Self {
            units,
            head: 0,
            dispensed: [false; QUEUE_UNITS],
            origin,
        };
        queue.layout(pool);
        Ok(queue)
    }

    /// Dispense the head unit, returning its slot index.
    ///
    /// Before the head advances, the slot one step behind it is restocked
    /// with two fresh pieces; that is the slot dispensed on the previous
    /// call, whose pieces have long since left for the grid. Display
    /// positions of the remaining queued units are recomputed afterwards.
    pub fn next_unit(&mut self, pool: &mut PuyoPool, rng: &mut SimpleRng) -> Result<usize, PoolError> {
        let tail = (self.head + QUEUE_UNITS - 1) % QUEUE_UNITS;
        self.refill_slot(pool, rng, tail)?;

        let dispensed = self.head;
        self.dispensed[dispensed] = true;
        self.head = (self.head + 1) % QUEUE_UNITS;
        self.layout(pool);
        Ok(dispensed)
    }

    fn refill_slot(
        &mut self,
        pool: &mut PuyoPool,
        rng: &mut SimpleRng,
        slot: usize,
    ) -> Result<(), PoolError> {
        if !self.dispensed[slot] {
            // Still queue-owned: release the outgoing pair before replacing it.
            pool.free(self.units[slot].puyo(0));
            pool.free(self.units[slot].puyo(1));
        }

        let pivot = pool.alloc(rng.random_color())?;
        let orbit = pool.alloc(rng.random_color())?;
        self.units[slot].assign_puyos(pool, pivot, orbit);
        self.dispensed[slot] = false;
        Ok(())
    }

    /// Reposition queued slots along the display axis, nearest-to-dispense
    /// first. The slot currently out with the player is left alone.
    fn layout(&mut self, pool: &mut PuyoPool) {
        for step in 0..QUEUE_UNITS {
            let slot = (self.head + step) % QUEUE_UNITS;
            if self.dispensed[slot] {
                continue;
            }
            let y = self.origin.1 - step as f32 * QUEUE_SLOT_SPACING;
            self.units[slot].set_position(pool, self.origin.0, y);
        }
    }

    pub fn unit(&self, slot: usize) -> &Unit {
        &self.units[slot]
    }

    pub fn unit_mut(&mut self, slot: usize) -> &mut Unit {
        &mut self.units[slot]
    }

    pub fn head(&self) -> usize {
        self.head
    }

    /// Queued units in dispense order, excluding any slot out with the player.
    pub fn future_units(&self) -> impl Iterator<Item = &Unit> {
        (0..QUEUE_UNITS).filter_map(move |step| {
            let slot = (self.head + step) % QUEUE_UNITS;
            if self.dispensed[slot] {
                None
            } else {
                Some(&self.units[slot])
            }
        })
    }
}
