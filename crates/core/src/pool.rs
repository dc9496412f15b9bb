//! Puyo pool - fixed-capacity arena with generational handles
//!
//! Every live puyo in a session lives in one pool, shared by both player
//! instances. The grid, queue, and falling sets hold [`PuyoHandle`]s rather
//! than references; a handle going stale after a free is detectable, so the
//! "which collection owns this piece" invariant is checkable at runtime.

use thiserror::Error;

use crate::types::PuyoColor;

/// Handle into a [`PuyoPool`].
///
/// The generation counter lets the pool reject handles to slots that have
/// been freed and reallocated since the handle was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PuyoHandle {
    index: u32,
    generation: u32,
}

/// A single piece. Owned by the pool; referenced everywhere else by handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Puyo {
    pub color: PuyoColor,
    /// Transient marker used only during flood-fill combo detection.
    pub checked: bool,
    /// Logical x position, in grid cells. Always a whole column.
    pub x: f32,
    /// Logical y position, in grid cells. Continuous while falling.
    pub y: f32,
}

impl Puyo {
    fn new(color: PuyoColor) -> Self {
        Self {
            color,
            checked: false,
            x: 0.0,
            y: 0.0,
        }
    }

    /// Discrete column, for grid lookups.
    pub fn grid_x(&self) -> i32 {
        self.x as i32
    }

    /// Discrete row via floor, mapping continuous fall position to a cell.
    pub fn grid_y(&self) -> i32 {
        self.y.floor() as i32
    }
}

/// Allocation failure: the pool has no free slots left.
///
/// The pool is sized to exceed the maximum possible number of live pieces,
/// so hitting this during play means the session is misconfigured; callers
/// propagate it rather than dereferencing a missing piece.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("puyo pool exhausted (capacity {capacity})")]
    Exhausted { capacity: usize },
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    puyo: Option<Puyo>,
}

/// Fixed-capacity puyo arena.
#[derive(Debug, Clone)]
pub struct PuyoPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl PuyoPool {
    /// Create a pool with the given number of slots. Capacity never grows.
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                puyo: None,
            })
            .collect();
        // Pop order is irrelevant; reverse keeps low indices first for tests.
        let free = (0..capacity as u32).rev().collect();
        Self { slots, free }
    }

    /// Allocate a piece with the given color at position (0, 0).
    pub fn alloc(&mut self, color: PuyoColor) -> Result<PuyoHandle, PoolError> {
        let index = self.free.pop().ok_or(PoolError::Exhausted {
            capacity: self.slots.len(),
        })?;
        let slot = &mut self.slots[index as usize];
        slot.puyo = Some(Puyo::new(color));
        Ok(PuyoHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Return a piece to the pool. The handle (and any copies) become stale.
    ///
    /// Panics if the handle is already stale - freeing through a dangling
    /// handle means some collection kept a piece it no longer owned.
    pub fn free(&mut self, handle: PuyoHandle) {
        let slot = &mut self.slots[handle.index as usize];
        assert_eq!(
            slot.generation, handle.generation,
            "freeing stale puyo handle {:?}",
            handle
        );
        assert!(slot.puyo.is_some(), "double free of puyo handle {:?}", handle);
        slot.puyo = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
    }

    /// Borrow a live piece. Panics on a stale handle.
    pub fn get(&self, handle: PuyoHandle) -> &Puyo {
        self.try_get(handle)
            .unwrap_or_else(|| panic!("stale puyo handle {:?}", handle))
    }

    /// Mutably borrow a live piece. Panics on a stale handle.
    pub fn get_mut(&mut self, handle: PuyoHandle) -> &mut Puyo {
        let slot = &mut self.slots[handle.index as usize];
        if slot.generation != handle.generation {
            panic!("stale puyo handle {:?}", handle);
        }
        slot.puyo
            .as_mut()
            .unwrap_or_else(|| panic!("stale puyo handle {:?}", handle))
    }

    /// Borrow a piece if the handle is still valid.
    pub fn try_get(&self, handle: PuyoHandle) -> Option<&Puyo> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.puyo.as_ref()
    }

    /// True if the handle still refers to a live piece.
    pub fn contains(&self, handle: PuyoHandle) -> bool {
        self.try_get(handle).is_some()
    }

    /// Number of live pieces.
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Total slot count.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over all live pieces with their handles.
    ///
    /// This is the "active pieces" collection the render pass walks; the
    /// simulation itself never iterates the pool.
    pub fn iter(&self) -> impl Iterator<Item = (PuyoHandle, &Puyo)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.puyo.as_ref().map(|p| {
                (
                    PuyoHandle {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    p,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_get_roundtrip() {
        let mut pool = PuyoPool::new(4);
        let h = pool.alloc(PuyoColor::Green).unwrap();
        assert_eq!(pool.get(h).color, PuyoColor::Green);
        assert_eq!(pool.live(), 1);
    }

    #[test]
    fn exhaustion_is_a_distinguishable_error() {
        let mut pool = PuyoPool::new(2);
        pool.alloc(PuyoColor::Red).unwrap();
        pool.alloc(PuyoColor::Red).unwrap();
        assert_eq!(
            pool.alloc(PuyoColor::Red),
            Err(PoolError::Exhausted { capacity: 2 })
        );
    }

    #[test]
    fn freed_handle_goes_stale() {
        let mut pool = PuyoPool::new(2);
        let h = pool.alloc(PuyoColor::Blue).unwrap();
        pool.free(h);
        assert!(!pool.contains(h));
        assert!(pool.try_get(h).is_none());

        // The slot can be reused, but the old handle stays stale.
        let h2 = pool.alloc(PuyoColor::Yellow).unwrap();
        let _ = pool.try_get(h2).unwrap();
        assert!(!pool.contains(h));
    }

    #[test]
    #[should_panic(expected = "stale puyo handle")]
    fn get_on_stale_handle_panics() {
        let mut pool = PuyoPool::new(1);
        let h = pool.alloc(PuyoColor::Red).unwrap();
        pool.free(h);
        let _ = pool.get(h);
    }

    #[test]
    fn iter_visits_exactly_the_live_pieces() {
        let mut pool = PuyoPool::new(8);
        let a = pool.alloc(PuyoColor::Red).unwrap();
        let b = pool.alloc(PuyoColor::Green).unwrap();
        let c = pool.alloc(PuyoColor::Blue).unwrap();
        pool.free(b);

        let live: Vec<PuyoHandle> = pool.iter().map(|(h, _)| h).collect();
        assert_eq!(live.len(), 2);
        assert!(live.contains(&a));
        assert!(live.contains(&c));
    }

    #[test]
    fn grid_row_mapping_uses_floor() {
        let mut pool = PuyoPool::new(1);
        let h = pool.alloc(PuyoColor::Red).unwrap();
        let p = pool.get_mut(h);
        p.x = 3.0;
        p.y = 4.7;
        assert_eq!(p.grid_x(), 3);
        assert_eq!(p.grid_y(), 4);
        p.y = -0.3;
        assert_eq!(p.grid_y(), -1);
    }
}
