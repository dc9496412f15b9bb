//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (simulation core, input plumbing, terminal rendering).
//!
//! # Coordinate system
//!
//! The play field is `GRID_WIDTH` columns by `GRID_HEIGHT` rows. Column 0 is the
//! left edge, row 0 is the floor, and y grows *upward*. Falling motion is
//! therefore a negative vertical speed. Horizontal positions are always whole
//! cells; vertical positions are continuous (`f32`) while a piece is in flight
//! and are mapped to a discrete row with `floor(y)`.
//!
//! # Gameplay constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `GRID_WIDTH` | 6 | Play field columns |
//! | `GRID_HEIGHT` | 13 | Play field rows |
//! | `MIN_COMBO_SIZE` | 4 | Smallest connected group that clears |
//! | `USED_PUYO_COLORS` | 4 | Colors actually drawn for gameplay |
//! | `QUEUE_UNITS` | 4 | Unit slots in the dispense ring |
//! | `PUYO_POOL_CAPACITY` | 256 | Shared pool size for a two-player session |
//! | `SPAWN_X`, `SPAWN_Y` | 4, 11.0 | Active unit spawn cell |
//! | `FALL_SPEED` | -1.5 | Player-control descent, cells per second |
//! | `FAST_FALL_SPEED` | -4.0 | Held-fall and resolution descent |

/// Play field width in cells (6 columns).
pub const GRID_WIDTH: i32 = 6;

/// Play field height in cells (13 rows, row 0 at the bottom).
pub const GRID_HEIGHT: i32 = 13;

/// Total number of cells on one play field.
pub const GRID_CELLS: usize = (GRID_WIDTH * GRID_HEIGHT) as usize;

/// Smallest 4-connected same-color group that counts as a combo.
pub const MIN_COMBO_SIZE: usize = 4;

/// Number of palette entries actually used when rolling random colors.
pub const USED_PUYO_COLORS: u32 = 4;

/// Number of unit slots in the dispense queue.
pub const QUEUE_UNITS: usize = 4;

/// Capacity of the shared puyo pool.
///
/// Sized to comfortably exceed the maximum number of simultaneously live
/// pieces in a two-player session (two full grids plus queues and the
/// active units).
pub const PUYO_POOL_CAPACITY: usize = 256;

/// Spawn column for a freshly dispensed unit's pivot.
pub const SPAWN_X: i32 = 4;

/// Spawn row (continuous) for a freshly dispensed unit's pivot.
pub const SPAWN_Y: f32 = 11.0;

/// Descent speed under player control, in cells per second (y grows upward).
pub const FALL_SPEED: f32 = -1.5;

/// Descent speed while the fall intent is held, and for resolving pieces.
pub const FAST_FALL_SPEED: f32 = -4.0;

/// Vertical display spacing between queued units.
pub const QUEUE_SLOT_SPACING: f32 = 1.5;

/// Puyo palette.
///
/// Gameplay rolls colors from the first [`USED_PUYO_COLORS`] variants;
/// `Purple` and `Clear` exist for palette completeness and future garbage
/// pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PuyoColor {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Clear,
}

impl PuyoColor {
    /// All palette entries, in index order.
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Purple,
        Self::Clear,
    ];

    /// Palette entry by index; panics if out of range.
    pub fn from_index(index: u32) -> Self {
        Self::ALL[index as usize]
    }

    /// Lowercase name, for debug output and tests.
    pub fn as_str(&self) -> &'static str {
        match self {
            PuyoColor::Red => "red",
            PuyoColor::Green => "green",
            PuyoColor::Blue => "blue",
            PuyoColor::Yellow => "yellow",
            PuyoColor::Purple => "purple",
            PuyoColor::Clear => "clear",
        }
    }
}

/// Orientation of a unit's orbiting puyo relative to its pivot.
///
/// Always one of the four cardinal offsets; the rotation cycle goes
/// Up → Right → Down → Left → Up for clockwise steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Up,
    Right,
    Down,
    Left,
}

impl Orientation {
    /// Cell offset of the orbiting puyo from the pivot.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Orientation::Up => (0, 1),
            Orientation::Right => (1, 0),
            Orientation::Down => (0, -1),
            Orientation::Left => (-1, 0),
        }
    }

    /// Orientation for a given cardinal offset.
    pub fn from_offset(offset: (i32, i32)) -> Option<Self> {
        match offset {
            (0, 1) => Some(Orientation::Up),
            (1, 0) => Some(Orientation::Right),
            (0, -1) => Some(Orientation::Down),
            (-1, 0) => Some(Orientation::Left),
            _ => None,
        }
    }

    /// Rotate clockwise (90°): (x, y) → (y, −x).
    pub fn rotated_cw(&self) -> Self {
        match self {
            Orientation::Up => Orientation::Right,
            Orientation::Right => Orientation::Down,
            Orientation::Down => Orientation::Left,
            Orientation::Left => Orientation::Up,
        }
    }

    /// Rotate counter-clockwise (90°): (x, y) → (−y, x).
    pub fn rotated_ccw(&self) -> Self {
        match self {
            Orientation::Up => Orientation::Left,
            Orientation::Left => Orientation::Down,
            Orientation::Down => Orientation::Right,
            Orientation::Right => Orientation::Up,
        }
    }
}

/// One tick's worth of player input, sampled exactly once per update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PuyoIntents {
    /// Move the active unit one column left.
    pub move_left: bool,
    /// Move the active unit one column right.
    pub move_right: bool,
    /// Rotate the active unit clockwise.
    pub flip: bool,
    /// Descend at the fast fall speed.
    pub fall: bool,
    /// Toggle the paused state (edge-triggered by the controller).
    pub pause: bool,
}

/// Input source for one player's instance.
///
/// Implementations own press/hold semantics: the four movement queries report
/// *held* state, while `pause` must be edge-triggered (true once per press).
/// The simulation polls through [`PuyoController::sample`] once at the start
/// of each tick and never re-samples mid-tick.
pub trait PuyoController {
    fn move_left(&self) -> bool;
    fn move_right(&self) -> bool;
    fn flip(&self) -> bool;
    fn fall(&self) -> bool;

    fn pause(&self) -> bool {
        false
    }

    fn sample(&self) -> PuyoIntents {
        PuyoIntents {
            move_left: self.move_left(),
            move_right: self.move_right(),
            flip: self.flip(),
            fall: self.fall(),
            pause: self.pause(),
        }
    }
}

/// Controller that never reports input. Useful for idle instances and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullController;

impl PuyoController for NullController {
    fn move_left(&self) -> bool {
        false
    }

    fn move_right(&self) -> bool {
        false
    }

    fn flip(&self) -> bool {
        false
    }

    fn fall(&self) -> bool {
        false
    }
}
