//! RNG module - deterministic color rolls
//!
//! A simple LCG keeps piece colors reproducible: two instances created with
//! the same seed dispense identical color sequences, which is what the
//! scenario tests rely on.

use crate::types::{PuyoColor, USED_PUYO_COLORS};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Roll a gameplay color from the used portion of the palette.
    pub fn random_color(&mut self) -> PuyoColor {
        PuyoColor::from_index(self.next_range(USED_PUYO_COLORS))
    }
}
