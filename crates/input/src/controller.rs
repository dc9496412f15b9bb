//! Keyboard-backed controller for terminal environments.
//!
//! Terminals generally emit key repeats but no release events, so a "held"
//! key is emulated: every press stamps the action with the current time, and
//! the action reads as held until a timeout expires without a repeat. Flip
//! and pause are one-shot instead; holding the rotate key should not spin
//! the unit every frame.

use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;

use crate::map::{KeyBindings, PuyoAction};
use crate::types::PuyoController;

// Repeats arrive well within this window on common terminals; a single tap
// must not read as a sustained hold.
const DEFAULT_HOLD_TIMEOUT_MS: u64 = 150;

/// Maps key events for one player into the controller queries the
/// simulation samples each tick.
#[derive(Debug, Clone)]
pub struct KeyboardController {
    bindings: KeyBindings,
    hold_timeout: Duration,
    left_pressed: Option<Instant>,
    right_pressed: Option<Instant>,
    fall_pressed: Option<Instant>,
    flip_pending: bool,
    pause_pending: bool,
}

impl KeyboardController {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            hold_timeout: Duration::from_millis(DEFAULT_HOLD_TIMEOUT_MS),
            left_pressed: None,
            right_pressed: None,
            fall_pressed: None,
            flip_pending: false,
            pause_pending: false,
        }
    }

    pub fn with_hold_timeout(mut self, timeout: Duration) -> Self {
        self.hold_timeout = timeout;
        self
    }

    /// Feed one key event. Events for other layouts are ignored, so every
    /// controller in a session can see the full event stream.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.bindings.action(key) {
            Some(PuyoAction::MoveLeft) => self.left_pressed = Some(Instant::now()),
            Some(PuyoAction::MoveRight) => self.right_pressed = Some(Instant::now()),
            Some(PuyoAction::Fall) => self.fall_pressed = Some(Instant::now()),
            Some(PuyoAction::Flip) => self.flip_pending = true,
            Some(PuyoAction::Pause) => self.pause_pending = true,
            None => {}
        }
    }

    /// Feed one key release, on terminals that deliver them. Clears the
    /// hold immediately instead of waiting out the timeout.
    pub fn handle_release(&mut self, key: KeyEvent) {
        match self.bindings.action(key) {
            Some(PuyoAction::MoveLeft) => self.left_pressed = None,
            Some(PuyoAction::MoveRight) => self.right_pressed = None,
            Some(PuyoAction::Fall) => self.fall_pressed = None,
            _ => {}
        }
    }

    /// Drop one-shot requests after the simulation has sampled this frame.
    pub fn end_frame(&mut self) {
        self.flip_pending = false;
        self.pause_pending = false;
    }

    fn is_held(&self, pressed: Option<Instant>) -> bool {
        match pressed {
            Some(at) => at.elapsed() <= self.hold_timeout,
            None => false,
        }
    }
}

impl PuyoController for KeyboardController {
    fn move_left(&self) -> bool {
        self.is_held(self.left_pressed)
    }

    fn move_right(&self) -> bool {
        self.is_held(self.right_pressed)
    }

    fn flip(&self) -> bool {
        self.flip_pending
    }

    fn fall(&self) -> bool {
        self.is_held(self.fall_pressed)
    }

    fn pause(&self) -> bool {
        self.pause_pending
    }
}
