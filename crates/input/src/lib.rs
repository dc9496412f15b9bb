//! Terminal input module (simulation-facing).
//!
//! This module is intentionally independent of any UI framework. It maps
//! `crossterm` key events into per-player actions and provides a controller
//! implementation suitable for terminal environments (including terminals
//! without key-release events).

pub mod controller;
pub mod map;

pub use tui_puyo_types as types;

pub use controller::KeyboardController;
pub use map::{should_quit, KeyBindings, PuyoAction};
