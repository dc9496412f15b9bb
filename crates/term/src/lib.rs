//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for terminal play. It renders into
//! a simple framebuffer that a terminal backend flushes, which keeps the
//! simulation crate free of I/O and lets the view be unit-tested.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tui_puyo_core as core;
pub use tui_puyo_types as types;

pub use fb::{Cell, FrameBuffer, Rgb};
pub use game_view::{GameView, Viewport};
pub use renderer::TerminalRenderer;
