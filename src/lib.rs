//! TUI Puyo (workspace facade crate).
//!
//! This package keeps the `tui_puyo::{core,term,input,types}` public API in
//! one place while the implementation lives in dedicated crates under
//! `crates/`.

pub use tui_puyo_core as core;
pub use tui_puyo_input as input;
pub use tui_puyo_term as term;
pub use tui_puyo_types as types;
