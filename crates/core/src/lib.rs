//! Core simulation for the falling-pair puzzle game.
//!
//! Everything in here is deterministic and free of I/O: pieces live in an
//! arena [`pool`], each play field is an [`instance`] combining a [`grid`],
//! a [`queue`] and an [`rng`], and input arrives through the controller
//! trait from the shared types crate. The binary wires instances to real
//! input and a terminal renderer; tests drive them with scripted
//! controllers.

pub mod grid;
pub mod instance;
pub mod pool;
pub mod queue;
pub mod rng;
pub mod unit;

pub use tui_puyo_types as types;

pub use grid::{ComboStaging, Grid};
pub use instance::{Instance, InstanceState, SimConfig, TickOutcome};
pub use pool::{PoolError, Puyo, PuyoHandle, PuyoPool};
pub use queue::UnitQueue;
pub use rng::SimpleRng;
pub use unit::{Unit, ORBIT, PIVOT};
