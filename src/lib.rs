//! Puyo duel (workspace facade crate).
//!
//! Re-exports the member crates under `puyo_duel::{core,engine,types}` so
//! downstream code and the workspace tests depend on a single package.

pub use puyo_duel_core as core;
pub use puyo_duel_engine as engine;
pub use puyo_duel_types as types;
