//! Core game rules - pure, deterministic, and testable
//!
//! This crate contains the board, the chain engine, scoring, the falling pair
//! and the garbage ledger. It has no notion of time and no dependencies on
//! rendering, input or I/O, which makes it:
//!
//! - **Deterministic**: the same seed produces the same pairs and garbage scatter
//! - **Testable**: every rule can be exercised on a hand-built field
//! - **Shareable**: the only shared object, [`GarbageGroup`], locks itself
//!
//! # Module Structure
//!
//! - [`field`]: 6x13 grid with touched flags and column gravity
//! - [`chain`]: connected groups, cascade steps and full cascades
//! - [`scoring`]: the per-step score formula
//! - [`pair`]: the falling pair, collision and rotation kicks
//! - [`rng`]: seeded LCG and the pair queue
//! - [`garbage`]: deliveries, the per-board ledger and materialization
//!
//! # Example
//!
//! ```
//! use puyo_duel_core::{chain, Field};
//!
//! let mut field = Field::from_rows(&[
//!     ".RG...",
//!     ".RG...",
//!     "RGBB..",
//!     "RGBB..",
//! ]);
//! let chains = chain::resolve_all(&mut field);
//! assert_eq!(chains.len(), 3);
//! assert_eq!(chain::total_score(&chains), 1000);
//! ```

pub mod chain;
pub mod field;
pub mod garbage;
pub mod pair;
pub mod rng;
pub mod scoring;

pub use puyo_duel_types as types;

// Re-export commonly used types for convenience
pub use chain::{Chain, Connection};
pub use field::Field;
pub use garbage::{GarbageCounts, GarbageDrop, GarbageGroup, GarbageLedger};
pub use pair::{try_rotate, PuyoPair};
pub use rng::{PairQueue, SimpleRng};
pub use scoring::{calculate_score, ScoreResult};
