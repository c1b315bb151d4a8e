//! Turn engine - phases, garbage exchange and the two-player tick
//!
//! Builds on the pure rules in `puyo-duel-core` and adds everything that
//! depends on time or on the opponent:
//!
//! - [`sim`]: one player's state machine, advanced one frame at a time
//! - [`phase`]: free control, settling, garbage exchange, game over
//! - [`history`]: per-turn records linked into a history for observers
//! - [`link`]: the mailbox through which linked simulations exchange garbage
//! - [`duel`]: two linked simulations behind `RwLock`s, ticked in lockstep
//! - [`snapshot`]: serializable per-frame view for renderers and agents
//! - [`config`]: settings, optionally read from the environment
//!
//! The engine logs through `tracing` and never installs a subscriber.
//!
//! # Example
//!
//! ```
//! use puyo_duel_engine::Simulation;
//! use puyo_duel_types::{PhaseKind, Placement, Rotation};
//!
//! let mut sim = Simulation::new(12345);
//! assert!(sim.put(Placement::new(0, Rotation::Vertical)));
//! sim.step();
//! assert_eq!(sim.phase_kind(), PhaseKind::Settling);
//! ```

pub mod config;
pub mod duel;
pub mod history;
pub mod link;
pub mod phase;
pub mod sim;
pub mod snapshot;

pub use config::{ConfigError, SimConfig};
pub use duel::{Duel, SharedSimulation};
pub use history::{HistoryIter, TurnRecord, TurnResult};
pub use link::Mailbox;
pub use phase::{Phase, Settling};
pub use sim::Simulation;
pub use snapshot::{PairSnapshot, SimSnapshot, TimersSnapshot};
