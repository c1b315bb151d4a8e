//! Two-player driver
//!
//! Each simulation sits behind its own `RwLock`: the tick takes the write
//! lock, observers take read locks. The tick never holds both players' locks
//! at once; garbage crosses over through the mailboxes.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::config::{ConfigError, SimConfig};
use crate::sim::Simulation;

/// A simulation shared between the tick driver and observers
pub type SharedSimulation = Arc<RwLock<Simulation>>;

pub fn read(sim: &SharedSimulation) -> RwLockReadGuard<'_, Simulation> {
    sim.read().expect("simulation lock poisoned")
}

pub fn write(sim: &SharedSimulation) -> RwLockWriteGuard<'_, Simulation> {
    sim.write().expect("simulation lock poisoned")
}

/// Link two shared simulations as opponents
pub fn link(a: &SharedSimulation, b: &SharedSimulation) {
    let a_box = read(a).mailbox().clone();
    let b_box = read(b).mailbox().clone();
    crate::link::Mailbox::connect(&a_box, &b_box);
}

/// Two linked simulations advanced in lockstep
#[derive(Debug, Clone)]
pub struct Duel {
    players: [SharedSimulation; 2],
}

impl Duel {
    pub fn new(seeds: [u32; 2]) -> Self {
        let players = seeds.map(|seed| Arc::new(RwLock::new(Simulation::new(seed))));
        Self::from_players(players)
    }

    pub fn with_config(seeds: [u32; 2], config: SimConfig) -> Result<Self, ConfigError> {
        let [a, b] = seeds;
        let players = [
            Arc::new(RwLock::new(Simulation::with_config(a, config)?)),
            Arc::new(RwLock::new(Simulation::with_config(b, config)?)),
        ];
        Ok(Self::from_players(players))
    }

    fn from_players(players: [SharedSimulation; 2]) -> Self {
        link(&players[0], &players[1]);
        Self { players }
    }

    /// Shared handle to player 0 or 1, e.g. for an observer thread
    pub fn player(&self, index: usize) -> &SharedSimulation {
        &self.players[index]
    }

    pub fn read(&self, index: usize) -> RwLockReadGuard<'_, Simulation> {
        read(&self.players[index])
    }

    pub fn write(&self, index: usize) -> RwLockWriteGuard<'_, Simulation> {
        write(&self.players[index])
    }

    /// Advance both players by one frame
    ///
    /// Both accept the deliveries posted so far before either advances, so
    /// garbage sent during this tick is only accepted on the next one.
    pub fn tick(&self) {
        for player in &self.players {
            write(player).accept_incoming();
        }
        for player in &self.players {
            write(player).advance_frame();
        }
    }

    /// Reset both players, keeping them linked
    pub fn reset(&self, seeds: [u32; 2]) {
        for (player, seed) in self.players.iter().zip(seeds) {
            write(player).reset(seed);
        }
        info!(?seeds, "duel reset");
    }

    /// Whether either player is out
    pub fn is_over(&self) -> bool {
        self.players.iter().any(|p| read(p).is_game_over())
    }

    /// The surviving player once exactly one of them is out
    pub fn winner(&self) -> Option<usize> {
        match (self.read(0).is_game_over(), self.read(1).is_game_over()) {
            (true, false) => Some(1),
            (false, true) => Some(0),
            _ => None,
        }
    }
}
