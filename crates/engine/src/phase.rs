//! Turn phases and their per-phase timers

use puyo_duel_core::Field;
use puyo_duel_types::{PhaseKind, CHAIN_FRAMES, FALL_FRAMES};

/// Settling progress: the cascade is already resolved on the real board,
/// this only paces it and replays it on a display board
#[derive(Debug, Clone, PartialEq)]
pub struct Settling {
    /// Frames left before the first cascade step is shown
    pub fall_wait: u32,
    /// Remaining frames of each cascade step
    pub chain_timers: Vec<u32>,
    /// Index of the step being shown
    pub current: usize,
    /// Board as a renderer should show it right now
    pub display: Field,
}

impl Settling {
    pub fn new(display: Field, moved: bool, chain_count: usize) -> Self {
        Self {
            fall_wait: if moved { FALL_FRAMES } else { 0 },
            chain_timers: vec![CHAIN_FRAMES + FALL_FRAMES; chain_count],
            current: 0,
            display,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.fall_wait == 0 && self.current >= self.chain_timers.len()
    }

    /// Frames left until the cascade display ends
    pub fn remaining_frames(&self) -> u32 {
        self.fall_wait + self.chain_timers.iter().skip(self.current).sum::<u32>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// The pair falls under control; `lock_timer` counts grounded frames down
    FreeControl { lock_timer: u32 },
    /// Gravity and cascade display
    Settling(Settling),
    /// Garbage has been exchanged; wait before the next pair
    GarbageExchange { wait: u32 },
    GameOver,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::FreeControl { .. } => PhaseKind::FreeControl,
            Phase::Settling(_) => PhaseKind::Settling,
            Phase::GarbageExchange { .. } => PhaseKind::GarbageExchange,
            Phase::GameOver => PhaseKind::GameOver,
        }
    }

    pub fn is_free_control(&self) -> bool {
        matches!(self, Phase::FreeControl { .. })
    }

    pub fn lock_timer(&self) -> Option<u32> {
        match self {
            Phase::FreeControl { lock_timer } => Some(*lock_timer),
            _ => None,
        }
    }
}
