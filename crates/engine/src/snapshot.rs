//! Snapshot module - serializable per-frame view of one simulation

use puyo_duel_core::PuyoPair;
use puyo_duel_types::{PhaseKind, Puyo, Rotation, FIELD_HEIGHT, FIELD_WIDTH, NEXT_COUNT};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairSnapshot {
    pub pivot: Puyo,
    pub satellite: Puyo,
    pub x: i8,
    pub y: f64,
    pub rotation: Rotation,
}

impl From<PuyoPair> for PairSnapshot {
    fn from(value: PuyoPair) -> Self {
        Self {
            pivot: value.pivot,
            satellite: value.satellite,
            x: value.x,
            y: value.y,
            rotation: value.rotation,
        }
    }
}

impl Default for PairSnapshot {
    fn default() -> Self {
        Self::from(PuyoPair::new(Puyo::Red, Puyo::Red))
    }
}

/// Frames left on the timer of the current phase (0 for the others)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TimersSnapshot {
    pub lock_frames: u32,
    pub settle_frames: u32,
    pub garbage_frames: u32,
}

/// Everything a renderer or agent needs from one simulation at one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimSnapshot {
    /// Cell codes indexed `[y][x]`, row 0 at the floor
    pub board: [[u8; FIELD_WIDTH]; FIELD_HEIGHT],
    /// Pair under control (free control only)
    pub current: Option<PairSnapshot>,
    pub next: [PairSnapshot; NEXT_COUNT - 1],
    pub phase: PhaseKind,
    pub timers: TimersSnapshot,
    pub score: u64,
    pub incoming_garbage: usize,
    pub frame: u64,
    pub turn: u64,
    pub seed: u32,
    pub game_over: bool,
}

impl Default for SimSnapshot {
    fn default() -> Self {
        Self {
            board: [[0u8; FIELD_WIDTH]; FIELD_HEIGHT],
            current: None,
            next: [PairSnapshot::default(); NEXT_COUNT - 1],
            phase: PhaseKind::FreeControl,
            timers: TimersSnapshot::default(),
            score: 0,
            incoming_garbage: 0,
            frame: 0,
            turn: 0,
            seed: 0,
            game_over: false,
        }
    }
}

impl SimSnapshot {
    pub fn playable(&self) -> bool {
        !self.game_over && self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_not_playable() {
        let snap = SimSnapshot::default();
        assert!(!snap.playable());
        assert_eq!(snap.board, [[0u8; FIELD_WIDTH]; FIELD_HEIGHT]);
    }

    #[test]
    fn test_pair_serializes_with_snake_case_names() {
        let pair = PairSnapshot::from(PuyoPair::new(Puyo::Green, Puyo::Garbage));
        let value = serde_json::to_value(pair).unwrap();
        assert_eq!(value["pivot"], "green");
        assert_eq!(value["satellite"], "garbage");
        assert_eq!(value["rotation"], "vertical");
        assert_eq!(value["x"], 2);
        assert_eq!(value["y"], 13.0);
    }
}
