//! Snapshot tests - per-frame view and its JSON form

use puyo_duel::engine::{SimSnapshot, Simulation};
use puyo_duel::types::{PhaseKind, Placement, Rotation, LOCK_DELAY_FRAMES};
use serde::Deserialize;
use serde_json::Value;

#[test]
fn test_initial_snapshot() {
    let sim = Simulation::new(42);
    let snap = sim.snapshot();
    assert!(snap.playable());
    assert_eq!(snap.phase, PhaseKind::FreeControl);
    assert_eq!(snap.timers.lock_frames, LOCK_DELAY_FRAMES);
    assert_eq!(snap.seed, 42);
    assert_eq!(snap.board, [[0u8; 6]; 13]);

    let current = snap.current.unwrap();
    assert_eq!((current.x, current.rotation), (2, Rotation::Vertical));
    assert_eq!(snap.next[0].pivot, sim.queue().get(1).pivot);
    assert_eq!(snap.next[1].satellite, sim.queue().get(2).satellite);
}

#[test]
fn test_snapshot_into_reuses_buffer() {
    let mut sim = Simulation::new(9);
    let mut snap = SimSnapshot::default();
    sim.snapshot_into(&mut snap);
    assert_eq!(snap.frame, 0);

    assert!(sim.put(Placement::new(0, Rotation::HorizontalRight)));
    sim.step();
    sim.snapshot_into(&mut snap);
    assert_eq!(snap.phase, PhaseKind::Settling);
    assert!(snap.current.is_none());
    assert!(!snap.playable());
    assert_ne!(snap.board[0][0], 0);
    assert_ne!(snap.board[0][1], 0);
    assert_eq!(snap.frame, 1);
}

#[test]
fn test_snapshot_json_shape() {
    let sim = Simulation::new(3);
    let json = serde_json::to_string(&sim.snapshot()).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["phase"], "free_control");
    assert_eq!(value["board"].as_array().unwrap().len(), 13);
    assert_eq!(value["board"][0].as_array().unwrap().len(), 6);
    assert_eq!(value["next"].as_array().unwrap().len(), 2);
    assert_eq!(value["current"]["rotation"], "vertical");
    assert_eq!(value["game_over"], false);
    assert_eq!(value["timers"]["lock_frames"], 100);
}

/// What an external agent would parse out of a snapshot
#[derive(Debug, Deserialize)]
struct AgentView {
    board: Vec<Vec<u8>>,
    phase: String,
    score: u64,
    incoming_garbage: usize,
    turn: u64,
}

#[test]
fn test_agent_can_parse_snapshot() {
    let mut sim = Simulation::new(5);
    sim.quick_drop();
    for _ in 0..3 {
        sim.step();
    }
    let json = serde_json::to_string(&sim.snapshot()).unwrap();
    let view: AgentView = serde_json::from_str(&json).unwrap();

    assert_eq!(view.phase, "free_control");
    assert_eq!(view.turn, 2);
    assert_eq!(view.score, 0);
    assert_eq!(view.incoming_garbage, 0);
    assert_eq!(view.board[0].iter().filter(|&&c| c != 0).count(), 1);
    assert_eq!(view.board[1].iter().filter(|&&c| c != 0).count(), 1);
}
