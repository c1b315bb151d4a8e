//! Simulation module - one player's board driven frame by frame
//!
//! Ties together the field, the pair queue, the garbage ledger and the turn
//! history. A turn runs through free control, settling and garbage exchange;
//! each call to [`Simulation::advance_frame`] advances exactly one frame.
//!
//! Commands return whether they changed anything and are ignored outside free
//! control, so an agent can issue them without checking the phase first.

use std::sync::Arc;

use puyo_duel_core::{
    chain, try_rotate, Field, GarbageGroup, GarbageLedger, PairQueue, PuyoPair, SimpleRng,
};
use puyo_duel_types::*;
use tracing::{debug, info, trace};

use crate::config::{ConfigError, SimConfig};
use crate::history::{HistoryIter, TurnRecord};
use crate::link::Mailbox;
use crate::phase::{Phase, Settling};
use crate::snapshot::{PairSnapshot, SimSnapshot, TimersSnapshot};

/// Seed of the garbage scatter stream, derived from the pair seed
fn garbage_seed(seed: u32) -> u32 {
    seed.rotate_left(16) ^ 0x9E37_79B9
}

#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    seed: u32,
    field: Field,
    queue: PairQueue,
    garbage_rng: SimpleRng,
    /// Deliveries owed to this board
    ledger: GarbageLedger,
    mailbox: Arc<Mailbox>,
    /// Deliveries this board sent that may still be unresolved
    sent: Vec<Arc<GarbageGroup>>,
    phase: Phase,
    score: u64,
    /// Chain score of the turn in progress, converted at garbage exchange
    turn_score: u32,
    frame: u64,
    turn: u64,
    /// Direction of the last failed rotation (0 after a success)
    rotation_fail_dir: i8,
    rotation_fail_count: u8,
    soft_put_target: Option<Placement>,
    soft_put_countdown: u32,
    history_head: Option<Arc<TurnRecord>>,
    current_turn: Option<Arc<TurnRecord>>,
}

impl Simulation {
    /// Create a new simulation with the default configuration
    pub fn new(seed: u32) -> Self {
        Self::build(seed, SimConfig::default())
    }

    pub fn with_config(seed: u32, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(seed, config))
    }

    fn build(seed: u32, config: SimConfig) -> Self {
        let mut sim = Self {
            config,
            seed,
            field: Field::new(),
            queue: PairQueue::new(seed),
            garbage_rng: SimpleRng::new(garbage_seed(seed)),
            ledger: GarbageLedger::new(),
            mailbox: Mailbox::new(),
            sent: Vec::new(),
            phase: Phase::GameOver,
            score: 0,
            turn_score: 0,
            frame: 0,
            turn: 0,
            rotation_fail_dir: 0,
            rotation_fail_count: 0,
            soft_put_target: None,
            soft_put_countdown: 0,
            history_head: None,
            current_turn: None,
        };
        sim.begin_turn();
        sim.mailbox.publish_board(&sim.field);
        sim
    }

    /// Start over with a new seed
    ///
    /// Every delivery this board still owes or is owed is cancelled, so the
    /// opponent stops counting it. The opponent link is kept.
    pub fn reset(&mut self, seed: u32) {
        self.ledger.invalidate();
        self.mailbox.invalidate_pending();
        for group in self.sent.drain(..) {
            group.cancel(group.remaining());
        }

        self.seed = seed;
        self.field.clear();
        self.queue = PairQueue::new(seed);
        self.garbage_rng = SimpleRng::new(garbage_seed(seed));
        self.ledger = GarbageLedger::new();
        self.score = 0;
        self.turn_score = 0;
        self.frame = 0;
        self.turn = 0;
        self.soft_put_target = None;
        self.soft_put_countdown = 0;
        self.history_head = None;
        self.current_turn = None;

        info!(seed, "simulation reset");
        self.begin_turn();
        self.mailbox.publish_board(&self.field);
    }

    // ---- linking ----

    /// Link two simulations as opponents
    pub fn link(&self, other: &Simulation) {
        Mailbox::connect(&self.mailbox, &other.mailbox);
    }

    pub fn unlink(&self) {
        self.mailbox.disconnect();
    }

    pub fn mailbox(&self) -> &Arc<Mailbox> {
        &self.mailbox
    }

    // ---- frame driving ----

    /// Accept queued deliveries, then advance one frame
    pub fn step(&mut self) {
        self.accept_incoming();
        self.advance_frame();
    }

    /// Move deliveries sent on an earlier frame into the ledger
    ///
    /// Deliveries the opponent sent during the frame this board is about to
    /// advance stay in the mailbox until the next call.
    pub fn accept_incoming(&mut self) {
        let incoming = self.mailbox.take_pending();
        if incoming.is_empty() {
            return;
        }
        if let Some(turn) = &self.current_turn {
            turn.update(|r| r.garbage_received.extend(incoming.iter().cloned()));
        }
        for group in incoming {
            trace!(units = group.remaining(), "garbage accepted");
            self.ledger.push(group);
        }
    }

    /// Advance the phase machine by one frame
    ///
    /// The mailbox counts the frame even after game over, so a linked
    /// opponent's deliveries keep their one-tick delay.
    pub fn advance_frame(&mut self) {
        self.mailbox.begin_frame();
        if self.is_game_over() {
            return;
        }
        self.frame += 1;
        self.drive_soft_put();

        match self.phase {
            Phase::FreeControl { .. } => self.step_free_control(),
            Phase::Settling(_) => self.step_settling(),
            Phase::GarbageExchange { .. } => self.step_garbage_exchange(),
            Phase::GameOver => {}
        }
        self.mailbox.publish_board(&self.field);
    }

    fn step_free_control(&mut self) {
        let Some(lock_timer) = self.phase.lock_timer() else {
            return;
        };
        let mut pair = self.queue.current();
        pair.y -= FALL_SPEED / f64::from(FRAMES_PER_SECOND);

        let (pivot_row, satellite_row) = self.field.landing_rows(pair.placement());
        let pivot_landing = pivot_row as f64;
        let satellite_landing = satellite_row as f64;
        if pivot_landing < pair.y && satellite_landing < pair.satellite_y() {
            self.queue.set_current(pair);
            self.phase = Phase::FreeControl {
                lock_timer: LOCK_DELAY_FRAMES,
            };
            return;
        }

        pair.y = pivot_landing;
        if satellite_landing > pair.satellite_y() {
            pair.y += satellite_landing - pair.satellite_y();
        }
        self.queue.set_current(pair);

        if lock_timer == 0 {
            self.lock_pair();
        } else {
            self.phase = Phase::FreeControl {
                lock_timer: lock_timer - 1,
            };
        }
    }

    fn lock_pair(&mut self) {
        let pair = self.queue.current();
        let (pivot_row, satellite_row) = self.field.landing_rows(pair.placement());

        self.field.clear_touched();
        self.write_locked_cell(pair.x, pivot_row, pair.pivot);
        self.write_locked_cell(pair.satellite_x(), satellite_row, pair.satellite);
        trace!(
            x = pair.x,
            rotation = pair.rotation.as_str(),
            pivot_row,
            satellite_row,
            "pair locked"
        );

        self.queue.advance();
        self.soft_put_target = None;
        self.enter_settling();
    }

    fn write_locked_cell(&mut self, x: i8, y: usize, puyo: Puyo) {
        if y < FIELD_HEIGHT {
            self.field.set(x as usize, y, Some(puyo));
        } else {
            trace!(x, y, "cell locked above the field discarded");
        }
    }

    fn enter_settling(&mut self) {
        let display = self.field.clone();
        let moved = self.field.apply_gravity();
        let chains = chain::resolve_all(&mut self.field);
        let turn_score = chain::total_score(&chains);

        self.turn_score = turn_score;
        self.score += u64::from(turn_score);
        debug!(
            frame = self.frame,
            chains = chains.len(),
            score = turn_score,
            "cascade resolved"
        );

        let settling = Settling::new(display, moved, chains.len());
        if let Some(turn) = &self.current_turn {
            turn.update(|r| r.chains = chains);
        }
        self.phase = Phase::Settling(settling);
    }

    fn step_settling(&mut self) {
        let Phase::Settling(settling) = &mut self.phase else {
            return;
        };

        if settling.fall_wait > 0 {
            settling.fall_wait -= 1;
            if settling.fall_wait == 0 {
                settling.display.apply_gravity();
            }
            return;
        }

        if settling.current >= settling.chain_timers.len() {
            self.enter_garbage_exchange();
            return;
        }

        let step = settling.current;
        let timer = settling.chain_timers[step];
        if timer == CHAIN_FRAMES + FALL_FRAMES {
            chain::resolve_step(&mut settling.display, step as u32 + 1);
        }
        if timer == FALL_FRAMES {
            settling.display.apply_gravity();
        }
        settling.chain_timers[step] = timer - 1;
        if timer == 1 {
            settling.current += 1;
        }
    }

    fn enter_garbage_exchange(&mut self) {
        let produced = self.ledger.commit(self.turn_score);
        self.turn_score = 0;
        let cancelled = self.ledger.cancel(produced);
        let send = produced - cancelled;

        if send > 0 {
            let group = Arc::new(GarbageGroup::new(send));
            self.send_garbage(group.clone());
            if let Some(turn) = &self.current_turn {
                turn.update(|r| r.garbage_sent = Some(group));
            }
        }

        let mut wait = 0;
        if self.ledger.outstanding_total() > 0 {
            let landed = self
                .ledger
                .materialize(&mut self.field, &mut self.garbage_rng);
            wait = GARBAGE_WAIT_FRAMES;
            debug!(frame = self.frame, units = landed.count, "garbage landed");
            if let Some(turn) = &self.current_turn {
                turn.update(|r| r.garbage_landed = landed);
            }
        }

        debug!(
            frame = self.frame,
            produced,
            cancelled,
            sent = send,
            "garbage exchanged"
        );
        self.phase = Phase::GarbageExchange { wait };
    }

    fn send_garbage(&mut self, group: Arc<GarbageGroup>) {
        let opponent = if self.config.enable_garbage {
            self.mailbox.opponent()
        } else {
            None
        };
        match opponent {
            Some(opponent) => {
                opponent.post(group.clone(), self.mailbox.frame());
                self.sent.retain(|g| !g.is_done());
                self.sent.push(group);
            }
            None => {
                // Nobody to receive it: the delivery resolves immediately.
                group.fall_all();
            }
        }
    }

    fn step_garbage_exchange(&mut self) {
        let Phase::GarbageExchange { wait } = &mut self.phase else {
            return;
        };
        if *wait == 0 {
            self.begin_turn();
        } else {
            *wait -= 1;
        }
    }

    /// Close the previous turn record and enter free control (or game over)
    fn begin_turn(&mut self) {
        let opponent_board = self.opponent_board();
        if let Some(turn) = &self.current_turn {
            turn.update(|r| {
                r.field_after = Some(self.field.clone());
                r.opponent_after = opponent_board.clone();
            });
        }

        self.rotation_fail_dir = 0;
        self.rotation_fail_count = 0;

        if self.field.is_game_over() {
            info!(turn = self.turn, score = self.score, "game over");
            self.phase = Phase::GameOver;
            return;
        }

        self.turn += 1;
        let record = Arc::new(TurnRecord::new(
            self.turn,
            self.field.clone(),
            opponent_board,
        ));
        match &self.current_turn {
            Some(previous) => previous.link_next(record.clone()),
            None => self.history_head = Some(record.clone()),
        }
        self.current_turn = Some(record);
        self.phase = Phase::FreeControl {
            lock_timer: LOCK_DELAY_FRAMES,
        };
        debug!(turn = self.turn, frame = self.frame, "turn started");
    }

    fn drive_soft_put(&mut self) {
        let Some(target) = self.soft_put_target else {
            return;
        };
        if !self.phase.is_free_control() {
            return;
        }

        let pair = self.queue.current();
        if pair.placement() == target {
            self.soft_drop();
            return;
        }

        self.soft_put_countdown = self.soft_put_countdown.saturating_sub(1);
        if self.soft_put_countdown > 0 {
            return;
        }
        self.soft_put_countdown = self.config.soft_put_interval;

        match pair.rotation.turns_to(target.rotation) {
            0 => {}
            1 => {
                self.rotate_pair(1);
            }
            _ => {
                self.rotate_pair(-1);
            }
        }
        if pair.x < target.x {
            self.move_pair(1);
        } else if pair.x > target.x {
            self.move_pair(-1);
        }
    }

    // ---- commands ----

    /// Shift the pair by `dx` columns
    pub fn move_pair(&mut self, dx: i8) -> bool {
        if !self.phase.is_free_control() || dx == 0 {
            return false;
        }
        let moved = self.queue.current().shifted(dx, 0.0);
        if moved.collides(&self.field) {
            return false;
        }
        self.queue.set_current(moved);
        self.rotation_fail_count = 0;
        true
    }

    /// Rotate the pair a quarter turn (`dir` > 0 is clockwise)
    ///
    /// Blocked rotations try kicks: one row up, one column right, one column
    /// left. Repeating the direction of a rotation that just failed turns the
    /// pair twice. After [`ROTATION_FAIL_LIMIT`] kicked or failed attempts
    /// without a column change, rotations are refused.
    pub fn rotate_pair(&mut self, dir: i8) -> bool {
        if !self.phase.is_free_control()
            || dir == 0
            || self.rotation_fail_count >= ROTATION_FAIL_LIMIT
        {
            return false;
        }

        let mut turns = dir.signum();
        if turns == self.rotation_fail_dir {
            turns *= 2;
        }
        self.rotation_fail_dir = 0;

        let pair = self.queue.current();
        let field = &self.field;
        match try_rotate(&pair, turns, |p| !p.collides(field)) {
            Some((rotated, kick)) => {
                if kick > 0 {
                    self.rotation_fail_count += 1;
                }
                trace!(turns, kick, rotation = rotated.rotation.as_str(), "pair rotated");
                self.queue.set_current(rotated);
                true
            }
            None => {
                self.rotation_fail_count += 1;
                self.rotation_fail_dir = turns;
                trace!(turns, fails = self.rotation_fail_count, "rotation blocked");
                false
            }
        }
    }

    /// Push the pair down and shorten the lock delay
    pub fn soft_drop(&mut self) -> bool {
        let Some(lock_timer) = self.phase.lock_timer() else {
            return false;
        };
        let pair = self.queue.current();
        self.queue
            .set_current(pair.shifted(0, -SOFT_DROP_SPEED / f64::from(FRAMES_PER_SECOND)));
        self.phase = Phase::FreeControl {
            lock_timer: lock_timer.saturating_sub(SOFT_DROP_LOCK_PENALTY),
        };
        true
    }

    /// Drop the pair so it locks on the next frame
    pub fn quick_drop(&mut self) -> bool {
        if !self.phase.is_free_control() {
            return false;
        }
        let mut pair = self.queue.current();
        pair.y = -1.0;
        self.queue.set_current(pair);
        self.phase = Phase::FreeControl { lock_timer: 0 };
        true
    }

    /// Move the pair straight to a placement and quick drop it
    pub fn put(&mut self, placement: Placement) -> bool {
        if !self.phase.is_free_control() || !placement.is_in_field() {
            return false;
        }
        let pair = self.queue.current().with_placement(placement);
        self.queue.set_current(pair);
        self.quick_drop()
    }

    /// Navigate toward a placement over the following frames, then soft drop
    pub fn soft_put(&mut self, placement: Placement) -> bool {
        if !self.phase.is_free_control() || !placement.is_in_field() {
            return false;
        }
        self.soft_put_target = Some(placement);
        true
    }

    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_pair(-1),
            GameAction::MoveRight => self.move_pair(1),
            GameAction::RotateCw => self.rotate_pair(1),
            GameAction::RotateCcw => self.rotate_pair(-1),
            GameAction::SoftDrop => self.soft_drop(),
            GameAction::QuickDrop => self.quick_drop(),
        }
    }

    // ---- scenario setup ----

    /// Mutable board access for setting up positions
    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    /// Recolor the pair under control
    pub fn set_pair_colors(&mut self, pivot: Puyo, satellite: Puyo) {
        let pair = self.queue.current();
        self.queue.set_current(PuyoPair {
            pivot,
            satellite,
            ..pair
        });
    }

    // ---- queries ----

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Board as it should be displayed (replays the cascade while settling)
    pub fn display_field(&self) -> &Field {
        match &self.phase {
            Phase::Settling(settling) => &settling.display,
            _ => &self.field,
        }
    }

    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.field.get(x, y)
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver)
    }

    /// The pair under control, only during free control
    pub fn current_pair(&self) -> Option<PuyoPair> {
        self.phase
            .is_free_control()
            .then(|| self.queue.current())
    }

    pub fn queue(&self) -> &PairQueue {
        &self.queue
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Units owed to this board, including deliveries not yet accepted
    pub fn incoming_garbage(&self) -> usize {
        self.ledger.outstanding_total() + self.mailbox.pending_total()
    }

    /// Units sent by this board that the opponent has not resolved yet
    pub fn outgoing_garbage(&self) -> usize {
        self.sent.iter().map(|g| g.remaining()).sum()
    }

    pub fn ledger(&self) -> &GarbageLedger {
        &self.ledger
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Turn number of the turn in progress (1-based)
    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn soft_put_target(&self) -> Option<Placement> {
        self.soft_put_target
    }

    pub fn rotation_fail_count(&self) -> u8 {
        self.rotation_fail_count
    }

    /// Opponent's last published board
    pub fn opponent_board(&self) -> Option<Field> {
        self.mailbox.opponent().map(|opponent| opponent.board())
    }

    pub fn current_turn(&self) -> Option<&Arc<TurnRecord>> {
        self.current_turn.as_ref()
    }

    /// Turn records of the current game, oldest first
    pub fn history(&self) -> HistoryIter {
        HistoryIter::new(self.history_head.clone())
    }

    pub fn snapshot_into(&self, out: &mut SimSnapshot) {
        self.display_field().write_u8_grid(&mut out.board);

        out.current = self.current_pair().map(PairSnapshot::from);
        for (slot, pair) in out.next.iter_mut().zip(self.queue.previews()) {
            *slot = PairSnapshot::from(*pair);
        }
        out.phase = self.phase_kind();
        out.timers = match &self.phase {
            Phase::FreeControl { lock_timer } => TimersSnapshot {
                lock_frames: *lock_timer,
                ..TimersSnapshot::default()
            },
            Phase::Settling(settling) => TimersSnapshot {
                settle_frames: settling.remaining_frames(),
                ..TimersSnapshot::default()
            },
            Phase::GarbageExchange { wait } => TimersSnapshot {
                garbage_frames: *wait,
                ..TimersSnapshot::default()
            },
            Phase::GameOver => TimersSnapshot::default(),
        };
        out.score = self.score;
        out.incoming_garbage = self.incoming_garbage();
        out.frame = self.frame;
        out.turn = self.turn;
        out.seed = self.seed;
        out.game_over = self.is_game_over();
    }

    pub fn snapshot(&self) -> SimSnapshot {
        let mut s = SimSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}
