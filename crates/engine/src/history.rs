//! Step history - one record per turn, linked oldest to newest
//!
//! A record is created when free control begins. The simulation fills in
//! its result as the turn settles; observers only ever read it. The link to
//! the following record is set once and never changes.

use std::fmt;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard};

use puyo_duel_core::{chain, Chain, Field, GarbageDrop, GarbageGroup};

/// What happened during a turn
#[derive(Debug, Clone, Default)]
pub struct TurnResult {
    /// Cascade triggered by the locked pair
    pub chains: Vec<Chain>,
    /// Delivery sent to the opponent, if the cascade produced any units
    pub garbage_sent: Option<Arc<GarbageGroup>>,
    /// Deliveries accepted from the opponent during the turn
    pub garbage_received: Vec<Arc<GarbageGroup>>,
    /// Garbage dropped on this board at the end of the turn
    pub garbage_landed: GarbageDrop,
    /// Board when the next turn began
    pub field_after: Option<Field>,
    /// Opponent board when the next turn began
    pub opponent_after: Option<Field>,
}

impl TurnResult {
    pub fn score(&self) -> u32 {
        chain::total_score(&self.chains)
    }

    fn deliveries_resolved(&self) -> bool {
        self.garbage_sent.iter().all(|g| g.is_done())
            && self.garbage_received.iter().all(|g| g.is_done())
    }
}

pub struct TurnRecord {
    turn: u64,
    field_before: Field,
    opponent_before: Option<Field>,
    result: RwLock<TurnResult>,
    next: OnceLock<Arc<TurnRecord>>,
}

impl TurnRecord {
    pub(crate) fn new(turn: u64, field_before: Field, opponent_before: Option<Field>) -> Self {
        Self {
            turn,
            field_before,
            opponent_before,
            result: RwLock::new(TurnResult::default()),
            next: OnceLock::new(),
        }
    }

    /// 1-based turn number within the game
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Board before the pair locked
    pub fn field_before(&self) -> &Field {
        &self.field_before
    }

    /// Opponent board when the turn began (None without an opponent)
    pub fn opponent_before(&self) -> Option<&Field> {
        self.opponent_before.as_ref()
    }

    pub fn result(&self) -> RwLockReadGuard<'_, TurnResult> {
        self.result.read().expect("turn record lock poisoned")
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut TurnResult)) {
        let mut result = self.result.write().expect("turn record lock poisoned");
        f(&mut result);
    }

    /// The record of the following turn, once it began
    pub fn next(&self) -> Option<&Arc<TurnRecord>> {
        self.next.get()
    }

    pub(crate) fn link_next(&self, next: Arc<TurnRecord>) {
        assert!(
            self.next.set(next).is_ok(),
            "turn {} already has a successor",
            self.turn
        );
    }

    /// Whether the turn is over and every delivery it involves is resolved
    pub fn is_finalized(&self) -> bool {
        let result = self.result();
        result.field_after.is_some() && result.deliveries_resolved()
    }
}

impl fmt::Debug for TurnRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Successors are left out: printing them would walk the whole history.
        f.debug_struct("TurnRecord")
            .field("turn", &self.turn)
            .field("has_next", &self.next.get().is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for TurnRecord {
    fn drop(&mut self) {
        // Unlink successors one by one so a long history cannot overflow the stack.
        let mut next = self.next.take();
        while let Some(record) = next {
            next = match Arc::try_unwrap(record) {
                Ok(mut record) => record.next.take(),
                Err(_) => None,
            };
        }
    }
}

/// Iterator over linked turn records, oldest first
#[derive(Debug, Clone)]
pub struct HistoryIter {
    next: Option<Arc<TurnRecord>>,
}

impl HistoryIter {
    pub(crate) fn new(first: Option<Arc<TurnRecord>>) -> Self {
        Self { next: first }
    }
}

impl Iterator for HistoryIter {
    type Item = Arc<TurnRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.next().cloned();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_link_and_iterate() {
        let first = Arc::new(TurnRecord::new(1, Field::new(), None));
        let second = Arc::new(TurnRecord::new(2, Field::new(), None));
        first.link_next(second.clone());

        let turns: Vec<u64> = HistoryIter::new(Some(first)).map(|r| r.turn()).collect();
        assert_eq!(turns, vec![1, 2]);
    }

    #[test]
    #[should_panic(expected = "already has a successor")]
    fn successor_is_set_once() {
        let first = TurnRecord::new(1, Field::new(), None);
        first.link_next(Arc::new(TurnRecord::new(2, Field::new(), None)));
        first.link_next(Arc::new(TurnRecord::new(3, Field::new(), None)));
    }

    #[test]
    fn test_finalized_waits_for_deliveries() {
        let record = TurnRecord::new(1, Field::new(), None);
        let sent = Arc::new(GarbageGroup::new(4));
        record.update(|r| r.garbage_sent = Some(sent.clone()));
        record.update(|r| r.field_after = Some(Field::new()));
        assert!(!record.is_finalized());

        sent.fall_all();
        assert!(record.is_finalized());
    }

    #[test]
    fn test_long_history_drops_without_recursion() {
        let first = Arc::new(TurnRecord::new(1, Field::new(), None));
        let mut last = first.clone();
        for turn in 2..=20_000 {
            let record = Arc::new(TurnRecord::new(turn, Field::new(), None));
            last.link_next(record.clone());
            last = record;
        }
        drop(last);
        drop(first);
    }
}
