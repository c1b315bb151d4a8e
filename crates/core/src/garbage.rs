//! Garbage module - deliveries, the per-board ledger and materialization
//!
//! A [`GarbageGroup`] is one delivery owed by a sender to a receiver. Both
//! simulations hold it through an `Arc` and may resolve it from their own
//! tick, so its counters live behind their own mutex and never behind a
//! simulation lock. `cancelled + fallen <= total` holds after every call;
//! anything else is a bug and panics.
//!
//! A [`GarbageLedger`] is one board's inbox: deliveries owed to that board in
//! arrival order, plus the accumulator turning chain score into units.

use std::sync::{Arc, Mutex, MutexGuard};

use arrayvec::ArrayVec;
use puyo_duel_types::{Puyo, FIELD_HEIGHT, FIELD_WIDTH, GARBAGE_MAX_DROP, GARBAGE_MAX_ROWS, GARBAGE_RATE};

use crate::field::Field;
use crate::rng::SimpleRng;

/// Counter values of one delivery at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GarbageCounts {
    pub total: usize,
    pub cancelled: usize,
    pub fallen: usize,
}

impl GarbageCounts {
    /// Units neither cancelled nor dropped yet
    pub fn remaining(&self) -> usize {
        self.total - self.cancelled - self.fallen
    }

    fn check(&self) {
        assert!(
            self.cancelled + self.fallen <= self.total,
            "garbage delivery over-resolved: {:?}",
            self
        );
    }
}

/// One garbage delivery shared by the sender and the receiver
#[derive(Debug)]
pub struct GarbageGroup {
    counts: Mutex<GarbageCounts>,
}

impl GarbageGroup {
    pub fn new(total: usize) -> Self {
        Self {
            counts: Mutex::new(GarbageCounts {
                total,
                ..GarbageCounts::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GarbageCounts> {
        self.counts.lock().expect("garbage delivery lock poisoned")
    }

    pub fn counts(&self) -> GarbageCounts {
        *self.lock()
    }

    pub fn total(&self) -> usize {
        self.lock().total
    }

    pub fn cancelled(&self) -> usize {
        self.lock().cancelled
    }

    pub fn fallen(&self) -> usize {
        self.lock().fallen
    }

    pub fn remaining(&self) -> usize {
        self.lock().remaining()
    }

    /// Resolved once every unit was either cancelled or dropped
    pub fn is_done(&self) -> bool {
        self.remaining() == 0
    }

    /// Cancel up to `amount` units, returning how many were cancelled
    pub fn cancel(&self, amount: usize) -> usize {
        let mut counts = self.lock();
        let n = amount.min(counts.remaining());
        counts.cancelled += n;
        counts.check();
        n
    }

    /// Mark up to `amount` units as dropped, returning how many were taken
    pub fn fall(&self, amount: usize) -> usize {
        let mut counts = self.lock();
        let n = amount.min(counts.remaining());
        counts.fallen += n;
        counts.check();
        n
    }

    /// Mark every remaining unit as dropped
    pub fn fall_all(&self) -> usize {
        let mut counts = self.lock();
        let n = counts.remaining();
        counts.fallen += n;
        counts.check();
        n
    }
}

/// Garbage placed on a board by one materialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GarbageDrop {
    /// Units taken from the deliveries
    pub count: usize,
    /// Cells written, in placement order (units on a full column are lost)
    pub cells: ArrayVec<(usize, usize), GARBAGE_MAX_DROP>,
}

/// Deliveries owed to one board plus the score accumulator
#[derive(Debug, Default)]
pub struct GarbageLedger {
    deliveries: Vec<Arc<GarbageGroup>>,
    score_remainder: u32,
}

impl GarbageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert chain score into whole units, keeping the remainder
    ///
    /// # Examples
    ///
    /// ```
    /// use puyo_duel_core::GarbageLedger;
    ///
    /// let mut ledger = GarbageLedger::new();
    /// assert_eq!(ledger.commit(100), 1);
    /// assert_eq!(ledger.score_remainder(), 30);
    /// assert_eq!(ledger.commit(40), 1);
    /// assert_eq!(ledger.score_remainder(), 0);
    /// ```
    pub fn commit(&mut self, score: u32) -> usize {
        let acc = self.score_remainder + score;
        self.score_remainder = acc % GARBAGE_RATE;
        (acc / GARBAGE_RATE) as usize
    }

    pub fn score_remainder(&self) -> u32 {
        self.score_remainder
    }

    /// Append a delivery owed to this board
    pub fn push(&mut self, group: Arc<GarbageGroup>) {
        self.deliveries.push(group);
    }

    /// Cancel up to `amount` units oldest-first, returning how many were cancelled
    pub fn cancel(&mut self, amount: usize) -> usize {
        let mut cancelled = 0;
        for group in &self.deliveries {
            if cancelled == amount {
                break;
            }
            cancelled += group.cancel(amount - cancelled);
        }
        self.prune();
        cancelled
    }

    /// Units still owed to this board
    pub fn outstanding_total(&self) -> usize {
        self.deliveries.iter().map(|g| g.remaining()).sum()
    }

    /// Deliveries not yet known to be resolved, oldest first
    pub fn deliveries(&self) -> &[Arc<GarbageGroup>] {
        &self.deliveries
    }

    fn prune(&mut self) {
        self.deliveries.retain(|g| !g.is_done());
    }

    /// Take units oldest-first, returning how many could be taken
    fn take(&mut self, amount: usize) -> usize {
        let mut taken = 0;
        for group in &self.deliveries {
            if taken == amount {
                break;
            }
            taken += group.fall(amount - taken);
        }
        self.prune();
        taken
    }

    /// Drop up to 30 owed units onto the field
    ///
    /// The units are taken from the deliveries first, then exactly that many
    /// are placed: whole rows go first, at most five of them, and the
    /// remainder lands on top of randomly chosen distinct columns. Units
    /// aimed at a full column are consumed without landing.
    pub fn materialize(&mut self, field: &mut Field, rng: &mut SimpleRng) -> GarbageDrop {
        let n = self.take(self.outstanding_total().min(GARBAGE_MAX_DROP));
        let mut drop = GarbageDrop {
            count: n,
            ..GarbageDrop::default()
        };

        let mut rows = 0;
        while (rows + 1) * FIELD_WIDTH <= n && rows < GARBAGE_MAX_ROWS {
            for x in 0..FIELD_WIDTH {
                place_on_top(field, x, &mut drop);
            }
            rows += 1;
        }

        let rest = n - rows * FIELD_WIDTH;
        if rest > 0 {
            let mut columns: [usize; FIELD_WIDTH] = std::array::from_fn(|x| x);
            rng.shuffle(&mut columns);
            for &x in &columns[..rest] {
                place_on_top(field, x, &mut drop);
            }
        }
        drop
    }

    /// Cancel every remaining unit of every delivery and forget them
    pub fn invalidate(&mut self) {
        for group in &self.deliveries {
            group.cancel(group.remaining());
        }
        self.deliveries.clear();
        self.score_remainder = 0;
    }
}

fn place_on_top(field: &mut Field, x: usize, drop: &mut GarbageDrop) {
    let y = field.column_height(x);
    if y < FIELD_HEIGHT {
        field.set(x, y, Some(Puyo::Garbage));
        drop.cells.push((x, y));
    }
}
