//! Mailbox linking two simulations
//!
//! Each simulation owns one mailbox behind an `Arc`. The opponent posts
//! deliveries into it and reads the board it publishes, so a simulation
//! never needs the other simulation's lock. Every lock in here is a leaf:
//! nothing else is acquired while one is held.
//!
//! Each mailbox also counts the frames its owner has advanced. A delivery is
//! tagged with the sender's frame and becomes ready once the receiver has
//! advanced that many frames itself, so garbage sent on one tick is accepted
//! on the next one whatever order the two players are stepped in. Linked
//! mailboxes start counting from the same frame.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};

use puyo_duel_core::{Field, GarbageGroup};

#[derive(Debug, Default)]
pub struct Mailbox {
    /// Deliveries posted by the opponent, tagged with the frame they were sent on
    pending: Mutex<Vec<(u64, Arc<GarbageGroup>)>>,
    /// Frames advanced by the owner
    frames: AtomicU64,
    /// Last board published by the owner
    board: RwLock<Field>,
    opponent: Mutex<Weak<Mailbox>>,
}

impl Mailbox {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn pending(&self) -> MutexGuard<'_, Vec<(u64, Arc<GarbageGroup>)>> {
        self.pending.lock().expect("mailbox lock poisoned")
    }

    fn opponent_slot(&self) -> MutexGuard<'_, Weak<Mailbox>> {
        self.opponent.lock().expect("mailbox link lock poisoned")
    }

    /// Frames the owner has advanced so far
    pub fn frame(&self) -> u64 {
        self.frames.load(Ordering::SeqCst)
    }

    /// Count one more frame for the owner and return it
    pub fn begin_frame(&self) -> u64 {
        self.frames.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Queue a delivery sent on the sender's frame `sent_at`
    pub fn post(&self, group: Arc<GarbageGroup>, sent_at: u64) {
        self.pending().push((sent_at, group));
    }

    /// Remove and return the deliveries that are ready, oldest first
    ///
    /// A delivery is ready once it was sent on a frame the owner has already
    /// advanced past. Later ones stay queued.
    pub fn take_pending(&self) -> Vec<Arc<GarbageGroup>> {
        let now = self.frame();
        let mut pending = self.pending();
        let (ready, waiting): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(|&(sent_at, _)| sent_at <= now);
        *pending = waiting;
        ready.into_iter().map(|(_, group)| group).collect()
    }

    /// Units queued but not yet accepted, ready or not
    pub fn pending_total(&self) -> usize {
        self.pending().iter().map(|(_, g)| g.remaining()).sum()
    }

    /// Cancel and drop every queued delivery
    pub fn invalidate_pending(&self) {
        let pending = std::mem::take(&mut *self.pending());
        for (_, group) in pending {
            group.cancel(group.remaining());
        }
    }

    pub fn publish_board(&self, field: &Field) {
        self.board
            .write()
            .expect("mailbox board lock poisoned")
            .clone_from(field);
    }

    /// Copy of the last published board
    pub fn board(&self) -> Field {
        self.board.read().expect("mailbox board lock poisoned").clone()
    }

    /// The linked opponent's mailbox, if it is still alive
    pub fn opponent(&self) -> Option<Arc<Mailbox>> {
        self.opponent_slot().upgrade()
    }

    pub fn is_linked(&self) -> bool {
        self.opponent().is_some()
    }

    /// Link two mailboxes as opponents, replacing any previous links
    pub fn connect(a: &Arc<Mailbox>, b: &Arc<Mailbox>) {
        assert!(!Arc::ptr_eq(a, b), "a mailbox cannot be its own opponent");
        a.disconnect();
        b.disconnect();
        let frame = a.frame().max(b.frame());
        a.frames.store(frame, Ordering::SeqCst);
        b.frames.store(frame, Ordering::SeqCst);
        *a.opponent_slot() = Arc::downgrade(b);
        *b.opponent_slot() = Arc::downgrade(a);
    }

    /// Remove the link on both sides
    pub fn disconnect(&self) {
        let previous = std::mem::take(&mut *self.opponent_slot());
        if let Some(other) = previous.upgrade() {
            let mut slot = other.opponent_slot();
            if std::ptr::eq(slot.as_ptr(), self) {
                *slot = Weak::new();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_and_disconnect() {
        let a = Mailbox::new();
        let b = Mailbox::new();
        Mailbox::connect(&a, &b);
        assert!(Arc::ptr_eq(&a.opponent().unwrap(), &b));
        assert!(Arc::ptr_eq(&b.opponent().unwrap(), &a));

        b.disconnect();
        assert!(!a.is_linked());
        assert!(!b.is_linked());
    }

    #[test]
    fn test_relinking_drops_old_partner() {
        let a = Mailbox::new();
        let b = Mailbox::new();
        let c = Mailbox::new();
        Mailbox::connect(&a, &b);
        Mailbox::connect(&a, &c);
        assert!(!b.is_linked());
        assert!(Arc::ptr_eq(&a.opponent().unwrap(), &c));
    }

    #[test]
    fn test_link_does_not_keep_opponent_alive() {
        let a = Mailbox::new();
        let b = Mailbox::new();
        Mailbox::connect(&a, &b);
        drop(b);
        assert!(a.opponent().is_none());
    }

    #[test]
    fn test_pending_deliveries() {
        let mailbox = Mailbox::new();
        let group = Arc::new(GarbageGroup::new(7));
        mailbox.post(group.clone(), 0);
        assert_eq!(mailbox.pending_total(), 7);

        mailbox.invalidate_pending();
        assert_eq!(mailbox.pending_total(), 0);
        assert!(group.is_done());
        assert!(mailbox.take_pending().is_empty());
    }

    #[test]
    fn test_delivery_waits_for_the_receivers_next_frame() {
        let mailbox = Mailbox::new();
        mailbox.post(Arc::new(GarbageGroup::new(3)), 1);
        assert!(mailbox.take_pending().is_empty());
        assert_eq!(mailbox.pending_total(), 3);

        assert_eq!(mailbox.begin_frame(), 1);
        let ready = mailbox.take_pending();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].remaining(), 3);
        assert_eq!(mailbox.pending_total(), 0);
    }

    #[test]
    fn test_connect_aligns_frame_counters() {
        let a = Mailbox::new();
        let b = Mailbox::new();
        for _ in 0..5 {
            a.begin_frame();
        }
        Mailbox::connect(&a, &b);
        assert_eq!(a.frame(), 5);
        assert_eq!(b.frame(), 5);
    }
}
