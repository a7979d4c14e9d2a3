//! Cooperative deferred-action queue.
//!
//! Nothing here runs on its own. Actions are keyed by the millisecond at which
//! they become due; the owner calls [`TimerQueue::pop_due`] with the current
//! time and handles whatever comes out.

use std::collections::{BTreeMap, HashMap};

/// Handle returned by [`TimerQueue::schedule`], usable to cancel the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Deferred actions ordered by due time, then by insertion.
#[derive(Debug, Clone)]
pub struct TimerQueue<A> {
    entries: BTreeMap<(u64, u64), A>,
    /// Timer id -> key in `entries`, only for actions still pending.
    index: HashMap<TimerId, (u64, u64)>,
    next_seq: u64,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            index: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `action` to become due at `due_ms`.
    pub fn schedule(&mut self, due_ms: u64, action: A) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = TimerId(seq);
        self.entries.insert((due_ms, seq), action);
        self.index.insert(id, (due_ms, seq));
        id
    }

    /// Cancel a pending action. Returns `false` if it already fired or was
    /// cancelled before; calling it twice is harmless.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    /// Drop every pending action, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        self.index.clear();
        dropped
    }

    /// Remove and return every action due at or before `now_ms`, earliest first.
    pub fn pop_due(&mut self, now_ms: u64) -> Vec<(u64, A)> {
        let due = match now_ms.checked_add(1) {
            Some(bound) => {
                let later = self.entries.split_off(&(bound, 0));
                std::mem::replace(&mut self.entries, later)
            }
            None => std::mem::take(&mut self.entries),
        };
        due.into_iter()
            .map(|((due_ms, seq), action)| {
                self.index.remove(&TimerId(seq));
                (due_ms, action)
            })
            .collect()
    }

    /// Due time of the earliest pending action.
    pub fn next_due(&self) -> Option<u64> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
