//! A deterministic, single-threaded timer queue.
//!
//! The designers never sleep. They schedule events on a `TimerQueue` with a
//! virtual clock, and the embedder calls [`TimerQueue::advance`] from its own
//! event loop (a `setTimeout` shim in a browser, a test, or the CLI). Due
//! events come back in deadline order; events sharing a deadline come back in
//! the order they were scheduled.

use std::collections::BTreeMap;

/// Handle returned by [`TimerQueue::schedule`], used to cancel a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
pub struct TimerQueue<E> {
    now_ms: u64,
    next_id: u64,
    // Keyed by (deadline, id) so iteration order is the firing order.
    pending: BTreeMap<(u64, u64), E>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, delay_ms: u64, event: E) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert((self.now_ms + delay_ms, id), event);
        TimerId(id)
    }

    /// Cancels a pending timer. Returns the event if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<E> {
        let key = self.pending.keys().find(|(_, timer)| *timer == id.0).copied()?;
        self.pending.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Milliseconds until the next pending timer fires.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending
            .keys()
            .next()
            .map(|(deadline, _)| deadline.saturating_sub(self.now_ms))
    }

    /// Moves the clock forward and drains every timer that became due.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<E> {
        self.now_ms += elapsed_ms;
        let mut due = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().0 > self.now_ms {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    /// Pops the single next timer, moving the clock to its deadline.
    pub fn pop_next(&mut self) -> Option<E> {
        let ((deadline, _), event) = self.pending.pop_first()?;
        self.now_ms = self.now_ms.max(deadline);
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(500, "b");
        timers.schedule(200, "a");
        timers.schedule(500, "c");
        assert_eq!(timers.advance(199), Vec::<&str>::new());
        assert_eq!(timers.advance(1), vec!["a"]);
        assert_eq!(timers.advance(1000), vec!["b", "c"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule(2000, 1);
        timers.schedule(2000, 2);
        assert_eq!(timers.cancel(id), Some(1));
        assert_eq!(timers.cancel(id), None);
        assert_eq!(timers.advance(2000), vec![2]);
    }

    #[test]
    fn pop_next_moves_the_clock() {
        let mut timers = TimerQueue::new();
        timers.schedule(300, ());
        assert_eq!(timers.next_deadline(), Some(300));
        assert_eq!(timers.pop_next(), Some(()));
        assert_eq!(timers.now(), 300);
    }
}
