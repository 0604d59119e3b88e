//! Observable state with generation-gated writes.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Identifies one attempt. Writes carrying a stale ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

/// Single-writer state container that front ends read and subscribe to.
///
/// The generation counter is only touched from inside the watch channel's
/// write lock, so "is this attempt still current?" and "apply its result"
/// happen as one step.
#[derive(Debug)]
pub struct StateCell<S> {
    tx: watch::Sender<S>,
    generation: AtomicU64,
}

impl<S> StateCell<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx, generation: AtomicU64::new(0) }
    }

    /// Snapshot of the currently published value.
    pub fn current(&self) -> S
    where
        S: Clone,
    {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    /// Supersede every earlier attempt and apply `f` as the new attempt's
    /// first write.
    pub(crate) fn begin(&self, f: impl FnOnce(&mut S)) -> Ticket {
        let mut ticket = Ticket(0);
        self.tx.send_modify(|state| {
            ticket = Ticket(self.generation.fetch_add(1, Ordering::Relaxed) + 1);
            f(state);
        });
        ticket
    }

    /// Apply `f` only if `ticket` still names the current attempt.
    /// Returns `false` when the write was discarded.
    pub(crate) fn publish(&self, ticket: Ticket, f: impl FnOnce(&mut S)) -> bool {
        self.tx.send_if_modified(|state| {
            if self.generation.load(Ordering::Relaxed) != ticket.0 {
                return false;
            }
            f(state);
            true
        })
    }
}

impl<S: Default> Default for StateCell<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_ticket_is_discarded() {
        let cell = StateCell::new(0u32);
        let first = cell.begin(|v| *v = 1);
        let second = cell.begin(|v| *v = 2);

        assert!(!cell.publish(first, |v| *v = 10));
        assert_eq!(cell.current(), 2);

        assert!(cell.publish(second, |v| *v = 20));
        assert_eq!(cell.current(), 20);
    }

    #[test]
    fn subscribers_see_only_applied_writes() {
        let cell = StateCell::new(String::new());
        let mut rx = cell.subscribe();
        let stale = cell.begin(|s| s.push('a'));
        rx.borrow_and_update();

        let _current = cell.begin(|s| s.push('b'));
        assert!(rx.has_changed().expect("sender alive"));
        rx.borrow_and_update();

        cell.publish(stale, |s| s.push('x'));
        assert!(!rx.has_changed().expect("sender alive"));
        assert_eq!(cell.current(), "ab");
    }
}
