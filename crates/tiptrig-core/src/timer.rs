#![forbid(unsafe_code)]

//! Deterministic timer queue for delayed state transitions.
//!
//! [`TimerQueue`] holds payloads that become due at a deadline on a virtual
//! clock owned by the caller. Nothing here reads the wall clock: the owner
//! passes `now` into every call, which keeps transitions reproducible in
//! tests and lets the event loop decide how real time maps onto the queue.
//!
//! # Invariants
//!
//! 1. A handle is never reused within one queue.
//! 2. `pop_due` yields timers by deadline, ties broken by scheduling order.
//! 3. A cancelled timer is never yielded.
//! 4. `cancel` on a fired, cancelled, or unknown handle is a no-op.
//!
//! # Usage
//!
//! Drain with repeated `pop_due` calls rather than collecting all expired
//! timers up front: handling one timer may cancel another that expired in
//! the same step.

use std::collections::BTreeMap;
use std::time::Duration;

use ahash::AHashMap;

/// Opaque identifier for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl std::fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Queue of pending timers keyed by virtual deadline.
pub struct TimerQueue<T> {
    pending: BTreeMap<(Duration, u64), T>,
    deadlines: AHashMap<u64, Duration>,
    next_seq: u64,
}

impl<T> std::fmt::Debug for TimerQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.pending.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            deadlines: AHashMap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `payload` to become due `delay` after `now`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, payload: T) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let deadline = now.saturating_add(delay);
        self.pending.insert((deadline, seq), payload);
        self.deadlines.insert(seq, deadline);
        tracing::trace!(
            target: "tiptrig.timer",
            timer = seq,
            deadline_ms = deadline.as_millis() as u64,
            "timer scheduled"
        );
        TimerHandle(seq)
    }

    /// Cancel a timer. Returns `true` if a live timer was removed.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let Some(deadline) = self.deadlines.remove(&handle.0) else {
            return false;
        };
        self.pending.remove(&(deadline, handle.0));
        tracing::trace!(target: "tiptrig.timer", timer = handle.0, "timer cancelled");
        true
    }

    /// Whether `handle` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    /// Deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Remove and return the earliest timer whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerHandle, T)> {
        let &(deadline, _) = self.pending.keys().next()?;
        if deadline > now {
            return None;
        }
        let ((_, seq), payload) = self.pending.pop_first()?;
        self.deadlines.remove(&seq);
        tracing::trace!(
            target: "tiptrig.timer",
            timer = seq,
            deadline_ms = deadline.as_millis() as u64,
            "timer fired"
        );
        Some((TimerHandle(seq), payload))
    }

    /// Number of pending timers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no timers are pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
