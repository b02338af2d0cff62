#![forbid(unsafe_code)]

//! Explicit UI execution queue.
//!
//! Navigation requests made in [`DispatchMode::Deferred`](crate::config::DispatchMode::Deferred)
//! are not applied on the caller's stack; they hop onto this queue and are
//! applied when the host next ticks or flushes the navigator. An entry can
//! also be held back for a number of ticks.
//!
//! # Invariants
//!
//! 1. Ready entries drain in enqueue order.
//! 2. An entry enqueued with a delay of `n` ticks drains on the `n`-th
//!    [`UiQueue::advance`] after it was enqueued, not before.

use std::collections::VecDeque;

#[derive(Debug)]
struct Queued<T> {
    ready_at: u64,
    item: T,
}

/// FIFO of pending UI work, measured in host ticks.
#[derive(Debug)]
pub struct UiQueue<T> {
    entries: VecDeque<Queued<T>>,
    tick: u64,
}

impl<T> Default for UiQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> UiQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            tick: 0,
        }
    }

    /// Queue `item` for the next drain.
    pub fn enqueue(&mut self, item: T) {
        self.enqueue_after(0, item);
    }

    /// Queue `item` to become ready after `ticks` calls to [`advance`](Self::advance).
    pub fn enqueue_after(&mut self, ticks: u32, item: T) {
        self.entries.push_back(Queued {
            ready_at: self.tick.saturating_add(u64::from(ticks)),
            item,
        });
    }

    /// Count one host tick.
    pub fn advance(&mut self) {
        self.tick = self.tick.saturating_add(1);
    }

    /// Remove and return every ready entry, oldest first.
    pub fn drain_ready(&mut self) -> Vec<T> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let now = self.tick;
        let mut ready = Vec::new();
        let mut waiting = VecDeque::with_capacity(self.entries.len());
        for queued in self.entries.drain(..) {
            if queued.ready_at <= now {
                ready.push(queued.item);
            } else {
                waiting.push_back(queued);
            }
        }
        self.entries = waiting;
        ready
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything pending. Returns how many entries were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }
}
