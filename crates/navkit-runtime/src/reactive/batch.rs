#![forbid(unsafe_code)]

//! Batched notification for [`Observable`](super::Observable) writes.
//!
//! A navigation step writes several observables (the stack change and the
//! top identity). Subscribers must never see one updated without the other,
//! so the navigator applies each step inside a [`BatchScope`]: values update
//! immediately, notifications wait until the outermost scope exits, and each
//! subscriber fires at most once.
//!
//! ```ignore
//! let top = Observable::new(root_id);
//! let changes = Observable::new(initial_change);
//! {
//!     let _batch = BatchScope::new();
//!     changes.set(change);  // deferred
//!     top.set(detail_id);   // deferred
//! }  // both subscribers fire here, each seeing both new values
//! ```
//!
//! # Invariants
//!
//! 1. Only the outermost of nested scopes flushes.
//! 2. `Observable::get()` inside a batch returns the latest value.
//! 3. Deferred callbacks run in first-enqueue order.
//!
//! # Failure Modes
//!
//! - **Callback panics during flush**: the remaining callbacks still run; the
//!   first panic is resumed afterwards.

use std::cell::RefCell;

use tracing::{debug, debug_span};
use web_time::Instant;

type DeferredNotify = Box<dyn FnOnce()>;

struct DeferredEntry {
    /// One entry per subscriber callback.
    key: usize,
    notify: DeferredNotify,
}

struct BatchContext {
    depth: u32,
    deferred: Vec<DeferredEntry>,
    /// Observable writes coalesced into this batch.
    changes: u64,
}

thread_local! {
    static BATCH_CTX: RefCell<Option<BatchContext>> = const { RefCell::new(None) };
}

/// Whether a batch is active on this thread.
pub fn is_batching() -> bool {
    BATCH_CTX.with(|ctx| ctx.borrow().is_some())
}

/// Defer `f` to the end of the current batch, or run it now if none is active.
/// A later call with the same `key` replaces the queued callback while keeping
/// its original position.
///
/// Returns `true` if deferred.
pub fn defer_or_run_keyed(key: usize, f: impl FnOnce() + 'static) -> bool {
    BATCH_CTX.with(|ctx| {
        let mut guard = ctx.borrow_mut();
        if let Some(ref mut batch) = *guard {
            if let Some(entry) = batch.deferred.iter_mut().find(|e| e.key == key) {
                entry.notify = Box::new(f);
            } else {
                batch.deferred.push(DeferredEntry {
                    key,
                    notify: Box::new(f),
                });
            }
            true
        } else {
            drop(guard);
            f();
            false
        }
    })
}

/// Count observable writes made inside the active batch.
pub fn record_changes(changes: u64) {
    if changes == 0 {
        return;
    }
    BATCH_CTX.with(|ctx| {
        if let Some(ref mut batch) = *ctx.borrow_mut() {
            batch.changes = batch.changes.saturating_add(changes);
        }
    });
}

fn flush(batch: BatchContext) {
    let changes = batch.changes;
    let deferred: Vec<DeferredNotify> = batch.deferred.into_iter().map(|e| e.notify).collect();

    if deferred.is_empty() {
        return;
    }

    let subscribers = deferred.len() as u64;
    let started = Instant::now();
    let _span = debug_span!(
        "navkit.notify",
        changes,
        subscribers,
        duration_us = tracing::field::Empty
    )
    .entered();

    let mut first_panic: Option<Box<dyn std::any::Any + Send>> = None;
    for notify in deferred {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(notify));
        if let Err(payload) = result
            && first_panic.is_none()
        {
            first_panic = Some(payload);
        }
    }

    let duration_us = started.elapsed().as_micros() as u64;
    tracing::Span::current().record("duration_us", duration_us);
    debug!(duration_us, changes, subscribers, "batched observers notified");

    if let Some(payload) = first_panic {
        std::panic::resume_unwind(payload);
    }
}

/// RAII guard for a batch. The outermost guard flushes on drop.
pub struct BatchScope {
    is_root: bool,
}

impl BatchScope {
    #[must_use]
    pub fn new() -> Self {
        let is_root = BATCH_CTX.with(|ctx| {
            let mut guard = ctx.borrow_mut();
            match *guard {
                Some(ref mut batch) => {
                    batch.depth += 1;
                    false
                }
                None => {
                    *guard = Some(BatchContext {
                        depth: 1,
                        deferred: Vec::new(),
                        changes: 0,
                    });
                    true
                }
            }
        });
        Self { is_root }
    }
}

impl Default for BatchScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        let finished = BATCH_CTX.with(|ctx| {
            let mut guard = ctx.borrow_mut();
            let batch = guard.as_mut()?;
            batch.depth -= 1;
            if batch.depth == 0 { guard.take() } else { None }
        });

        // The context is gone before callbacks run, so writes they make
        // notify immediately instead of landing in a dead batch.
        if let Some(batch) = finished {
            flush(batch);
        }
    }
}

impl std::fmt::Debug for BatchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScope")
            .field("is_root", &self.is_root)
            .finish()
    }
}
