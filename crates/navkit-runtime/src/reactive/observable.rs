#![forbid(unsafe_code)]

//! Observable value with change notification and version tracking.
//!
//! # Design
//!
//! [`Observable<T>`] keeps a value in shared `Rc<RefCell<..>>` storage. When
//! a write changes the value (by `PartialEq`), every live subscriber is
//! called in registration order. The navigator publishes the top screen
//! identity and each applied stack change through observables; hosts get a
//! [`ReadOnly`] handle so only the navigator can write.
//!
//! # Failure Modes
//!
//! - **Re-entrant write from a subscriber**: allowed; the borrow is released
//!   before callbacks run, so the nested write notifies on its own.
//! - **Subscriber leak**: [`Subscription`] guards kept forever keep their
//!   callbacks alive. Dropped guards are pruned lazily on the next notify.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, debug_span};
use web_time::Instant;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    /// Pruned on notify once their guard is gone.
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning creates another handle to the **same** value and subscribers.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing write.
/// 2. Writing a value equal to the current one is a no-op.
/// 3. Subscribers are notified in registration order.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Version 0, no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Call `callback` with every new value until the returned guard drops.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.inner.borrow_mut().subscribers.push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscribers, including dropped ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Read-only handle to the same value.
    #[must_use]
    pub fn read_only(&self) -> ReadOnly<T> {
        ReadOnly {
            source: self.clone(),
        }
    }

    /// Inside a [`BatchScope`](super::BatchScope) the callbacks are deferred
    /// and coalesced per subscriber; they then see the latest value.
    fn notify(&self) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .collect()
        };

        if callbacks.is_empty() {
            return;
        }

        if super::batch::is_batching() {
            super::batch::record_changes(1);
            for cb in callbacks {
                let key = Rc::as_ptr(&cb) as *const () as usize;
                let source = self.clone();
                super::batch::defer_or_run_keyed(key, move || {
                    let latest = source.get();
                    cb(&latest);
                });
            }
            return;
        }

        let subscribers = callbacks.len() as u64;
        let value = self.get();
        let started = Instant::now();
        let _span = debug_span!(
            "navkit.notify",
            changes = 1_u64,
            subscribers,
            duration_us = tracing::field::Empty
        )
        .entered();

        for cb in &callbacks {
            cb(&value);
        }

        let duration_us = started.elapsed().as_micros() as u64;
        tracing::Span::current().record("duration_us", duration_us);
        debug!(duration_us, subscribers, "observers notified");
    }
}

// ---------------------------------------------------------------------------
// Read-only view
// ---------------------------------------------------------------------------

/// Observable handle without write access.
pub struct ReadOnly<T> {
    source: Observable<T>,
}

impl<T> Clone for ReadOnly<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadOnly<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadOnly").field(&self.source).finish()
    }
}

impl<T: Clone + PartialEq + 'static> ReadOnly<T> {
    #[must_use]
    pub fn get(&self) -> T {
        self.source.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.source.with(f)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.source.version()
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.source.subscribe(callback)
    }
}

// ---------------------------------------------------------------------------
// Subscription guard
// ---------------------------------------------------------------------------

/// Keeps a subscriber callback alive. Dropping it unsubscribes.
pub struct Subscription {
    /// Type-erased strong `Rc` of the callback.
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
