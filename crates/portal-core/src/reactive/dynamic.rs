//! Dynamic<T> - a versioned shared value

// Lock poisoning means a writer panicked mid-replace; there is no state to
// recover, so expect() is the handling.
#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

struct DynamicInner<T> {
    value: RwLock<T>,
    /// Incremented after every replacement.
    version: AtomicU64,
}

/// A shared value that observers can poll for changes.
///
/// Cloning a `Dynamic` yields another handle to the same value. Every
/// [`set`](Dynamic::set) replaces the value wholesale and bumps the version,
/// so observers never see a partially applied update.
#[derive(Clone)]
pub struct Dynamic<T> {
    inner: Arc<DynamicInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Dynamic<T> {
    /// Create a new Dynamic at version 0.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(DynamicInner {
                value: RwLock::new(value),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Clone out the current value.
    pub fn get(&self) -> T {
        self.inner
            .value
            .read()
            .expect("Dynamic lock poisoned")
            .clone()
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.value.read().expect("Dynamic lock poisoned");
        f(&guard)
    }

    /// Current version; starts at 0 and grows by one per write.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Replace the value and bump the version.
    pub fn set(&self, value: T) {
        {
            let mut guard = self.inner.value.write().expect("Dynamic lock poisoned");
            *guard = value;
        }
        self.inner.version.fetch_add(1, Ordering::Release);
    }

    /// Replace the value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        let previous = {
            let mut guard = self.inner.value.write().expect("Dynamic lock poisoned");
            std::mem::replace(&mut *guard, value)
        };
        self.inner.version.fetch_add(1, Ordering::Release);
        previous
    }

    /// Compute a new value from the current one and store it.
    ///
    /// The write lock is held for the whole computation, so concurrent
    /// updates serialize instead of overwriting each other.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        {
            let mut guard = self.inner.value.write().expect("Dynamic lock poisoned");
            let next = f(&guard);
            *guard = next;
        }
        self.inner.version.fetch_add(1, Ordering::Release);
    }

    /// Decide on a replacement under the write lock.
    ///
    /// `f` sees the current value and returns an optional replacement plus a
    /// result for the caller. The version only moves when a replacement is
    /// returned, so a refused change is invisible to subscribers.
    pub fn transact<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> (Option<T>, R),
    {
        let (replaced, result) = {
            let mut guard = self.inner.value.write().expect("Dynamic lock poisoned");
            let (next, result) = f(&guard);
            let replaced = next.is_some();
            if let Some(next) = next {
                *guard = next;
            }
            (replaced, result)
        };
        if replaced {
            self.inner.version.fetch_add(1, Ordering::Release);
        }
        result
    }

    /// Subscribe starting from the current version.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            source: self.inner.clone(),
            last_version: self.inner.version.load(Ordering::Acquire),
        }
    }
}

impl<T: Clone + Send + Sync + Default + 'static> Default for Dynamic<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for Dynamic<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dynamic")
            .field("value", &self.get())
            .field("version", &self.version())
            .finish()
    }
}

/// A poll-based view of a [`Dynamic`].
///
/// Polling yields the latest value once per observed version change;
/// intermediate values written between polls are not replayed.
pub struct Subscription<T> {
    source: Arc<DynamicInner<T>>,
    last_version: u64,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    /// True if the source was written since the last poll.
    pub fn has_changed(&self) -> bool {
        self.source.version.load(Ordering::Acquire) > self.last_version
    }

    /// Return the latest value if the source changed since the last poll.
    pub fn poll(&mut self) -> Option<T> {
        let current = self.source.version.load(Ordering::Acquire);
        if current <= self.last_version {
            return None;
        }
        self.last_version = current;
        Some(
            self.source
                .value
                .read()
                .expect("Dynamic lock poisoned")
                .clone(),
        )
    }

    /// Current value regardless of change tracking.
    pub fn get(&self) -> T {
        self.source
            .value
            .read()
            .expect("Dynamic lock poisoned")
            .clone()
    }

    /// Version last returned by [`poll`](Subscription::poll).
    pub fn last_observed_version(&self) -> u64 {
        self.last_version
    }
}
