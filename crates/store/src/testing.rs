//! Testing utilities for counter-store failure behavior
//!
//! The versioner's failure semantics (whole-batch abort, no silent
//! un-versioned keys) can only be tested against a store that fails on
//! demand. [`FailingCounterStore`] wraps any real store and injects
//! failures:
//!
//! ```ignore
//! use gencache_store::testing::FailingCounterStore;
//! use gencache_store::MemoryCounterStore;
//!
//! let store = FailingCounterStore::new(MemoryCounterStore::new());
//! store.fail_next(1);
//! assert!(store.incr(&key, Generation::BASELINE).is_err());
//! assert!(store.incr(&key, Generation::BASELINE).is_ok());
//! ```

use gencache_core::{CounterStore, Generation, Identity, StoreError, StoreResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Failure-injection plan for a wrapped store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureMode {
    /// Pass every operation through
    None,
    /// Fail the next N operations, then pass through
    NextN(u64),
    /// Fail every operation until reset
    Always,
}

/// Counter store wrapper that fails on demand
///
/// Failures are injected before the wrapped store is touched, so a failed
/// operation has no side effects. Both `get_multi` and `incr` count as one
/// operation each.
pub struct FailingCounterStore<S> {
    inner: S,
    mode: Mutex<FailureMode>,
    operations: AtomicU64,
}

impl<S> FailingCounterStore<S> {
    /// Wrap a store with pass-through behavior
    pub fn new(inner: S) -> Self {
        FailingCounterStore {
            inner,
            mode: Mutex::new(FailureMode::None),
            operations: AtomicU64::new(0),
        }
    }

    /// Fail the next `n` operations, then pass through again
    pub fn fail_next(&self, n: u64) {
        *self.mode.lock() = FailureMode::NextN(n);
    }

    /// Fail every operation until [`FailingCounterStore::recover`] is called
    pub fn fail_always(&self) {
        *self.mode.lock() = FailureMode::Always;
    }

    /// Stop injecting failures
    pub fn recover(&self) {
        *self.mode.lock() = FailureMode::None;
    }

    /// Total operations attempted, including failed ones
    pub fn operations(&self) -> u64 {
        self.operations.load(Ordering::Relaxed)
    }

    /// Access the wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check(&self) -> StoreResult<()> {
        self.operations.fetch_add(1, Ordering::Relaxed);
        let mut mode = self.mode.lock();
        match *mode {
            FailureMode::None => Ok(()),
            FailureMode::Always => Err(StoreError::Unavailable("injected outage".to_string())),
            FailureMode::NextN(remaining) => {
                *mode = if remaining > 1 {
                    FailureMode::NextN(remaining - 1)
                } else {
                    FailureMode::None
                };
                Err(StoreError::Unavailable("injected outage".to_string()))
            }
        }
    }
}

impl<S: CounterStore> CounterStore for FailingCounterStore<S> {
    fn get_multi(&self, keys: &[Identity]) -> StoreResult<Vec<(Identity, Generation)>> {
        self.check()?;
        self.inner.get_multi(keys)
    }

    fn incr(&self, key: &Identity, start: Generation) -> StoreResult<Generation> {
        self.check()?;
        self.inner.incr(key, start)
    }
}
