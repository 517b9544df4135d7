//! Counter-store contract
//!
//! This module defines the [`CounterStore`] trait that decouples the
//! versioner from whatever service actually owns generation state: a
//! remote key-value store with atomic increment in production, an in-memory
//! map in tests. Swapping backends must not touch the layers above.
//!
//! ## Contract
//!
//! - `get_multi` returns one `(key, generation)` pair per input key, but the
//!   response order is NOT required to match the input order. Callers must
//!   correlate by key, never by position.
//! - `incr` is atomic per key: concurrent increments of the same key must
//!   all be observed, in some order. Cross-key atomicity is not provided and
//!   not assumed.
//! - Counters are created lazily on first access and never destroyed.

use crate::error::StoreResult;
use crate::identity::{Generation, Identity};

/// External owner of generation counters
///
/// The store is the sole owner of generation state; the identity resolver
/// and versioner hold no mutable entity state themselves.
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait CounterStore: Send + Sync {
    /// Fetch current generations for a batch of identities
    ///
    /// Returns one pair per input key that the store knows about; a store
    /// may omit keys it has never seen (callers treat those as baseline).
    /// Response order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or the read fails. The
    /// caller aborts the whole batch; an un-versioned key must never be
    /// silently substituted.
    fn get_multi(&self, keys: &[Identity]) -> StoreResult<Vec<(Identity, Generation)>>;

    /// Atomically increment one counter, creating it at `start` if absent
    ///
    /// The first increment of an absent counter yields `start.next()`.
    /// Returns the post-increment generation.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or the write fails.
    fn incr(&self, key: &Identity, start: Generation) -> StoreResult<Generation>;
}
