//! Identity, generation, and cache-key types
//!
//! These types express the two halves of the invalidation scheme:
//!
//! - **Identity**: a deterministic string naming a value or type.
//! - **Generation**: a monotonic per-identity counter owned by the counter
//!   store. Bumping it invalidates every cache entry keyed on the old
//!   generation.
//!
//! A [`CacheKey`] combines the two: `<identity>:v=<generation>`. It is
//! derived on every lookup and never persisted independently of the counter
//! store.
//!
//! ## Contract
//!
//! - Two logically equal values yield identical identities.
//! - Identity derivation is pure: no I/O, no side effects.
//! - Generations start at [`Generation::BASELINE`] and never decrease.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic string identity of a value or type
///
/// Identities are produced by the identity resolver; this type only carries
/// the derived string. Composite identities are `:`-joined, record-instance
/// identities are `<name>:<col>=<value>...` in declared key-column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    /// Create an identity from an already-derived string
    pub fn new(s: impl Into<String>) -> Self {
        Identity(s.into())
    }

    /// Join element identities into a composite identity
    ///
    /// Elements are joined with `:` in the given order. Joining preserves
    /// order sensitivity: the same elements in a different order produce a
    /// different identity.
    pub fn join<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = Identity>,
    {
        let joined = parts
            .into_iter()
            .map(|p| p.0)
            .collect::<Vec<_>>()
            .join(":");
        Identity(joined)
    }

    /// Build a `key=value` pair identity for mapping entries
    pub fn pair(key: &Identity, value: &Identity) -> Self {
        Identity(format!("{}={}", key.0, value.0))
    }

    /// View the identity as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the underlying string
    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Identity(s.to_string())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Identity(s)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Monotonic per-identity generation counter
///
/// The counter store is the sole owner of generation state; this type is the
/// value it hands back. Generations are append-only: they are created at a
/// baseline, incremented on mutation, and never decrease.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    /// The implicit value of a counter that has never been incremented
    pub const BASELINE: Generation = Generation(0);

    /// Create a generation from a raw counter value
    pub const fn new(value: u64) -> Self {
        Generation(value)
    }

    /// Get the numeric counter value
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The next generation (saturating, won't overflow)
    pub const fn next(&self) -> Self {
        Generation(self.0.saturating_add(1))
    }

    /// Check if this generation is still at the baseline
    #[inline]
    pub const fn is_baseline(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Generation {
    fn from(value: u64) -> Self {
        Generation(value)
    }
}

/// Generation-stamped cache key: `<identity>:v=<generation>`
///
/// Derived, not stored. A reader and a writer that resolve the same subject
/// through the same resolver get the same identity, so embedding the current
/// generation is all the invalidation protocol needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    identity: Identity,
    generation: Generation,
}

impl CacheKey {
    /// Stamp an identity with a generation
    pub fn new(identity: Identity, generation: Generation) -> Self {
        CacheKey {
            identity,
            generation,
        }
    }

    /// The identity half of the key
    #[inline]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The generation half of the key
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Render the key in its wire form, `<identity>:v=<generation>`
    pub fn render(&self) -> String {
        format!("{}:v={}", self.identity, self.generation)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:v={}", self.identity, self.generation)
    }
}
