//! Counter-store implementations for gencache
//!
//! The counter store owns all generation state, behind the narrow
//! `CounterStore` contract from `gencache-core`. This crate provides:
//!
//! - [`MemoryCounterStore`]: DashMap-backed in-process counters for
//!   embedded, development, and test use
//! - [`testing`]: failure-injection wrapper for exercising outage paths
//!
//! A production deployment points the versioner at a remote store client
//! (a key-value service with atomic increment) implementing the same trait.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod testing;

pub use memory::MemoryCounterStore;
