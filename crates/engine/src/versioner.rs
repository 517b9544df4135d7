//! The versioner: generation-stamped cache keys and mutation-driven bumps
//!
//! Two operations, both stateless request/response calls composed from
//! counter-store round-trips:
//!
//! - [`Versioner::get_multi_keys`] turns a batch of subjects into cache keys
//!   carrying the current generation of every identity, with ONE batched
//!   store read regardless of batch size.
//! - [`Versioner::increment`] bumps a subject's generation after a mutation.
//!   For a record instance it also bumps the owning type's generation, so
//!   collection-level caches ("list of all orders") invalidate along with
//!   the single record.
//!
//! The two bumps of the dual-increment protocol are not atomic with respect
//! to each other or to concurrent reads. A reader may observe the instance
//! generation bumped but not yet the type generation, or vice versa; the
//! scheme is eventually consistent and a missed read only serves a slightly
//! stale cache entry, never an incorrect write.

use crate::resolver::IdentityResolver;
use gencache_core::{CacheKey, CounterStore, Generation, Identity, Result, Subject};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Batch-resolves cache keys and drives generation increments
///
/// Holds no mutable entity state of its own: the resolver is immutable after
/// construction and the counter store owns all generation state.
pub struct Versioner {
    resolver: Arc<IdentityResolver>,
    store: Arc<dyn CounterStore>,
}

impl Versioner {
    /// Create a versioner over a resolver and a counter store
    pub fn new(resolver: Arc<IdentityResolver>, store: Arc<dyn CounterStore>) -> Self {
        Versioner { resolver, store }
    }

    /// The resolver this versioner derives identities through
    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Build generation-stamped cache keys for a batch of subjects
    ///
    /// Returns one key per input subject, in input order, duplicates
    /// included. Identities missing from the store response are stamped with
    /// the baseline generation. The store response is correlated by key,
    /// since its order is unspecified by contract.
    ///
    /// # Errors
    ///
    /// Any resolution or store failure aborts the whole batch; no partial
    /// key list is ever returned.
    pub fn get_multi_keys(&self, subjects: &[Subject]) -> Result<Vec<CacheKey>> {
        let identities = subjects
            .iter()
            .map(|subject| self.resolver.identify(subject))
            .collect::<Result<Vec<_>>>()?;

        let current: FxHashMap<Identity, Generation> =
            self.store.get_multi(&identities)?.into_iter().collect();

        let keys: Vec<CacheKey> = identities
            .into_iter()
            .map(|identity| {
                let generation = current
                    .get(&identity)
                    .copied()
                    .unwrap_or(Generation::BASELINE);
                CacheKey::new(identity, generation)
            })
            .collect();

        trace!(batch = keys.len(), "built generation-stamped cache keys");
        Ok(keys)
    }

    /// Bump the generation of a subject after a mutation
    ///
    /// Equivalent to [`Versioner::increment_from`] with the baseline start.
    pub fn increment(&self, subject: &Subject) -> Result<()> {
        self.increment_from(subject, Generation::BASELINE)
    }

    /// Bump the generation of a subject, creating absent counters at `start`
    ///
    /// A record instance gets two bumps: its own identity and its owning
    /// type's identity. A bare type (or any non-record subject) gets exactly
    /// one. `start` is passed through to the counter store; its effect on an
    /// absent counter is store-defined first-touch initialization.
    ///
    /// # Errors
    ///
    /// Any resolution or store failure is surfaced unchanged; this core adds
    /// no retry logic.
    pub fn increment_from(&self, subject: &Subject, start: Generation) -> Result<()> {
        let identity = self.resolver.identify(subject)?;
        let generation = self.store.incr(&identity, start)?;
        debug!(identity = %identity, generation = %generation, "bumped generation");

        if let Some(schema) = subject.owning_type() {
            let type_identity = self.resolver.identify_type(schema)?;
            let type_generation = self.store.incr(&type_identity, start)?;
            debug!(
                identity = %type_identity,
                generation = %type_generation,
                "bumped owning-type generation"
            );
        }

        Ok(())
    }
}

impl std::fmt::Debug for Versioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Versioner")
            .field("resolver", &self.resolver)
            .finish()
    }
}
