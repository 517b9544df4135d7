//! Mutation-event integration
//!
//! The invalidation protocol wants generation bumps *after* a transaction
//! commits: bumping for a transaction that later rolls back would invalidate
//! caches for nothing, and bumping before commit lets readers re-fill caches
//! from pre-commit state under a post-commit key.
//!
//! [`MutationTracker`] is the glue a transactional persistence layer hooks
//! into: it collects the records a transaction touched, then flushes one
//! increment per record once the commit succeeds, or discards them on
//! rollback. The tracker does not deduplicate or filter; callers should
//! pre-filter to cacheable records, and an increment for a non-cacheable record
//! is harmless but wasteful.

use crate::versioner::Versioner;
use gencache_core::{Record, Result, Subject};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Collects records mutated by an in-flight transaction
///
/// One tracker per transaction scope. `touch` during the transaction,
/// `commit` after the transaction commits, `rollback` if it doesn't.
#[derive(Default)]
pub struct MutationTracker {
    pending: Mutex<Vec<Arc<dyn Record>>>,
}

impl MutationTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        MutationTracker {
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Note a record as mutated by the current transaction
    pub fn touch(&self, record: Arc<dyn Record>) {
        self.pending.lock().push(record);
    }

    /// Number of records waiting to be flushed
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Flush one increment per touched record, after a successful commit
    ///
    /// Records are only removed from the tracker once every increment has
    /// landed, so a failed flush can be retried; a record bumped twice by a
    /// retry costs one extra cache miss and nothing else. Touches that race
    /// the flush stay pending for the next commit.
    ///
    /// # Errors
    ///
    /// Surfaces the first resolution or store failure. Increments already
    /// issued stay issued.
    pub fn commit(&self, versioner: &Versioner) -> Result<()> {
        let dirty: Vec<Arc<dyn Record>> = self.pending.lock().clone();
        if dirty.is_empty() {
            return Ok(());
        }

        for record in &dirty {
            versioner.increment(&Subject::shared_record(Arc::clone(record)))?;
        }

        self.pending.lock().drain(..dirty.len());
        debug!(records = dirty.len(), "flushed mutation batch");
        Ok(())
    }

    /// Discard touched records without incrementing anything
    pub fn rollback(&self) {
        let discarded = {
            let mut pending = self.pending.lock();
            let n = pending.len();
            pending.clear();
            n
        };
        if discarded > 0 {
            debug!(records = discarded, "discarded mutation batch");
        }
    }
}

impl std::fmt::Debug for MutationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationTracker")
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::IdentityResolver;
    use gencache_core::{CounterStore, FamilyId, Generation, Identity, RecordSchema, Scalar};
    use gencache_store::testing::FailingCounterStore;
    use gencache_store::MemoryCounterStore;
    use once_cell::sync::Lazy;

    static ORDER: Lazy<Arc<RecordSchema>> =
        Lazy::new(|| RecordSchema::new(FamilyId::new("sql"), "Order", ["id"]));

    struct Order {
        id: u64,
    }

    impl Record for Order {
        fn schema(&self) -> &Arc<RecordSchema> {
            &ORDER
        }

        fn key_values(&self) -> Vec<Scalar> {
            vec![Scalar::Uint(self.id)]
        }
    }

    fn versioner(store: Arc<dyn CounterStore>) -> Versioner {
        Versioner::new(
            Arc::new(
                IdentityResolver::builder()
                    .register_keyed_family(FamilyId::new("sql"))
                    .unwrap()
                    .build(),
            ),
            store,
        )
    }

    #[test]
    fn test_commit_bumps_each_touched_record() {
        let store = Arc::new(MemoryCounterStore::new());
        let versioner = versioner(Arc::clone(&store) as Arc<dyn CounterStore>);
        let tracker = MutationTracker::new();

        tracker.touch(Arc::new(Order { id: 7 }));
        tracker.touch(Arc::new(Order { id: 8 }));
        assert_eq!(tracker.pending(), 2);

        tracker.commit(&versioner).unwrap();

        assert_eq!(tracker.pending(), 0);
        assert_eq!(
            store.current(&Identity::from("Order:id=7")),
            Some(Generation::new(1))
        );
        assert_eq!(
            store.current(&Identity::from("Order:id=8")),
            Some(Generation::new(1))
        );
        // One type-level bump per touched instance
        assert_eq!(
            store.current(&Identity::from("Order")),
            Some(Generation::new(2))
        );
    }

    #[test]
    fn test_commit_does_not_dedup() {
        let store = Arc::new(MemoryCounterStore::new());
        let versioner = versioner(Arc::clone(&store) as Arc<dyn CounterStore>);
        let tracker = MutationTracker::new();

        tracker.touch(Arc::new(Order { id: 7 }));
        tracker.touch(Arc::new(Order { id: 7 }));
        tracker.commit(&versioner).unwrap();

        assert_eq!(
            store.current(&Identity::from("Order:id=7")),
            Some(Generation::new(2))
        );
    }

    #[test]
    fn test_rollback_discards_without_bumping() {
        let store = Arc::new(MemoryCounterStore::new());
        let versioner = versioner(Arc::clone(&store) as Arc<dyn CounterStore>);
        let tracker = MutationTracker::new();

        tracker.touch(Arc::new(Order { id: 7 }));
        tracker.rollback();
        tracker.commit(&versioner).unwrap();

        assert_eq!(tracker.pending(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_commit_is_a_no_op() {
        let store = Arc::new(MemoryCounterStore::new());
        let versioner = versioner(Arc::clone(&store) as Arc<dyn CounterStore>);
        let tracker = MutationTracker::new();

        tracker.commit(&versioner).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_flush_keeps_records_for_retry() {
        let store = Arc::new(FailingCounterStore::new(MemoryCounterStore::new()));
        let versioner = versioner(Arc::clone(&store) as Arc<dyn CounterStore>);
        let tracker = MutationTracker::new();

        tracker.touch(Arc::new(Order { id: 7 }));

        store.fail_always();
        assert!(tracker.commit(&versioner).is_err());
        assert_eq!(tracker.pending(), 1);

        store.recover();
        tracker.commit(&versioner).unwrap();
        assert_eq!(tracker.pending(), 0);
        assert_eq!(
            store.inner().current(&Identity::from("Order:id=7")),
            Some(Generation::new(1))
        );
    }
}
