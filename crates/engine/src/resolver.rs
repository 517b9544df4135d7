//! Identity resolution
//!
//! The resolver maps any [`Subject`] to its deterministic string
//! [`Identity`]. Built-in shapes (scalars, sequences, mappings) are handled
//! directly; structured records dispatch through a registry of
//! [`RecordFamily`] handlers keyed by [`FamilyId`].
//!
//! The registry allows new record families to be registered without
//! modifying existing handlers: a persistence integration registers its
//! family once at configuration time and every record type it maps becomes
//! identifiable.
//!
//! ## Usage
//!
//! ```ignore
//! let resolver = IdentityResolver::builder()
//!     .register_keyed_family(FamilyId::new("sql"))?
//!     .build();
//!
//! let identity = resolver.identify(&Subject::record(order))?;
//! assert_eq!(identity.as_str(), "Order:id=7");
//! ```
//!
//! There is no ambient global registry: the resolver is an explicit
//! instance, constructed once at startup and passed by reference to every
//! consumer. Both the versioner and the commit hook resolve through the
//! same instance, which is what guarantees key/counter correspondence.

use gencache_core::{Error, FamilyId, Identity, Record, RecordSchema, Result, Subject};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Identity handler for one record family
///
/// A family handler derives identities for every record type of one
/// integration (one ORM base class, one table mapper). Implementations must
/// be pure: no I/O, no side effects, same input same output.
pub trait RecordFamily: Send + Sync {
    /// Derive the identity of a record instance
    ///
    /// # Errors
    ///
    /// Returns `MissingKeyDefinition` if the record's key metadata cannot
    /// produce an unambiguous identity.
    fn identify_record(&self, record: &dyn Record) -> Result<Identity>;

    /// Derive the identity of a bare record type
    fn identify_type(&self, schema: &RecordSchema) -> Result<Identity>;
}

/// Stock family handler for records with declared key columns
///
/// Implements the standard rules:
/// - instance: `<name>:<col1>=<v1>:<col2>=<v2>...` in declared column order
/// - bare type: `<name>`
///
/// A schema with zero key columns would produce an identity
/// indistinguishable from unrelated instances of the same type, so instance
/// derivation fails with `MissingKeyDefinition` instead.
#[derive(Debug, Default)]
pub struct KeyedFamily;

impl KeyedFamily {
    /// Create the stock handler
    pub fn new() -> Self {
        KeyedFamily
    }
}

impl RecordFamily for KeyedFamily {
    fn identify_record(&self, record: &dyn Record) -> Result<Identity> {
        let schema = record.schema();
        if !schema.has_key_columns() {
            return Err(Error::MissingKeyDefinition {
                record: schema.name.clone(),
                reason: "schema declares zero primary-key columns".to_string(),
            });
        }

        let values = record.key_values();
        if values.len() != schema.primary_key.len() {
            return Err(Error::MissingKeyDefinition {
                record: schema.name.clone(),
                reason: format!(
                    "expected {} key values, got {}",
                    schema.primary_key.len(),
                    values.len()
                ),
            });
        }

        // user_message with composite key (user_id, id) and values (123, 456)
        // renders as "user_message:user_id=123:id=456"
        let mut parts = Vec::with_capacity(1 + values.len());
        parts.push(Identity::new(schema.name.clone()));
        for (column, value) in schema.primary_key.iter().zip(values) {
            parts.push(Identity::pair(
                &Identity::new(column.clone()),
                &Identity::new(value.to_string()),
            ));
        }
        Ok(Identity::join(parts))
    }

    fn identify_type(&self, schema: &RecordSchema) -> Result<Identity> {
        Ok(Identity::new(schema.name.clone()))
    }
}

/// Maps subjects to deterministic string identities
///
/// Construct with [`IdentityResolver::builder`]. The resolver holds no
/// mutable state after construction and is freely shareable across threads.
pub struct IdentityResolver {
    families: FxHashMap<FamilyId, Arc<dyn RecordFamily>>,
}

impl IdentityResolver {
    /// Start building a resolver
    pub fn builder() -> IdentityResolverBuilder {
        IdentityResolverBuilder {
            families: FxHashMap::default(),
        }
    }

    /// Derive the identity of a subject
    ///
    /// Derivation is pure and recursive: composite shapes resolve their
    /// elements through this same method, so a sequence of records works the
    /// same as a sequence of strings.
    ///
    /// # Errors
    ///
    /// - `UnresolvedShape` if a record's family has no registered handler
    /// - `MissingKeyDefinition` if record key metadata is unusable
    pub fn identify(&self, subject: &Subject) -> Result<Identity> {
        match subject {
            Subject::Str(s) => Ok(Identity::new(s.clone())),
            Subject::Bool(b) => Ok(Identity::new(b.to_string())),
            Subject::Int(i) => Ok(Identity::new(i.to_string())),
            Subject::Uint(u) => Ok(Identity::new(u.to_string())),
            Subject::Float(x) => Ok(Identity::new(x.to_string())),
            Subject::Seq(elems) => {
                let parts = elems
                    .iter()
                    .map(|elem| self.identify(elem))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Identity::join(parts))
            }
            Subject::Map(pairs) => {
                let parts = pairs
                    .iter()
                    .map(|(key, value)| {
                        Ok(Identity::pair(&self.identify(key)?, &self.identify(value)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Identity::join(parts))
            }
            Subject::Record(record) => self
                .family_for(&record.schema().family)?
                .identify_record(record.as_ref()),
            Subject::Type(schema) => self.identify_type(schema),
        }
    }

    /// Derive the identity of a bare record type
    ///
    /// Used directly by the versioner's dual-increment protocol, which needs
    /// the owning type's identity without constructing a subject.
    pub fn identify_type(&self, schema: &RecordSchema) -> Result<Identity> {
        self.family_for(&schema.family)?.identify_type(schema)
    }

    /// Check if a family has a registered handler
    pub fn knows_family(&self, family: &FamilyId) -> bool {
        self.families.contains_key(family)
    }

    fn family_for(&self, family: &FamilyId) -> Result<&Arc<dyn RecordFamily>> {
        self.families.get(family).ok_or_else(|| Error::UnresolvedShape {
            family: family.clone(),
        })
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("families", &self.families.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`IdentityResolver`]
///
/// Registration happens here, at configuration time; the built resolver is
/// immutable. Registering the same family twice is a configuration bug and
/// fails fast with `DuplicateFamily`.
pub struct IdentityResolverBuilder {
    families: FxHashMap<FamilyId, Arc<dyn RecordFamily>>,
}

impl IdentityResolverBuilder {
    /// Register a handler for a record family
    ///
    /// # Errors
    ///
    /// Returns `DuplicateFamily` if the family is already registered.
    pub fn register_family(
        mut self,
        family: FamilyId,
        handler: Arc<dyn RecordFamily>,
    ) -> Result<Self> {
        if self.families.contains_key(&family) {
            return Err(Error::DuplicateFamily { family });
        }
        self.families.insert(family, handler);
        Ok(self)
    }

    /// Register the stock [`KeyedFamily`] handler for a family
    ///
    /// # Errors
    ///
    /// Returns `DuplicateFamily` if the family is already registered.
    pub fn register_keyed_family(self, family: FamilyId) -> Result<Self> {
        self.register_family(family, Arc::new(KeyedFamily::new()))
    }

    /// Finish building
    pub fn build(self) -> IdentityResolver {
        IdentityResolver {
            families: self.families,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gencache_core::Scalar;
    use once_cell::sync::Lazy;
    use proptest::prelude::*;

    static ORDER: Lazy<Arc<RecordSchema>> =
        Lazy::new(|| RecordSchema::new(FamilyId::new("sql"), "Order", ["id"]));

    static USER_MESSAGE: Lazy<Arc<RecordSchema>> = Lazy::new(|| {
        RecordSchema::new(FamilyId::new("sql"), "user_message", ["user_id", "id"])
    });

    static AUDIT_LOG: Lazy<Arc<RecordSchema>> =
        Lazy::new(|| RecordSchema::new(FamilyId::new("sql"), "audit_log", Vec::<String>::new()));

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

    struct UserMessage {
        user_id: u64,
        id: u64,
    }

    impl Record for UserMessage {
        fn schema(&self) -> &Arc<RecordSchema> {
            &USER_MESSAGE
        }

        fn key_values(&self) -> Vec<Scalar> {
            vec![Scalar::Uint(self.user_id), Scalar::Uint(self.id)]
        }
    }

    struct AuditLog;

    impl Record for AuditLog {
        fn schema(&self) -> &Arc<RecordSchema> {
            &AUDIT_LOG
        }

        fn key_values(&self) -> Vec<Scalar> {
            vec![]
        }
    }

    /// Record that lies about its key arity
    struct BrokenOrder;

    impl Record for BrokenOrder {
        fn schema(&self) -> &Arc<RecordSchema> {
            &ORDER
        }

        fn key_values(&self) -> Vec<Scalar> {
            vec![]
        }
    }

    fn sql_resolver() -> IdentityResolver {
        IdentityResolver::builder()
            .register_keyed_family(FamilyId::new("sql"))
            .unwrap()
            .build()
    }

    #[test]
    fn test_string_identity_is_itself() {
        let resolver = sql_resolver();
        let identity = resolver.identify(&Subject::from("users")).unwrap();
        assert_eq!(identity.as_str(), "users");
    }

    #[test]
    fn test_scalar_identities() {
        let resolver = sql_resolver();
        assert_eq!(resolver.identify(&Subject::from(true)).unwrap().as_str(), "true");
        assert_eq!(resolver.identify(&Subject::from(-3i64)).unwrap().as_str(), "-3");
        assert_eq!(resolver.identify(&Subject::from(7u64)).unwrap().as_str(), "7");
        assert_eq!(resolver.identify(&Subject::from(2.5f64)).unwrap().as_str(), "2.5");
    }

    #[test]
    fn test_sequence_identity_joins_in_order() {
        let resolver = sql_resolver();
        let identity = resolver
            .identify(&Subject::seq(["users", "active", "page1"]))
            .unwrap();
        assert_eq!(identity.as_str(), "users:active:page1");
    }

    #[test]
    fn test_sequence_order_sensitivity() {
        // Same elements in a different order are a different identity.
        // Intended, not a bug: the sequence's order is part of its structure.
        let resolver = sql_resolver();
        let ab = resolver.identify(&Subject::seq(["a", "b"])).unwrap();
        let ba = resolver.identify(&Subject::seq(["b", "a"])).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_mapping_identity_in_given_order() {
        let resolver = sql_resolver();
        let identity = resolver
            .identify(&Subject::map([("a", 1i64), ("b", 2i64)]))
            .unwrap();
        assert_eq!(identity.as_str(), "a=1:b=2");
    }

    #[test]
    fn test_nested_composite_identity() {
        let resolver = sql_resolver();
        let subject = Subject::map([(
            Subject::from("filters"),
            Subject::seq(["active", "recent"]),
        )]);
        let identity = resolver.identify(&subject).unwrap();
        assert_eq!(identity.as_str(), "filters=active:recent");
    }

    #[test]
    fn test_record_instance_identity() {
        let resolver = sql_resolver();
        let identity = resolver.identify(&Subject::record(Order { id: 7 })).unwrap();
        assert_eq!(identity.as_str(), "Order:id=7");
    }

    #[test]
    fn test_record_composite_key_identity() {
        let resolver = sql_resolver();
        let identity = resolver
            .identify(&Subject::record(UserMessage {
                user_id: 123,
                id: 456,
            }))
            .unwrap();
        assert_eq!(identity.as_str(), "user_message:user_id=123:id=456");
    }

    #[test]
    fn test_bare_type_identity_is_name() {
        let resolver = sql_resolver();
        let identity = resolver.identify(&Subject::record_type(&ORDER)).unwrap();
        assert_eq!(identity.as_str(), "Order");
    }

    #[test]
    fn test_instance_and_type_identities_from_same_schema() {
        let resolver = sql_resolver();
        let instance = resolver.identify(&Subject::record(Order { id: 7 })).unwrap();
        let bare = resolver.identify(&Subject::record_type(&ORDER)).unwrap();
        assert_eq!(instance.as_str(), "Order:id=7");
        assert_eq!(bare.as_str(), "Order");
    }

    #[test]
    fn test_unregistered_family_is_an_error() {
        let resolver = IdentityResolver::builder().build();
        let result = resolver.identify(&Subject::record(Order { id: 7 }));
        assert!(matches!(result, Err(Error::UnresolvedShape { .. })));
    }

    #[test]
    fn test_unregistered_family_inside_composite_fails_whole_derivation() {
        let resolver = IdentityResolver::builder().build();
        let subject = Subject::Seq(vec![
            Subject::from("prefix"),
            Subject::record(Order { id: 7 }),
        ]);
        assert!(resolver.identify(&subject).is_err());
    }

    #[test]
    fn test_zero_key_columns_fails_fast() {
        let resolver = sql_resolver();
        let result = resolver.identify(&Subject::record(AuditLog));
        match result {
            Err(Error::MissingKeyDefinition { record, .. }) => assert_eq!(record, "audit_log"),
            other => panic!("expected MissingKeyDefinition, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_key_columns_bare_type_still_identifies() {
        // The degenerate case is instance identity; the type name alone is
        // unambiguous.
        let resolver = sql_resolver();
        let identity = resolver.identify(&Subject::record_type(&AUDIT_LOG)).unwrap();
        assert_eq!(identity.as_str(), "audit_log");
    }

    #[test]
    fn test_key_arity_mismatch_fails() {
        let resolver = sql_resolver();
        let result = resolver.identify(&Subject::record(BrokenOrder));
        assert!(matches!(result, Err(Error::MissingKeyDefinition { .. })));
    }

    #[test]
    fn test_duplicate_family_registration_fails() {
        let result = IdentityResolver::builder()
            .register_keyed_family(FamilyId::new("sql"))
            .unwrap()
            .register_keyed_family(FamilyId::new("sql"));
        assert!(matches!(result, Err(Error::DuplicateFamily { .. })));
    }

    #[test]
    fn test_knows_family() {
        let resolver = sql_resolver();
        assert!(resolver.knows_family(&FamilyId::new("sql")));
        assert!(!resolver.knows_family(&FamilyId::new("doc")));
    }

    #[test]
    fn test_custom_family_handler() {
        /// Handler that namespaces identities with its family id
        struct Namespaced;

        impl RecordFamily for Namespaced {
            fn identify_record(&self, record: &dyn Record) -> Result<Identity> {
                let schema = record.schema();
                let keys = record
                    .key_values()
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(":");
                Ok(Identity::new(format!(
                    "{}.{}:{}",
                    schema.family, schema.name, keys
                )))
            }

            fn identify_type(&self, schema: &RecordSchema) -> Result<Identity> {
                Ok(Identity::new(format!("{}.{}", schema.family, schema.name)))
            }
        }

        static DOC: Lazy<Arc<RecordSchema>> =
            Lazy::new(|| RecordSchema::new(FamilyId::new("doc"), "Page", ["slug"]));

        struct Page;

        impl Record for Page {
            fn schema(&self) -> &Arc<RecordSchema> {
                &DOC
            }

            fn key_values(&self) -> Vec<Scalar> {
                vec![Scalar::from("home")]
            }
        }

        let resolver = IdentityResolver::builder()
            .register_family(FamilyId::new("doc"), Arc::new(Namespaced))
            .unwrap()
            .build();

        let identity = resolver.identify(&Subject::record(Page)).unwrap();
        assert_eq!(identity.as_str(), "doc.Page:home");
        let type_identity = resolver.identify(&Subject::record_type(&DOC)).unwrap();
        assert_eq!(type_identity.as_str(), "doc.Page");
    }

    // =========================================================================
    // Property tests
    // =========================================================================

    fn arb_subject() -> impl Strategy<Value = Subject> {
        let leaf = prop_oneof![
            "[a-z0-9_:=]{0,12}".prop_map(Subject::Str),
            any::<bool>().prop_map(Subject::Bool),
            any::<i64>().prop_map(Subject::Int),
            any::<u64>().prop_map(Subject::Uint),
            any::<f64>().prop_map(Subject::Float),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Subject::Seq),
                prop::collection::vec((inner.clone(), inner), 0..4).prop_map(Subject::Map),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_identify_is_deterministic(subject in arb_subject()) {
            let resolver = sql_resolver();
            let first = resolver.identify(&subject).unwrap();
            let second = resolver.identify(&subject).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_structurally_equal_subjects_agree(subject in arb_subject()) {
            let resolver = sql_resolver();
            let copy = subject.clone();
            prop_assert_eq!(
                resolver.identify(&subject).unwrap(),
                resolver.identify(&copy).unwrap()
            );
        }

        #[test]
        fn prop_resolvers_agree_on_builtin_shapes(subject in arb_subject()) {
            // Shared rules mean two independently built resolvers derive the
            // same identity, which is what lets readers and writers
            // correspond without sharing state.
            let a = sql_resolver();
            let b = IdentityResolver::builder().build();
            prop_assert_eq!(a.identify(&subject).unwrap(), b.identify(&subject).unwrap());
        }
    }
}
