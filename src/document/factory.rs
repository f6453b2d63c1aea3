//! # Document Factory
//!
//! Turns a document type name into a [`DocumentRecord`]:
//!
//! 1. Normalize the name (surrounding whitespace is not part of it).
//! 2. Reject names the [`SchemaRegistry`] does not know, before touching the cache.
//! 3. On a cache miss, fetch the field definition and schema reference,
//!    synthesize the record type, instantiate the prototype once and offer
//!    it to the [`PrototypeCache`] (first writer wins).
//! 4. Hand back an independent copy of whichever prototype is cached.
//!
//! Synthesis is the expensive step; a hit costs one copy of the values.
//! A reclaimed cache entry is just another miss.

use super::cache::PrototypeCache;
use super::error::DocumentError;
use super::record::{DocumentPrototype, DocumentRecord, DocumentTypeBuilder};
use crate::schema::{BusinessProcess, ProcessLookup, SchemaRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Produces business documents from the schema registry, reusing cached prototypes.
pub struct DocumentFactory {
    schemas: Arc<dyn SchemaRegistry>,
    processes: Arc<dyn ProcessLookup>,
    cache: Arc<PrototypeCache>,
}

impl DocumentFactory {
    pub fn new(
        schemas: Arc<dyn SchemaRegistry>,
        processes: Arc<dyn ProcessLookup>,
        cache: Arc<PrototypeCache>,
    ) -> Self {
        Self {
            schemas,
            processes,
            cache,
        }
    }

    pub fn cache(&self) -> &PrototypeCache {
        &self.cache
    }

    pub fn schemas(&self) -> &dyn SchemaRegistry {
        self.schemas.as_ref()
    }

    /// Produces a fresh record of the named document type.
    ///
    /// # Errors
    /// - [`DocumentError::UnrecognizedDocumentType`] if the registry does not know `name`.
    /// - [`DocumentError::MalformedDefinition`] if its field definition cannot be synthesized.
    pub fn produce(&self, name: &str) -> Result<DocumentRecord, DocumentError> {
        let name = canonical_name(name);
        if !self.schemas.is_known(name) {
            warn!(document = name, "Unrecognized document type");
            return Err(DocumentError::UnrecognizedDocumentType(name.to_string()));
        }

        let prototype = match self.cache.get(name) {
            Some(prototype) => prototype,
            None => {
                let synthesized = Arc::new(self.synthesize(name)?);
                self.cache.put(name, synthesized)
            }
        };

        debug!(document = name, "Produced document");
        Ok(prototype.duplicate())
    }

    /// Lazily produces one record per document the process exchanges.
    ///
    /// The process lookup runs now; each record is only synthesized when the
    /// iterator reaches it. The iterator is consumed by traversal: calling
    /// this again starts over (and may hit prototypes the first pass cached).
    pub fn produce_for_process(
        &self,
        process: BusinessProcess,
        documents: Option<&[String]>,
    ) -> ProcessDocuments<'_> {
        let names = self.processes.documents_for_process(process, documents);
        debug!(%process, count = names.len(), "Resolved process documents");
        ProcessDocuments {
            factory: self,
            process,
            names: names.into_iter(),
        }
    }

    fn synthesize(&self, name: &str) -> Result<DocumentPrototype, DocumentError> {
        let fields = self.schemas.field_definition(name).ok_or_else(|| {
            DocumentError::MalformedDefinition {
                document: name.to_string(),
                reason: "registry lists the type but has no field definition".into(),
            }
        })?;
        let schema_reference = self.schemas.schema_reference(name).unwrap_or_default();

        let doc_type = DocumentTypeBuilder::new(name)
            .schema_reference(schema_reference)
            .fields(fields)
            .build()?;
        info!(
            document = name,
            fields = doc_type.fields().len(),
            schema = doc_type.schema_reference(),
            "Synthesized document type"
        );
        Ok(Arc::new(doc_type).instantiate())
    }
}

/// Canonical form of a document type name.
pub fn canonical_name(name: &str) -> &str {
    name.trim()
}

/// Lazy sequence of the documents of one business process.
///
/// See [`DocumentFactory::produce_for_process`].
pub struct ProcessDocuments<'a> {
    factory: &'a DocumentFactory,
    process: BusinessProcess,
    names: std::vec::IntoIter<String>,
}

impl ProcessDocuments<'_> {
    pub fn process(&self) -> BusinessProcess {
        self.process
    }

    /// Names not yet produced, in order.
    pub fn remaining(&self) -> &[String] {
        self.names.as_slice()
    }
}

impl Iterator for ProcessDocuments<'_> {
    type Item = Result<DocumentRecord, DocumentError>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.names.next()?;
        Some(self.factory.produce(&name))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

impl ExactSizeIterator for ProcessDocuments<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FieldValue;
    use crate::schema::mock::MockSchemaRegistry;
    use crate::schema::FieldType;

    fn factory_with(mock: &Arc<MockSchemaRegistry>) -> DocumentFactory {
        DocumentFactory::new(mock.clone(), mock.clone(), Arc::new(PrototypeCache::new()))
    }

    fn order_mock() -> Arc<MockSchemaRegistry> {
        let mock = Arc::new(MockSchemaRegistry::new());
        mock.expect_document("Order")
            .schema("urn:test:Order")
            .return_fields([
                ("ID", FieldType::Identifier),
                ("Total", FieldType::Amount),
            ]);
        mock
    }

    #[test]
    fn test_produce_normalizes_the_name() {
        let mock = order_mock();
        let factory = factory_with(&mock);

        let record = factory.produce("  Order\n").unwrap();
        assert_eq!(record.name(), "Order");
        assert_eq!(record.schema_reference(), "urn:test:Order");
    }

    #[test]
    fn test_unknown_type_never_touches_cache_or_registry() {
        let mock = order_mock();
        let factory = factory_with(&mock);

        let err = factory.produce("NotARealDocument").unwrap_err();
        assert_eq!(
            err,
            DocumentError::UnrecognizedDocumentType("NotARealDocument".into())
        );
        let stats = factory.cache().stats();
        assert_eq!((stats.hits, stats.misses), (0, 0));
        assert_eq!(mock.total_definition_calls(), 0);
    }

    #[test]
    fn test_live_records_keep_the_prototype_cached() {
        let mock = order_mock();
        let factory = factory_with(&mock);

        let first = factory.produce("Order").unwrap();
        let second = factory.produce("Order").unwrap();
        assert_eq!(mock.definition_calls("Order"), 1);
        assert!(first.shares_prototype_with(&second));
        assert_eq!(factory.cache().stats().hits, 1);
    }

    #[test]
    fn test_reclaimed_prototype_is_rebuilt() {
        let mock = order_mock();
        let factory = factory_with(&mock);

        drop(factory.produce("Order").unwrap());
        assert!(!factory.cache().contains("Order"));

        let again = factory.produce("Order").unwrap();
        assert_eq!(again.get("Total").unwrap(), &FieldValue::amount(0.0, ""));
        assert_eq!(mock.definition_calls("Order"), 2);
    }

    #[test]
    fn test_known_type_without_definition_is_malformed() {
        struct ListsOnly;
        impl SchemaRegistry for ListsOnly {
            fn field_definition(&self, _: &str) -> Option<Vec<crate::schema::FieldDef>> {
                None
            }
            fn schema_reference(&self, _: &str) -> Option<String> {
                None
            }
            fn known_type_names(&self) -> std::collections::BTreeSet<String> {
                ["Ghost".to_string()].into_iter().collect()
            }
        }

        let factory = DocumentFactory::new(
            Arc::new(ListsOnly),
            Arc::new(MockSchemaRegistry::new()),
            Arc::new(PrototypeCache::new()),
        );
        let err = factory.produce("Ghost").unwrap_err();
        assert!(matches!(err, DocumentError::MalformedDefinition { .. }));
        assert!(factory.cache().is_empty());
    }
}
