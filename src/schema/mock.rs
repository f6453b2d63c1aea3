//! # Mock Schema Registry
//!
//! [`MockSchemaRegistry`] implements [`SchemaRegistry`] and [`ProcessLookup`]
//! entirely in memory and counts every lookup. Use it when a test needs to
//! prove *when* the document core consults the registry: a cache hit must
//! not fetch a field definition, and a lazily consumed process batch must
//! only fetch the documents actually reached.
//!
//! ```rust
//! use std::sync::Arc;
//! use ubl_core::document::{DocumentFactory, PrototypeCache};
//! use ubl_core::schema::mock::MockSchemaRegistry;
//! use ubl_core::schema::FieldType;
//!
//! let mock = Arc::new(MockSchemaRegistry::new());
//! mock.expect_document("Invoice")
//!     .schema("urn:test:Invoice")
//!     .return_fields([("ID", FieldType::Identifier)]);
//!
//! let factory = DocumentFactory::new(mock.clone(), mock.clone(), Arc::new(PrototypeCache::new()));
//! let first = factory.produce("Invoice").unwrap();
//! let _second = factory.produce("Invoice").unwrap();
//!
//! // `first` keeps the prototype alive, so the second call was a cache hit.
//! assert_eq!(mock.definition_calls("Invoice"), 1);
//! drop(first);
//! mock.verify();
//! ```

use super::descriptor::DocumentTypeDescriptor;
use super::field::{FieldDef, FieldType};
use super::process::BusinessProcess;
use super::{ProcessLookup, SchemaRegistry};
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A recording schema registry with fluent expectations.
#[derive(Debug, Default)]
pub struct MockSchemaRegistry {
    documents: DashMap<String, DocumentTypeDescriptor>,
    processes: DashMap<BusinessProcess, Vec<String>>,
    definition_calls: DashMap<String, usize>,
    process_calls: AtomicUsize,
}

impl MockSchemaRegistry {
    /// Creates a registry that knows no documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a document type the registry will describe.
    pub fn expect_document(&self, name: impl Into<String>) -> DocumentExpectationBuilder<'_> {
        let name = name.into();
        DocumentExpectationBuilder {
            schema: format!("urn:mock:{name}"),
            name,
            mock: self,
        }
    }

    /// Declares the documents a process exchanges.
    pub fn expect_process(&self, process: BusinessProcess) -> ProcessExpectationBuilder<'_> {
        ProcessExpectationBuilder {
            process,
            mock: self,
        }
    }

    /// How many times the field definition of `name` was fetched.
    pub fn definition_calls(&self, name: &str) -> usize {
        self.definition_calls.get(name).map(|c| *c).unwrap_or(0)
    }

    /// Field definition fetches across all documents.
    pub fn total_definition_calls(&self) -> usize {
        self.definition_calls.iter().map(|entry| *entry.value()).sum()
    }

    /// How many process lookups were made.
    pub fn process_calls(&self) -> usize {
        self.process_calls.load(Ordering::SeqCst)
    }

    /// Panics unless every declared document was fetched at least once.
    pub fn verify(&self) {
        let unused: Vec<String> = self
            .documents
            .iter()
            .filter(|entry| self.definition_calls(entry.key()) == 0)
            .map(|entry| entry.key().clone())
            .collect();
        if !unused.is_empty() {
            panic!("Not all expected documents were requested: {unused:?}");
        }
    }
}

/// Builder for document expectations.
pub struct DocumentExpectationBuilder<'a> {
    name: String,
    schema: String,
    mock: &'a MockSchemaRegistry,
}

impl DocumentExpectationBuilder<'_> {
    /// Overrides the default `urn:mock:<name>` schema reference.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Registers the document with the given fields.
    pub fn return_fields<I, S>(self, fields: I)
    where
        I: IntoIterator<Item = (S, FieldType)>,
        S: Into<String>,
    {
        let descriptor = DocumentTypeDescriptor {
            name: self.name.clone(),
            fields: fields
                .into_iter()
                .map(|(name, field_type)| FieldDef::new(name, field_type))
                .collect(),
            schema_reference: self.schema,
        };
        self.mock.documents.insert(self.name, descriptor);
    }
}

/// Builder for process expectations.
pub struct ProcessExpectationBuilder<'a> {
    process: BusinessProcess,
    mock: &'a MockSchemaRegistry,
}

impl ProcessExpectationBuilder<'_> {
    pub fn return_documents<I, S>(self, documents: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mock.processes.insert(
            self.process,
            documents.into_iter().map(Into::into).collect(),
        );
    }
}

impl SchemaRegistry for MockSchemaRegistry {
    fn field_definition(&self, name: &str) -> Option<Vec<FieldDef>> {
        *self.definition_calls.entry(name.to_string()).or_insert(0) += 1;
        self.documents.get(name).map(|d| d.fields.clone())
    }

    fn schema_reference(&self, name: &str) -> Option<String> {
        self.documents.get(name).map(|d| d.schema_reference.clone())
    }

    fn known_type_names(&self) -> BTreeSet<String> {
        self.documents.iter().map(|entry| entry.key().clone()).collect()
    }

    fn is_known(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }
}

impl ProcessLookup for MockSchemaRegistry {
    fn documents_for_process(
        &self,
        process: BusinessProcess,
        explicit: Option<&[String]>,
    ) -> Vec<String> {
        self.process_calls.fetch_add(1, Ordering::SeqCst);
        match explicit {
            Some(documents) => documents.to_vec(),
            None => self
                .processes
                .get(&process)
                .map(|docs| docs.clone())
                .unwrap_or_default(),
        }
    }
}
