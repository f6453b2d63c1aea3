//! Schema-side contracts the document core reads from.
//!
//! The core never parses UBL definitions itself. It consumes two read-only
//! lookups:
//!
//! - [`SchemaRegistry`] - document type name to field definition and schema reference
//! - [`ProcessLookup`] - business process to the document types it exchanges
//!
//! [`InMemorySchemaRegistry`] implements both and ships a seeded UBL 2.1
//! catalogue. [`mock::MockSchemaRegistry`] records every lookup for tests.

mod descriptor;
mod field;
pub mod mock;
mod process;
mod registry;

pub use descriptor::DocumentTypeDescriptor;
pub use field::{FieldDef, FieldType};
pub use process::BusinessProcess;
pub use registry::InMemorySchemaRegistry;

use std::collections::BTreeSet;

/// Read-only view of the document schemas known to the system.
pub trait SchemaRegistry: Send + Sync {
    /// Ordered field list for `name`, or `None` when the type is unknown.
    fn field_definition(&self, name: &str) -> Option<Vec<FieldDef>>;

    /// Opaque schema reference (usually a URN) for `name`.
    fn schema_reference(&self, name: &str) -> Option<String>;

    /// Every document type name this registry can describe.
    fn known_type_names(&self) -> BTreeSet<String>;

    /// Whether `name` is a known document type.
    ///
    /// The default walks [`known_type_names`](Self::known_type_names);
    /// registries with an index should override it.
    fn is_known(&self, name: &str) -> bool {
        self.known_type_names().contains(name)
    }
}

/// Resolves which document types a business process exchanges.
pub trait ProcessLookup: Send + Sync {
    /// Document type names for `process`, in exchange order.
    ///
    /// When `explicit` is given the caller has already chosen the documents
    /// and they are returned as given.
    fn documents_for_process(
        &self,
        process: BusinessProcess,
        explicit: Option<&[String]>,
    ) -> Vec<String>;
}
