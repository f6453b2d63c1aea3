//! Document Factory & Cache.
//!
//! - [`DocumentTypeBuilder`] / [`DocumentType`] - record shape synthesized from a field list
//! - [`DocumentPrototype`] - the one default-initialized instance per type
//! - [`DocumentRecord`] - the independent copy callers own
//! - [`PrototypeCache`] - weak, first-writer-wins prototype store
//! - [`DocumentFactory`] - name in, record out
//! - [`DocumentRevisions`] - append-only snapshot log

mod cache;
mod error;
mod factory;
mod record;
mod revisions;
mod value;

pub use cache::{CacheStats, PrototypeCache};
pub use error::DocumentError;
pub use factory::{canonical_name, DocumentFactory, ProcessDocuments};
pub use record::{DocumentPrototype, DocumentRecord, DocumentType, DocumentTypeBuilder};
pub use revisions::{DocumentRevisions, Revision, RevisionKey};
pub use value::FieldValue;
