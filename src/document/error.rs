//! Error types for document synthesis and record access.

use crate::schema::FieldType;
use thiserror::Error;

/// Errors that can occur while producing or using business documents.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DocumentError {
    /// The requested name is not a document type the schema registry knows.
    #[error("Unrecognized document type: {0}")]
    UnrecognizedDocumentType(String),

    /// The field is not declared by the document type.
    #[error("Field {field} is not declared by {document}")]
    UndeclaredField { document: String, field: String },

    /// A value of the wrong semantic type was assigned to a field.
    #[error("Field {field} of {document} expects {expected}, got {found}")]
    FieldTypeMismatch {
        document: String,
        field: String,
        expected: FieldType,
        found: &'static str,
    },

    /// The field definition cannot be turned into a record type.
    #[error("Malformed definition for {document}: {reason}")]
    MalformedDefinition { document: String, reason: String },
}
