use super::field::{FieldDef, FieldType};
use serde::{Deserialize, Serialize};

/// Identifies a document type: its name, ordered fields and schema reference.
///
/// Descriptors are built once by a schema registry and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTypeDescriptor {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub schema_reference: String,
}

impl DocumentTypeDescriptor {
    pub fn new(name: impl Into<String>, schema_reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            schema_reference: schema_reference.into(),
        }
    }

    /// Appends a field declaration, keeping declaration order.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldDef::new(name, field_type));
        self
    }
}
