//! # Record Synthesis
//!
//! A document type is turned into a concrete record shape by
//! [`DocumentTypeBuilder`]: the declared fields are fixed, in order, with an
//! index for name lookup. The shape is instantiated once into a
//! [`DocumentPrototype`] (all fields at their zero value) and every caller
//! gets a [`DocumentRecord`], an owned copy of the prototype's values.
//!
//! ## Field Set Invariant
//!
//! Neither prototypes nor records can gain or lose fields. Reading or writing
//! an undeclared field is a [`DocumentError::UndeclaredField`], and writes
//! are type checked against the declared [`FieldType`].
//!
//! ## Copy Chain
//!
//! A record holds a shared handle to the prototype it was copied from. That
//! handle is what keeps a prototype cache entry alive: once the last record
//! of a type is dropped, the prototype goes with it.

use super::error::DocumentError;
use super::value::FieldValue;
use crate::schema::{FieldDef, FieldType};
use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a [`DocumentType`] from a field list.
#[derive(Debug, Clone)]
pub struct DocumentTypeBuilder {
    name: String,
    schema_reference: String,
    fields: Vec<FieldDef>,
}

impl DocumentTypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_reference: String::new(),
            fields: Vec::new(),
        }
    }

    pub fn schema_reference(mut self, schema_reference: impl Into<String>) -> Self {
        self.schema_reference = schema_reference.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldDef::new(name, field_type));
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Validates the field list and fixes the record shape.
    ///
    /// # Errors
    /// [`DocumentError::MalformedDefinition`] for an empty type name, an
    /// empty field name, or a field declared twice.
    pub fn build(self) -> Result<DocumentType, DocumentError> {
        let malformed = |reason: String| DocumentError::MalformedDefinition {
            document: self.name.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(malformed("document type name is empty".into()));
        }

        let mut index = HashMap::with_capacity(self.fields.len());
        for (position, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(malformed(format!("field #{position} has no name")));
            }
            if index.insert(field.name.clone(), position).is_some() {
                return Err(malformed(format!("field {} is declared twice", field.name)));
            }
        }

        Ok(DocumentType {
            name: self.name,
            schema_reference: self.schema_reference,
            fields: self.fields,
            index,
        })
    }
}

/// A synthesized record shape: the fixed, ordered field set of one document type.
#[derive(Debug)]
pub struct DocumentType {
    name: String,
    schema_reference: String,
    fields: Vec<FieldDef>,
    index: HashMap<String, usize>,
}

impl DocumentType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_reference(&self) -> &str {
        &self.schema_reference
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.index.get(field).copied()
    }

    /// Creates the single default-initialized instance of this type.
    pub fn instantiate(self: Arc<Self>) -> DocumentPrototype {
        let values = self
            .fields
            .iter()
            .map(|f| FieldValue::default_for(&f.field_type))
            .collect();
        DocumentPrototype {
            doc_type: self,
            values,
        }
    }

    fn lookup(&self, field: &str) -> Result<usize, DocumentError> {
        self.position(field)
            .ok_or_else(|| DocumentError::UndeclaredField {
                document: self.name.clone(),
                field: field.to_string(),
            })
    }
}

/// The read-only, default-initialized instance records are copied from.
#[derive(Debug)]
pub struct DocumentPrototype {
    doc_type: Arc<DocumentType>,
    values: Vec<FieldValue>,
}

impl DocumentPrototype {
    pub fn document_type(&self) -> &DocumentType {
        &self.doc_type
    }

    pub fn name(&self) -> &str {
        self.doc_type.name()
    }

    pub fn get(&self, field: &str) -> Result<&FieldValue, DocumentError> {
        let position = self.doc_type.lookup(field)?;
        Ok(&self.values[position])
    }

    /// Returns an independent record whose values start as this prototype's.
    pub fn duplicate(self: &Arc<Self>) -> DocumentRecord {
        DocumentRecord {
            prototype: Arc::clone(self),
            values: self.values.clone(),
        }
    }
}

/// A business document handed to callers.
///
/// Values are owned by the record: mutating one record is never visible to
/// another record or to the prototype.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    prototype: Arc<DocumentPrototype>,
    values: Vec<FieldValue>,
}

impl DocumentRecord {
    pub fn name(&self) -> &str {
        self.prototype.name()
    }

    pub fn schema_reference(&self) -> &str {
        self.prototype.doc_type.schema_reference()
    }

    pub fn document_type(&self) -> &DocumentType {
        self.prototype.document_type()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.prototype.doc_type.position(field).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.prototype.doc_type.fields.iter().map(|f| f.name.as_str())
    }

    /// Fields and their values in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.field_names().zip(self.values.iter())
    }

    pub fn get(&self, field: &str) -> Result<&FieldValue, DocumentError> {
        let position = self.prototype.doc_type.lookup(field)?;
        Ok(&self.values[position])
    }

    /// Assigns `value` to a declared field and returns the previous value.
    pub fn set(&mut self, field: &str, value: FieldValue) -> Result<FieldValue, DocumentError> {
        let doc_type = &self.prototype.doc_type;
        let position = doc_type.lookup(field)?;
        let declared = &doc_type.fields[position].field_type;
        if !value.conforms_to(declared) {
            return Err(DocumentError::FieldTypeMismatch {
                document: doc_type.name.clone(),
                field: field.to_string(),
                expected: declared.clone(),
                found: value.kind(),
            });
        }
        Ok(std::mem::replace(&mut self.values[position], value))
    }

    /// Restores a field to the prototype's default.
    pub fn reset(&mut self, field: &str) -> Result<(), DocumentError> {
        let default = self.prototype.get(field)?.clone();
        let position = self.prototype.doc_type.lookup(field)?;
        self.values[position] = default;
        Ok(())
    }

    /// Whether both records were copied from the same prototype instance.
    pub fn shares_prototype_with(&self, other: &DocumentRecord) -> bool {
        Arc::ptr_eq(&self.prototype, &other.prototype)
    }

    /// Renders the record as `{"document", "schema", "fields"}` JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl PartialEq for DocumentRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.values == other.values
    }
}

struct FieldsView<'a>(&'a DocumentRecord);

impl Serialize for FieldsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.values.len()))?;
        for (name, value) in self.0.fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for DocumentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("DocumentRecord", 3)?;
        record.serialize_field("document", self.name())?;
        record.serialize_field("schema", self.schema_reference())?;
        record.serialize_field("fields", &FieldsView(self))?;
        record.end()
    }
}
