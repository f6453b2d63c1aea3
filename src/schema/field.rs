use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a document field, after the UBL core component types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Amount,
    BinaryObject,
    Code,
    DateTime,
    Identifier,
    Indicator,
    Measure,
    Name,
    Numeric,
    Quantity,
    Text,
    /// Association to a named aggregate component (e.g. `"Party"`).
    Association(String),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Amount => write!(f, "Amount"),
            FieldType::BinaryObject => write!(f, "BinaryObject"),
            FieldType::Code => write!(f, "Code"),
            FieldType::DateTime => write!(f, "DateTime"),
            FieldType::Identifier => write!(f, "Identifier"),
            FieldType::Indicator => write!(f, "Indicator"),
            FieldType::Measure => write!(f, "Measure"),
            FieldType::Name => write!(f, "Name"),
            FieldType::Numeric => write!(f, "Numeric"),
            FieldType::Quantity => write!(f, "Quantity"),
            FieldType::Text => write!(f, "Text"),
            FieldType::Association(component) => write!(f, "Association<{component}>"),
        }
    }
}

/// One declared field: its name and semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}
