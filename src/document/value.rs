use crate::schema::FieldType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The value held by one document field.
///
/// Each variant mirrors a [`FieldType`]; [`FieldValue::default_for`] gives
/// the zero value a freshly synthesized prototype starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Amount { amount: f64, currency: String },
    BinaryObject(Vec<u8>),
    Code(String),
    DateTime(DateTime<Utc>),
    Identifier(String),
    Indicator(bool),
    Measure { value: f64, unit: String },
    Name(String),
    Numeric(f64),
    Quantity { value: f64, unit: String },
    Text(String),
    Association {
        component: String,
        members: Map<String, Value>,
    },
}

impl FieldValue {
    /// Type-appropriate zero value for `field_type`.
    pub fn default_for(field_type: &FieldType) -> Self {
        match field_type {
            FieldType::Amount => FieldValue::Amount {
                amount: 0.0,
                currency: String::new(),
            },
            FieldType::BinaryObject => FieldValue::BinaryObject(Vec::new()),
            FieldType::Code => FieldValue::Code(String::new()),
            // Unix epoch, so two prototypes of one type always compare equal.
            FieldType::DateTime => FieldValue::DateTime(DateTime::<Utc>::default()),
            FieldType::Identifier => FieldValue::Identifier(String::new()),
            FieldType::Indicator => FieldValue::Indicator(false),
            FieldType::Measure => FieldValue::Measure {
                value: 0.0,
                unit: String::new(),
            },
            FieldType::Name => FieldValue::Name(String::new()),
            FieldType::Numeric => FieldValue::Numeric(0.0),
            FieldType::Quantity => FieldValue::Quantity {
                value: 0.0,
                unit: String::new(),
            },
            FieldType::Text => FieldValue::Text(String::new()),
            FieldType::Association(component) => FieldValue::Association {
                component: component.clone(),
                members: Map::new(),
            },
        }
    }

    /// Whether this value may be stored in a field declared as `field_type`.
    pub fn conforms_to(&self, field_type: &FieldType) -> bool {
        match (self, field_type) {
            (FieldValue::Association { component, .. }, FieldType::Association(expected)) => {
                component == expected
            }
            (FieldValue::Amount { .. }, FieldType::Amount)
            | (FieldValue::BinaryObject(_), FieldType::BinaryObject)
            | (FieldValue::Code(_), FieldType::Code)
            | (FieldValue::DateTime(_), FieldType::DateTime)
            | (FieldValue::Identifier(_), FieldType::Identifier)
            | (FieldValue::Indicator(_), FieldType::Indicator)
            | (FieldValue::Measure { .. }, FieldType::Measure)
            | (FieldValue::Name(_), FieldType::Name)
            | (FieldValue::Numeric(_), FieldType::Numeric)
            | (FieldValue::Quantity { .. }, FieldType::Quantity)
            | (FieldValue::Text(_), FieldType::Text) => true,
            _ => false,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Amount { .. } => "Amount",
            FieldValue::BinaryObject(_) => "BinaryObject",
            FieldValue::Code(_) => "Code",
            FieldValue::DateTime(_) => "DateTime",
            FieldValue::Identifier(_) => "Identifier",
            FieldValue::Indicator(_) => "Indicator",
            FieldValue::Measure { .. } => "Measure",
            FieldValue::Name(_) => "Name",
            FieldValue::Numeric(_) => "Numeric",
            FieldValue::Quantity { .. } => "Quantity",
            FieldValue::Text(_) => "Text",
            FieldValue::Association { .. } => "Association",
        }
    }

    pub fn amount(amount: f64, currency: impl Into<String>) -> Self {
        FieldValue::Amount {
            amount,
            currency: currency.into(),
        }
    }

    pub fn quantity(value: f64, unit: impl Into<String>) -> Self {
        FieldValue::Quantity {
            value,
            unit: unit.into(),
        }
    }

    /// The numeric part of an amount, measure, numeric or quantity value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Amount { amount, .. } => Some(*amount),
            FieldValue::Measure { value, .. } | FieldValue::Quantity { value, .. } => Some(*value),
            FieldValue::Numeric(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Code(s)
            | FieldValue::Identifier(s)
            | FieldValue::Name(s)
            | FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}
