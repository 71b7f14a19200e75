use thiserror::Error;

use crate::domain::RecordField;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", format_fields(.missing))]
pub struct ValidationError {
    pub missing: Vec<RecordField>,
}

impl ValidationError {
    pub fn is_missing(&self, field: RecordField) -> bool {
        self.missing.contains(&field)
    }
}

fn format_fields(fields: &[RecordField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {field} value '{value}'")]
pub struct UnknownVariant {
    pub field: RecordField,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(field: RecordField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}
