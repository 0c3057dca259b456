//! Declarative model built from field specifications.
//!
//! # Responsibility
//! - Validate records against a declared list of fields.
//! - Resolve the label field statically from the declared schema.
//!
//! # Invariants
//! - Undeclared fields are accepted and stored untouched.
//! - The label field is `Title` when declared, `Name` otherwise.

use super::record::{Record, ID_FIELD, NAME_FIELD, TITLE_FIELD};
use super::{Model, RecordValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)https?://[a-z0-9\-._~%]+(:\d+)?(/[^\s]*)?$").expect("valid url regex")
});

/// Value kind accepted by one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON string.
    Text,
    /// JSON number.
    Number,
    /// JSON string holding an `http(s)` URL.
    Url,
    /// Any JSON value.
    Any,
}

/// One declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
        }
    }
}

/// Model described by a type name, field specs and an optional unique key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaModel {
    type_name: String,
    fields: Vec<FieldSpec>,
    key: Option<String>,
}

impl SchemaModel {
    /// Creates a model with no declared fields; every object record is valid.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
            key: None,
        }
    }

    /// Declares one more field.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Declares the uniqueness key.
    pub fn key(mut self, field: impl Into<String>) -> Self {
        self.key = Some(field.into());
        self
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn declares(&self, name: &str) -> bool {
        self.fields.iter().any(|spec| spec.name == name)
    }
}

impl Model for SchemaModel {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn validate(&self, record: &Record) -> Result<(), RecordValidationError> {
        for spec in self.fields.iter().filter(|spec| spec.name != ID_FIELD) {
            match record.get(&spec.name) {
                None if spec.required => {
                    return Err(RecordValidationError::MissingField(spec.name.clone()))
                }
                None => {}
                Some(value) => check_value(spec, value)?,
            }
        }
        Ok(())
    }

    fn key_field(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn label_field(&self) -> &str {
        if self.declares(TITLE_FIELD) {
            TITLE_FIELD
        } else {
            NAME_FIELD
        }
    }
}

fn check_value(spec: &FieldSpec, value: &Value) -> Result<(), RecordValidationError> {
    if is_blank(value) {
        if spec.required {
            return Err(RecordValidationError::EmptyField(spec.name.clone()));
        }
        return Ok(());
    }

    match spec.kind {
        FieldKind::Any => Ok(()),
        FieldKind::Text => value
            .as_str()
            .map(|_| ())
            .ok_or_else(|| wrong_type(spec, "string")),
        FieldKind::Number => {
            if value.is_number() {
                Ok(())
            } else {
                Err(wrong_type(spec, "number"))
            }
        }
        FieldKind::Url => {
            let text = value.as_str().ok_or_else(|| wrong_type(spec, "string"))?;
            if URL_RE.is_match(text.trim()) {
                Ok(())
            } else {
                Err(RecordValidationError::InvalidUrl {
                    field: spec.name.clone(),
                    value: text.to_string(),
                })
            }
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn wrong_type(spec: &FieldSpec, expected: &'static str) -> RecordValidationError {
    RecordValidationError::WrongType {
        field: spec.name.clone(),
        expected,
    }
}
