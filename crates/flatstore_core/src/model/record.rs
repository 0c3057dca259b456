//! Open-ended record stored in a collection file.
//!
//! # Responsibility
//! - Hold one record as an ordered field-name -> JSON value mapping.
//! - Expose typed access to the reserved `Id` field and the conflict marker.
//!
//! # Invariants
//! - Field order is preserved across serialize/deserialize.
//! - A persisted record always carries a positive integer `Id`.
//! - `Record` serializes transparently as a plain JSON object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Integer identity assigned by the repository.
pub type RecordId = u64;

/// Reserved identity field name.
pub const ID_FIELD: &str = "Id";
/// Marker set on a candidate rejected for a uniqueness-key collision.
pub const CONFLICT_FIELD: &str = "conflict";
/// Default label field.
pub const NAME_FIELD: &str = "Name";
/// Label field used instead of `Name` by title-bearing models.
pub const TITLE_FIELD: &str = "Title";
/// Field targeted by `category` sorting and the `Category` filter.
pub const CATEGORY_FIELD: &str = "Category";

/// One stored entity with an open field set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing JSON object.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Converts a JSON value into a record.
    ///
    /// Returns `None` when `value` is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Returns the raw value for `field`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `field` as a string slice when it holds a JSON string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Sets (or replaces) one field, keeping its original position.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes one field and returns its previous value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    /// Returns whether `field` is present (even when null).
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns the record identity, if a positive integer `Id` is present.
    pub fn id(&self) -> Option<RecordId> {
        self.fields
            .get(ID_FIELD)
            .and_then(Value::as_u64)
            .filter(|id| *id > 0)
    }

    /// Assigns the record identity.
    pub fn set_id(&mut self, id: RecordId) {
        self.set(ID_FIELD, id);
    }

    /// Returns whether this record was annotated as a key conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self.fields.get(CONFLICT_FIELD), Some(Value::Bool(true)))
    }

    pub(crate) fn mark_conflict(&mut self) {
        self.set(CONFLICT_FIELD, true);
    }

    /// Read-only view of all fields in stored order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_fields(fields)
    }
}
