//! Record model and model collaborator contracts.
//!
//! # Responsibility
//! - Define the open-ended `Record` shape stored by repositories.
//! - Define the `Model` contract a repository is parameterized by.
//!
//! # Invariants
//! - A model never touches storage; it only names, validates and describes
//!   records.
//! - Validation is pure and deterministic for a given record.

pub mod bookmark;
pub mod record;
pub mod schema;

use std::error::Error;
use std::fmt::{Display, Formatter};

use self::record::{Record, NAME_FIELD};

/// Record-level validation failure reported by a [`Model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Required field is absent.
    MissingField(String),
    /// Required field is present but null or blank.
    EmptyField(String),
    /// Field value has the wrong JSON type.
    WrongType {
        field: String,
        expected: &'static str,
    },
    /// Field declared as URL holds a malformed value.
    InvalidUrl { field: String, value: String },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::EmptyField(field) => write!(f, "field `{field}` must not be empty"),
            Self::WrongType { field, expected } => {
                write!(f, "field `{field}` must be a {expected}")
            }
            Self::InvalidUrl { field, value } => {
                write!(f, "field `{field}` is not a valid url: `{value}`")
            }
        }
    }
}

impl Error for RecordValidationError {}

/// Collaborator that declares how one record type is named and validated.
pub trait Model {
    /// Singular type name, e.g. `Bookmark`.
    fn type_name(&self) -> &str;

    /// Collection name used to derive the storage file name.
    fn collection_name(&self) -> String {
        format!("{}s", self.type_name())
    }

    /// Checks a candidate record. `Id` is never trusted and need not be valid.
    fn validate(&self, record: &Record) -> Result<(), RecordValidationError>;

    /// Field whose value must be unique across the collection, if any.
    fn key_field(&self) -> Option<&str> {
        None
    }

    /// Field used by `name`/`title` sorting and the `Name` filter.
    fn label_field(&self) -> &str {
        NAME_FIELD
    }
}

impl<M: Model + ?Sized> Model for &M {
    fn type_name(&self) -> &str {
        (**self).type_name()
    }

    fn collection_name(&self) -> String {
        (**self).collection_name()
    }

    fn validate(&self, record: &Record) -> Result<(), RecordValidationError> {
        (**self).validate(record)
    }

    fn key_field(&self) -> Option<&str> {
        (**self).key_field()
    }

    fn label_field(&self) -> &str {
        (**self).label_field()
    }
}
