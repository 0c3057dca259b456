//! Flat-file storage for record collections.
//!
//! # Responsibility
//! - Load and save one collection as a single JSON array document.
//! - Report I/O and parse failures as typed errors with the file path.
//!
//! # Invariants
//! - A missing file is an empty collection, not an error.
//! - Every save rewrites the whole document; partial writes are never visible.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod file;

pub use file::{load_collection, save_collection};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    /// Filesystem failure while reading or writing `path`.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// File exists but is not valid JSON.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// File is valid JSON but not an array of objects.
    InvalidDocument { path: PathBuf, message: String },
    /// Collection could not be serialized.
    Serialize(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "cannot parse `{}`: {source}", path.display())
            }
            Self::InvalidDocument { path, message } => {
                write!(f, "invalid collection document `{}`: {message}", path.display())
            }
            Self::Serialize(err) => write!(f, "cannot serialize collection: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidDocument { .. } => None,
            Self::Serialize(err) => Some(err),
        }
    }
}
