//! Store configuration.
//!
//! # Invariants
//! - `data_dir` is never empty.
//! - Collection files live directly under `data_dir` as `<Collection>.json`.

use crate::model::Model;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default directory holding collection files.
pub const DEFAULT_DATA_DIR: &str = "data";
const COLLECTION_FILE_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDataDir,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataDir => write!(f, "data_dir cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

/// Where and how collections are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    data_dir: PathBuf,
    pretty_json: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            pretty_json: false,
        }
    }
}

impl StoreConfig {
    /// Creates a config rooted at `data_dir`.
    ///
    /// # Errors
    /// - `EmptyDataDir` when `data_dir` is empty or whitespace.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data_dir = data_dir.as_ref();
        if data_dir.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            pretty_json: false,
        })
    }

    /// Enables indented JSON output.
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn pretty_json(&self) -> bool {
        self.pretty_json
    }

    /// Storage file for `model`, e.g. `data/Bookmarks.json`.
    pub fn collection_path<M: Model + ?Sized>(&self, model: &M) -> PathBuf {
        self.data_dir.join(format!(
            "{}.{COLLECTION_FILE_EXTENSION}",
            model.collection_name()
        ))
    }
}
