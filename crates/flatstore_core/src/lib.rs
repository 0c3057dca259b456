//! Flat-file record store.
//! Stores collections of open-ended records as JSON files, with identity
//! assignment, uniqueness-key conflicts and wildcard/sort queries.

pub mod config;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod storage;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::bookmark::bookmark_model;
pub use model::record::{Record, RecordId};
pub use model::schema::{FieldKind, FieldSpec, SchemaModel};
pub use model::{Model, RecordValidationError};
pub use query::{QueryError, QueryParams, QueryResult, NO_RESULTS_MESSAGE};
pub use repo::record_repo::{ExtraDataBinder, RecordRepository, RepoError, RepoResult};
pub use storage::{StorageError, StorageResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
