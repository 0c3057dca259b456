//! Repository layer over flat collection files.
//!
//! # Responsibility
//! - Expose CRUD, identity assignment and conflict checks per model.
//! - Keep file format details behind the `storage` boundary.
//!
//! # Invariants
//! - Repository writes must pass `Model::validate()` before persistence.
//! - Mutations return semantic errors (`NotFound`, `Conflict`) in addition to
//!   storage errors.

pub mod record_repo;
