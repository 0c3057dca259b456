//! File-backed record repository.
//!
//! # Responsibility
//! - Own one collection and the JSON file it is persisted to.
//! - Assign identities, enforce the model's validity check and uniqueness key.
//! - Serve reads, optionally enriched by a caller-supplied binder.
//!
//! # Invariants
//! - The collection is loaded lazily on first access and cached.
//! - Every successful mutation rewrites the whole file before the cache is
//!   replaced; a failed write leaves both file and cache unchanged.
//! - Ids are `max(existing) + 1`; deleted Ids are not recycled while a
//!   higher Id exists.
//! - Not safe for concurrent writers: two processes sharing one file are
//!   last-writer-wins.

use crate::config::StoreConfig;
use crate::model::record::{Record, RecordId, CONFLICT_FIELD};
use crate::model::{Model, RecordValidationError};
use crate::query::{non_empty, run_query, QueryParams, QueryResult};
use crate::storage::{load_collection, save_collection, StorageError};
use log::{error, info, warn};
use once_cell::unsync::OnceCell;
use serde_json::Value;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure of a repository mutation.
#[derive(Debug)]
pub enum RepoError {
    /// The model rejected the record.
    Invalid(RecordValidationError),
    /// Another record already holds the uniqueness-key value.
    ///
    /// `candidate` is the rejected record, annotated with `conflict: true`.
    Conflict { field: String, candidate: Record },
    /// No record carries this Id.
    NotFound(RecordId),
    /// Update target carries no positive integer `Id`.
    MissingId,
    /// The highest stored Id is already `RecordId::MAX`.
    IdExhausted,
    /// The collection file could not be written.
    Storage(StorageError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "invalid record: {err}"),
            Self::Conflict { field, candidate } => match candidate.get(field) {
                Some(value) => write!(f, "conflict: `{field}` value {value} already exists"),
                None => write!(f, "conflict on `{field}`"),
            },
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::MissingId => write!(f, "record has no valid `Id`"),
            Self::IdExhausted => write!(f, "no record id left after {}", RecordId::MAX),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Conflict { .. } | Self::NotFound(_) | Self::MissingId | Self::IdExhausted => {
                None
            }
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Caller-supplied enrichment applied to every record handed out by reads.
pub type ExtraDataBinder = Box<dyn Fn(&Record) -> Record>;

/// Repository over one model's collection file.
pub struct RecordRepository<M: Model> {
    model: M,
    collection: String,
    path: PathBuf,
    pretty_json: bool,
    records: OnceCell<Vec<Record>>,
    binder: Option<ExtraDataBinder>,
}

impl<M: Model> RecordRepository<M> {
    /// Binds `model` to its collection file under `config.data_dir()`.
    ///
    /// Nothing is read until the first access.
    pub fn new(model: M, config: &StoreConfig) -> Self {
        let path = config.collection_path(&model);
        Self::at_path(model, path).with_pretty_json(config.pretty_json())
    }

    /// Binds `model` to an explicit file path.
    pub fn at_path(model: M, path: impl Into<PathBuf>) -> Self {
        let collection = model.collection_name();
        Self {
            model,
            collection,
            path: path.into(),
            pretty_json: false,
            records: OnceCell::new(),
            binder: None,
        }
    }

    /// Enables indented JSON when rewriting the file.
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// Registers the enrichment applied by [`get`](Self::get) and
    /// [`get_all`](Self::get_all), replacing any previous one.
    pub fn set_extra_data_binder<F>(&mut self, binder: F)
    where
        F: Fn(&Record) -> Record + 'static,
    {
        self.binder = Some(Box::new(binder));
    }

    pub fn clear_extra_data_binder(&mut self) {
        self.binder = None;
    }

    /// Raw cached collection, in file order, without enrichment.
    pub fn records(&self) -> &[Record] {
        self.objects()
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }

    /// Drops the cache; the next access re-reads the file.
    pub fn reload(&mut self) {
        self.records = OnceCell::new();
    }

    /// Next identity: highest existing Id plus one, or `1` when empty.
    ///
    /// # Errors
    /// `IdExhausted` when the highest Id is `RecordId::MAX`.
    pub fn next_id(&self) -> RepoResult<RecordId> {
        self.objects()
            .iter()
            .filter_map(Record::id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(RepoError::IdExhausted)
    }

    /// Validates, checks the uniqueness key, assigns an Id and persists.
    ///
    /// Any caller-supplied `Id` is replaced.
    ///
    /// # Errors
    /// - `Invalid` when the model rejects the record.
    /// - `Conflict` when the key value is taken; the candidate is returned
    ///   annotated and nothing is written.
    /// - `IdExhausted` when no Id above the current maximum exists.
    /// - `Storage` when the file cannot be rewritten.
    pub fn add(&mut self, mut record: Record) -> RepoResult<Record> {
        record.remove(CONFLICT_FIELD);
        self.check_valid(&record)?;

        if let Some(field) = self.key_conflict(&record, None) {
            return Err(self.conflict(field, record));
        }

        let id = self.next_id().inspect_err(|_| {
            error!(
                "event=record_add module=repo status=id_exhausted collection={}",
                self.collection
            );
        })?;
        record.set_id(id);

        let mut next = self.objects().clone();
        next.push(record.clone());
        self.commit(next)?;

        info!(
            "event=record_add module=repo status=ok collection={} id={}",
            self.collection, id
        );
        Ok(record)
    }

    /// Replaces the record carrying the same `Id` (full overwrite).
    ///
    /// # Errors
    /// Checked in order: `Invalid`, `MissingId`, `Conflict`, `NotFound`,
    /// then `Storage`. Nothing is written on any error.
    pub fn update(&mut self, mut record: Record) -> RepoResult<()> {
        record.remove(CONFLICT_FIELD);
        self.check_valid(&record)?;

        let id = record.id().ok_or(RepoError::MissingId)?;

        if let Some(field) = self.key_conflict(&record, Some(id)) {
            return Err(self.conflict(field, record));
        }

        let Some(position) = self.position_of(id) else {
            warn!(
                "event=record_update module=repo status=not_found collection={} id={}",
                self.collection, id
            );
            return Err(RepoError::NotFound(id));
        };

        let mut next = self.objects().clone();
        next[position] = record;
        self.commit(next)?;

        info!(
            "event=record_update module=repo status=ok collection={} id={}",
            self.collection, id
        );
        Ok(())
    }

    /// Removes the first record with `id`.
    ///
    /// Returns `Ok(false)` without writing when no record matched.
    pub fn remove(&mut self, id: RecordId) -> RepoResult<bool> {
        let Some(position) = self.position_of(id) else {
            return Ok(false);
        };

        let mut next = self.objects().clone();
        next.remove(position);
        self.commit(next)?;

        info!(
            "event=record_remove module=repo status=ok collection={} id={}",
            self.collection, id
        );
        Ok(true)
    }

    /// Removes every record at the given positions with a single write.
    ///
    /// Duplicate and out-of-range positions are ignored. Returns the number
    /// of removed records; nothing is written when it is zero.
    pub fn remove_by_index(&mut self, indices: &[usize]) -> RepoResult<usize> {
        if indices.is_empty() {
            return Ok(0);
        }

        let current = self.objects();
        let doomed: BTreeSet<usize> = indices
            .iter()
            .copied()
            .filter(|index| *index < current.len())
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }

        let next: Vec<Record> = current
            .iter()
            .enumerate()
            .filter(|(index, _)| !doomed.contains(index))
            .map(|(_, record)| record.clone())
            .collect();
        self.commit(next)?;

        info!(
            "event=record_remove module=repo status=ok collection={} removed={}",
            self.collection,
            doomed.len()
        );
        Ok(doomed.len())
    }

    /// Returns the record with `id`, enriched by the binder if one is set.
    pub fn get(&self, id: RecordId) -> Option<Record> {
        self.objects()
            .iter()
            .find(|record| record.id() == Some(id))
            .map(|record| self.bind(record))
    }

    /// Returns the collection, optionally sorted and filtered by `params`.
    ///
    /// Records are enriched before the query stages run, so filters see
    /// bound fields.
    ///
    /// # Errors
    /// - `MultiValued` / `UnknownSortKey` for malformed queries.
    /// - `NoResults` when nothing is left, including an empty collection.
    pub fn get_all(&self, params: Option<&QueryParams>) -> QueryResult<Vec<Record>> {
        let records: Vec<Record> = self
            .objects()
            .iter()
            .map(|record| self.bind(record))
            .collect();

        match params {
            Some(params) => run_query(records, params, self.model.label_field()),
            None => non_empty(records),
        }
    }

    /// First record whose `field` equals `value` exactly, skipping
    /// `excluded_id` when given.
    pub fn find_by_field(
        &self,
        field: &str,
        value: &Value,
        excluded_id: Option<RecordId>,
    ) -> Option<&Record> {
        self.objects().iter().find(|record| {
            record.get(field) == Some(value)
                && (excluded_id.is_none() || record.id() != excluded_id)
        })
    }

    fn objects(&self) -> &Vec<Record> {
        self.records.get_or_init(|| self.read())
    }

    fn read(&self) -> Vec<Record> {
        match load_collection(&self.path) {
            Ok(records) => records,
            Err(err) => {
                error!(
                    "event=store_load module=repo status=degraded collection={} error={}",
                    self.collection, err
                );
                Vec::new()
            }
        }
    }

    fn commit(&mut self, records: Vec<Record>) -> RepoResult<()> {
        if let Err(err) = save_collection(&self.path, &records, self.pretty_json) {
            error!(
                "event=store_write module=repo status=error collection={} error={}",
                self.collection, err
            );
            return Err(err.into());
        }
        self.records = OnceCell::with_value(records);
        Ok(())
    }

    fn check_valid(&self, record: &Record) -> RepoResult<()> {
        self.model.validate(record).map_err(|err| {
            warn!(
                "event=record_validate module=repo status=invalid collection={} error={}",
                self.collection, err
            );
            RepoError::Invalid(err)
        })
    }

    fn key_conflict(&self, record: &Record, excluded_id: Option<RecordId>) -> Option<String> {
        let field = self.model.key_field()?;
        let value = record.get(field)?;
        self.find_by_field(field, value, excluded_id)
            .map(|_| field.to_string())
    }

    fn conflict(&self, field: String, mut candidate: Record) -> RepoError {
        warn!(
            "event=record_conflict module=repo status=conflict collection={} field={}",
            self.collection, field
        );
        candidate.mark_conflict();
        RepoError::Conflict { field, candidate }
    }

    fn position_of(&self, id: RecordId) -> Option<usize> {
        self.objects()
            .iter()
            .position(|record| record.id() == Some(id))
    }

    fn bind(&self, record: &Record) -> Record {
        match &self.binder {
            Some(binder) => binder(record),
            None => record.clone(),
        }
    }
}
