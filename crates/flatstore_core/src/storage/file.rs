//! Whole-document JSON load/save for one collection file.
//!
//! # Invariants
//! - Saves go through a sibling `.tmp` file renamed over the target.
//! - Parent directories are created on the first save.

use super::{StorageError, StorageResult};
use crate::model::record::Record;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Reads the collection stored at `path`.
///
/// Returns an empty collection when the file does not exist yet.
///
/// # Errors
/// - `Io` when the file exists but cannot be read.
/// - `Parse` when the content is not JSON.
/// - `InvalidDocument` when the JSON is not an array of objects.
pub fn load_collection(path: &Path) -> StorageResult<Vec<Record>> {
    let started_at = Instant::now();

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(
                "event=store_load module=storage status=missing path={} note=created_on_first_write",
                path.display()
            );
            return Ok(Vec::new());
        }
        Err(source) => {
            error!(
                "event=store_load module=storage status=error path={} error_code=read_failed error={}",
                path.display(),
                source
            );
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let records = parse_document(path, &raw).inspect_err(|err| {
        error!(
            "event=store_load module=storage status=error path={} error_code=parse_failed error={}",
            path.display(),
            err
        );
    })?;

    info!(
        "event=store_load module=storage status=ok path={} records={} duration_ms={}",
        path.display(),
        records.len(),
        started_at.elapsed().as_millis()
    );
    Ok(records)
}

/// Rewrites the collection file at `path` with `records`.
///
/// # Side effects
/// - Creates missing parent directories.
/// - Replaces the previous file content atomically via rename.
pub fn save_collection(path: &Path, records: &[Record], pretty: bool) -> StorageResult<()> {
    let started_at = Instant::now();

    let document = if pretty {
        serde_json::to_string_pretty(records)
    } else {
        serde_json::to_string(records)
    }
    .map_err(StorageError::Serialize)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| io_error(path, parent, source))?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, document).map_err(|source| io_error(path, &tmp_path, source))?;
    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error(path, path, source));
    }

    debug!(
        "event=store_write module=storage status=ok path={} records={} duration_ms={}",
        path.display(),
        records.len(),
        started_at.elapsed().as_millis()
    );
    Ok(())
}

fn parse_document(path: &Path, raw: &str) -> StorageResult<Vec<Record>> {
    let value: Value = serde_json::from_str(raw).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Array(items) = value else {
        return Err(StorageError::InvalidDocument {
            path: path.to_path_buf(),
            message: "top-level value must be an array".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            Record::from_value(item).ok_or_else(|| StorageError::InvalidDocument {
                path: path.to_path_buf(),
                message: format!("item {index} is not an object"),
            })
        })
        .collect()
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn io_error(target: &Path, at: &Path, source: std::io::Error) -> StorageError {
    error!(
        "event=store_write module=storage status=error path={} at={} error={}",
        target.display(),
        at.display(),
        source
    );
    StorageError::Io {
        path: at.to_path_buf(),
        source,
    }
}
