//! Import and export of the whole application state as a JSON file.
//!
//! The file format is the same encoding the store uses. Import replaces the
//! current state wholesale; it never merges.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::store::AppState;
use crate::store::validate::{self, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("required field '{0}' is missing or null")]
    MissingField(&'static str),

    #[error("invalid data: {0}")]
    Invalid(#[from] ValidationError),
}

/// `checktabs-2024-05-01.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("checktabs-{}.json", date.format("%Y-%m-%d"))
}

pub fn export_json(state: &AppState) -> Result<String> {
    serde_json::to_string_pretty(state).context("failed to serialize state")
}

/// Write an export into `dir`, named after `date`. Returns the file path.
pub fn export_to_dir(state: &AppState, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(export_file_name(date));
    fs::write(&path, export_json(state)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("exported state to {}", path.display());
    Ok(path)
}

/// Parse an exported file. `tabs`, `tasks` and `activeTab` must be present
/// and non-null; `separators` may be absent in files written before
/// separators existed.
pub fn import_json(text: &str, now: DateTime<Utc>) -> Result<AppState, ImportError> {
    let mut value: Value = serde_json::from_str(text)?;

    let obj = value
        .as_object_mut()
        .ok_or(ImportError::Invalid(ValidationError::NotAnObject))?;
    for field in ["tabs", "tasks", "activeTab"] {
        if obj.get(field).is_none_or(Value::is_null) {
            return Err(ImportError::MissingField(field));
        }
    }
    obj.entry("separators")
        .or_insert_with(|| Value::Array(Vec::new()));

    let state = validate::decode(value)?;
    Ok(validate::repair(state, now))
}

pub fn import_file(path: &Path, now: DateTime<Utc>) -> Result<AppState, ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    import_json(&text, now)
}
