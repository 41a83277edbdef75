// src/store/mod.rs
// =============================================================================
// This module saves and loads the list of tracked websites.
//
// The whole list is one unit: load() returns every record, save() replaces
// the file with every record. There is no per-record update.
//
// Saving writes a temporary file next to the target and renames it over the
// old one, so readers see either the old list or the new list, never half
// of each.
//
// Rust concepts:
// - Traits: ResourceStore lets commands run against any storage
// - thiserror: Typed errors that still print nicely
// - Path/PathBuf: Borrowed and owned filesystem paths
// =============================================================================

use crate::record::Resource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors from reading or writing the data file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read data file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("data file {} is corrupted: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode websites: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write data file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Loads and saves the full list of tracked websites
pub trait ResourceStore {
    /// Returns every record, or an empty list if nothing was saved yet
    fn load(&self) -> Result<Vec<Resource>, StoreError>;

    /// Replaces everything saved with `records`
    fn save(&self, records: &[Resource]) -> Result<(), StoreError>;
}

// On-disk layout: {"resources": [...]}
#[derive(Debug, Deserialize)]
struct DataFile {
    #[serde(default)]
    resources: Vec<Resource>,
}

// Borrowing twin of DataFile so save() doesn't have to clone the records
#[derive(Serialize)]
struct DataFileRef<'a> {
    resources: &'a [Resource],
}

/// A pretty-printed JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // The temp file must live in the same directory as the target,
    // otherwise the final rename could cross filesystems
    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn write_error(&self, source: io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl ResourceStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Resource>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no data file yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let data: DataFile =
            serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(data.resources)
    }

    fn save(&self, records: &[Resource]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&DataFileRef { resources: records })?;

        let mut temp = NamedTempFile::new_in(self.parent_dir()).map_err(|e| self.write_error(e))?;
        writeln!(temp, "{}", json).map_err(|e| self.write_error(e))?;
        temp.as_file().sync_all().map_err(|e| self.write_error(e))?;
        temp.persist(&self.path).map_err(|e| self.write_error(e.error))?;

        tracing::debug!(path = %self.path.display(), websites = records.len(), "saved data file");
        Ok(())
    }
}
