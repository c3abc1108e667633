//! The persistent catalog: one JSON file mapping content hash → copy record.
//!
//! The catalog is the memory between runs. A hash present in it means "this
//! exact content has already been archived", so re-running over the same
//! card, or a second card holding the same shots, copies nothing.
//!
//! Loading is deliberately forgiving: a missing, truncated, or
//! hand-mangled catalog file yields an empty store and the run proceeds —
//! the worst outcome of a lost catalog is re-copying, never data loss.
//! Saving is atomic: the new JSON is written to a sibling `.tmp` file and
//! renamed over the old one, so a crash mid-save leaves the previous
//! catalog intact.

use crate::types::FileRecord;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the catalog inside the target root.
pub const CATALOG_FILENAME: &str = "media_catalog.json";

/// Schema version written into every catalog file.
pub const CATALOG_VERSION: &str = "1.0";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk shape of the catalog file.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    version: String,
    created_at: String,
    updated_at: String,
    entries: HashMap<String, FileRecord>,
}

/// In-memory catalog bound to its file path.
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    created_at: String,
    entries: HashMap<String, FileRecord>,
}

impl CatalogStore {
    /// Open the catalog at `path`, loading existing entries when the file
    /// parses and starting fresh otherwise.
    pub fn open(path: &Path) -> Self {
        let loaded = fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str::<CatalogFile>(&content).ok());

        match loaded {
            Some(file) => Self {
                path: path.to_path_buf(),
                created_at: file.created_at,
                entries: file.entries,
            },
            None => Self {
                path: path.to_path_buf(),
                created_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
                entries: HashMap::new(),
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Has this content hash been archived already?
    pub fn contains(&self, hash: &str) -> bool {
        self.entries.contains_key(hash)
    }

    pub fn get(&self, hash: &str) -> Option<&FileRecord> {
        self.entries.get(hash)
    }

    /// Insert a record under its hash, replacing any previous record for
    /// the same content.
    pub fn add(&mut self, record: FileRecord) {
        self.entries.insert(record.hash.clone(), record);
    }

    pub fn record_count(&self) -> usize {
        self.entries.len()
    }

    /// Write the catalog to disk atomically (tmp file + rename).
    pub fn save(&self) -> Result<(), CatalogError> {
        let file = CatalogFile {
            version: CATALOG_VERSION.to_string(),
            created_at: self.created_at.clone(),
            updated_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Default catalog location for a target root.
pub fn catalog_path_for(target_root: &Path) -> PathBuf {
    target_root.join(CATALOG_FILENAME)
}
