//! Shared types used across the ingestion pipeline.
//!
//! `FileRecord` is serialized into the catalog JSON document; its field
//! names are part of the on-disk schema and must not change without a
//! catalog version bump.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a media file by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Destination tree segment for this kind: `images/` or `videos/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Where a file's capture date came from.
///
/// `Exif` covers any embedded metadata tag (image EXIF or video container
/// creation time). The three filesystem variants record which timestamp the
/// fallback chain settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSource {
    Exif,
    Birthtime,
    Ctime,
    Mtime,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSource::Exif => write!(f, "exif"),
            DateSource::Birthtime => write!(f, "birthtime"),
            DateSource::Ctime => write!(f, "ctime"),
            DateSource::Mtime => write!(f, "mtime"),
        }
    }
}

/// One cataloged file, keyed in the catalog by its content hash.
///
/// Created by the orchestrator immediately after a successful copy and never
/// mutated afterwards; a later insert under the same hash replaces the whole
/// record (last write wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Content hash, lowercase hex. Primary key within the catalog.
    pub hash: String,
    /// Absolute path the file was copied from.
    pub original_path: String,
    /// Absolute path the file was copied to (after collision resolution).
    pub destination_path: String,
    pub media_type: MediaKind,
    /// Lowercase extension with leading dot, e.g. `.jpg`.
    pub extension: String,
    /// Resolved capture date, `YYYY-MM-DD`.
    pub date_taken: String,
    pub date_source: DateSource,
    pub file_size_bytes: u64,
    /// ISO-8601 local datetime of catalog insertion, second precision.
    pub cataloged_at: String,
}

/// Per-source run counters. Purely a reporting artifact; never persisted.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub source_path: String,
    pub files_scanned: u64,
    pub files_copied: u64,
    pub files_skipped: u64,
    pub files_errored: u64,
    /// `(file path, error message)` in encounter order.
    pub errors: Vec<(String, String)>,
}

impl ScanSummary {
    pub fn new(source_path: &std::path::Path) -> Self {
        Self {
            source_path: source_path.display().to_string(),
            ..Self::default()
        }
    }
}
