//! Destination naming and the copy itself.
//!
//! Copies land in a dated tree under the target root:
//!
//! ```text
//! /backup/images/2024/03/15/IMG_0042.jpg
//! /backup/videos/2023/12/24/GOPR0117.mp4
//! ```
//!
//! Two files can legitimately share a name and a date (burst shots from two
//! cameras, say), so [`resolve_collision`] appends `_2`, `_3`, … to the stem
//! until a free name is found. That function is the only authority on final
//! on-disk naming; nothing else pre-computes a name, and nothing is ever
//! overwritten.

use crate::types::MediaKind;
use chrono::{Datelike, NaiveDate};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How many numbered alternatives to try before giving up on a name.
pub const MAX_COLLISION_ATTEMPTS: u32 = 999;

#[derive(Error, Debug)]
pub enum CopyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not resolve filename collision after {max} attempts for: {0}", max = MAX_COLLISION_ATTEMPTS)]
    CollisionExhausted(PathBuf),
}

/// Construct `target_root/<images|videos>/YYYY/MM/DD/<original_filename>`.
pub fn build_destination_path(
    target_root: &Path,
    kind: MediaKind,
    date: NaiveDate,
    original_filename: &str,
) -> PathBuf {
    target_root
        .join(kind.dir_name())
        .join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
        .join(format!("{:02}", date.day()))
        .join(original_filename)
}

/// Return `dest_path` unchanged if free, otherwise the first `stem_N.ext`
/// (N = 2, 3, …) that does not exist.
pub fn resolve_collision(dest_path: &Path) -> Result<PathBuf, CopyError> {
    if !dest_path.exists() {
        return Ok(dest_path.to_path_buf());
    }

    let stem = dest_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = dest_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = dest_path.parent().unwrap_or_else(|| Path::new(""));

    for counter in 2..=MAX_COLLISION_ATTEMPTS + 1 {
        let candidate = parent.join(format!("{stem}_{counter}{suffix}"));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(CopyError::CollisionExhausted(dest_path.to_path_buf()))
}

/// Copy `source_path` to (a collision-resolved variant of) `dest_path`,
/// creating missing parents and carrying over modification and access
/// times. Returns the path actually used.
pub fn copy_file(source_path: &Path, dest_path: &Path) -> Result<PathBuf, CopyError> {
    let dest_path = resolve_collision(dest_path)?;
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source_path, &dest_path)?;

    let meta = fs::metadata(source_path)?;
    let atime = FileTime::from_last_access_time(&meta);
    let mtime = FileTime::from_last_modification_time(&meta);
    filetime::set_file_times(&dest_path, atime, mtime)?;

    Ok(dest_path)
}
