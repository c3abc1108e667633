//! Filesystem scanning: find the media files worth ingesting.
//!
//! Walks a source tree lazily and yields `(path, kind)` pairs for image and
//! video files, applying these filters in order:
//!
//! 1. Hidden paths — any component starting with `.` — are skipped outright,
//!    before anything else (covers `.Spotlight-V100`, `.Trashes`, AppleDouble
//!    droppings on SD cards).
//! 2. Directories flagged by the exclude rules are never descended into.
//! 3. Only regular files pass — no directories, no symlinks.
//! 4. The catalog's own JSON file is skipped by name.
//! 5. Files whose parent directory is excluded, or which match a file
//!    exclude rule, are skipped.
//! 6. Zero-byte files are skipped; stat failures (permissions) are tolerated
//!    and skipped rather than aborting the walk.
//! 7. Whatever remains is classified by extension, or dropped.
//!
//! Enumeration order within a directory is whatever the OS returns; callers
//! must not depend on it.

use crate::catalog::CATALOG_FILENAME;
use crate::excludes::Excludes;
use crate::types::MediaKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "heic", "heif", "webp", "raw", "cr2",
    "nef", "arw", "dng",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "mkv", "m4v", "wmv", "flv", "webm", "mts", "m2ts", "3gp",
];

/// Classify a file as image or video by extension, case-insensitively.
pub fn classify_file(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// Walk `root` recursively, yielding each media file with its classification.
pub fn scan_directory<'a>(
    root: &'a Path,
    excludes: &'a Excludes,
) -> impl Iterator<Item = (PathBuf, MediaKind)> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            // Hidden rule wins over everything, for files and directories alike
            if entry.file_name().to_string_lossy().starts_with('.') {
                return false;
            }
            if entry.file_type().is_dir() {
                let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
                if excludes.should_skip_dir(rel) {
                    return false;
                }
            }
            true
        })
        .filter_map(move |entry| {
            // Unreadable directories/entries are tolerated, not fatal
            let entry = entry.ok()?;
            // Regular files only; with follow_links off, symlinks keep their
            // symlink file type and fall out here
            if !entry.file_type().is_file() {
                return None;
            }
            if entry.file_name().to_string_lossy() == CATALOG_FILENAME {
                return None;
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if let Some(parent) = rel.parent()
                && !parent.as_os_str().is_empty()
                && excludes.should_skip_dir(parent)
            {
                return None;
            }
            if excludes.should_skip_file(entry.path()) {
                return None;
            }
            let meta = entry.metadata().ok()?;
            if meta.len() == 0 {
                return None;
            }
            let kind = classify_file(entry.path())?;
            Some((entry.into_path(), kind))
        })
}

/// Count the media files `scan_directory` would yield, for progress sizing.
///
/// Runs the identical walk with the identical filters; the count always
/// equals the number of items the yielding walk produces.
pub fn count_media_files(root: &Path, excludes: &Excludes) -> u64 {
    scan_directory(root, excludes).count() as u64
}
