//! Capture-date resolution.
//!
//! Finds the best-known moment a photo or video was taken. Embedded metadata
//! wins when present and sane; otherwise filesystem timestamps are used, in
//! decreasing order of trustworthiness:
//!
//! 1. Embedded tags (`DateTimeOriginal` → `DateTimeDigitized` → `DateTime` →
//!    container creation time), parsed as `YYYY:MM:DD HH:MM:SS`. Zeroed or
//!    pre-1970 values are treated as absent — cameras with a dead clock
//!    write `0000:00:00 00:00:00`.
//! 2. True creation time (`birthtime`) where the platform exposes one.
//! 3. Inode change time (`ctime`), but only while it is at or before the
//!    modification time: for freshly written files ctime approximates
//!    creation, while a later ctime usually means a metadata-only edit,
//!    in which case mtime is the earlier, safer estimate. A heuristic,
//!    not a guarantee.
//! 4. Modification time (`mtime`).
//!
//! Resolution never fails for lack of metadata; only a stat failure on the
//! file itself surfaces as an error.
//!
//! Tag reading goes through the [`TagReader`] seam so tests can inject tag
//! maps without crafting binary files; [`EmbeddedTagReader`] is the
//! production implementation over [`crate::exif`].

use crate::exif;
use crate::types::DateSource;
use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// The fixed datetime format embedded metadata uses.
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Tags checked in priority order.
const DATE_TAG_PRIORITY: &[&str] = &[
    "DateTimeOriginal",
    "DateTimeDigitized",
    "DateTime",
    "CreationDate",
    "CreateDate",
];

/// Source of embedded tag values. One production implementation exists;
/// tests supply their own.
pub trait TagReader {
    /// Tag name → raw string value. Empty map when nothing is readable.
    fn read_tags(&self, path: &Path) -> HashMap<String, String>;
}

/// Reads tags from the file's own embedded metadata.
pub struct EmbeddedTagReader;

impl TagReader for EmbeddedTagReader {
    fn read_tags(&self, path: &Path) -> HashMap<String, String> {
        exif::read_date_tags(path)
    }
}

/// Parse an embedded date string, returning `None` if invalid or zeroed.
///
/// chrono already refuses month or day zero during parsing; the explicit
/// year guard catches the remaining pre-epoch garbage.
pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    let dt = NaiveDateTime::parse_from_str(raw.trim(), EXIF_DATE_FORMAT).ok()?;
    (dt.year() >= 1970).then_some(dt)
}

/// First valid date among the priority-ordered tags, if any.
fn date_from_tags(tags: &HashMap<String, String>) -> Option<NaiveDateTime> {
    DATE_TAG_PRIORITY
        .iter()
        .find_map(|tag| tags.get(*tag).and_then(|raw| parse_exif_datetime(raw)))
}

/// Resolve a capture date from filesystem timestamps alone.
pub fn date_from_filesystem(path: &Path) -> io::Result<(NaiveDateTime, DateSource)> {
    let meta = fs::metadata(path)?;

    if let Ok(created) = meta.created()
        && created
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() > 0)
            .unwrap_or(false)
    {
        return Ok((naive_local(created), DateSource::Birthtime));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let ctime = meta.ctime();
        let mtime = meta.mtime();
        if ctime <= mtime
            && let Some(dt) = naive_from_unix(ctime)
        {
            return Ok((dt, DateSource::Ctime));
        }
        if let Some(dt) = naive_from_unix(mtime) {
            return Ok((dt, DateSource::Mtime));
        }
    }

    let modified = meta.modified()?;
    Ok((naive_local(modified), DateSource::Mtime))
}

/// Best-known capture date via the production tag reader.
pub fn resolve_media_date(path: &Path) -> io::Result<(NaiveDateTime, DateSource)> {
    resolve_with_reader(&EmbeddedTagReader, path)
}

/// Metadata first, filesystem fallback. Always yields a usable date unless
/// the file cannot even be stat-ed.
pub fn resolve_with_reader(
    reader: &impl TagReader,
    path: &Path,
) -> io::Result<(NaiveDateTime, DateSource)> {
    if let Some(dt) = date_from_tags(&reader.read_tags(path)) {
        return Ok((dt, DateSource::Exif));
    }
    date_from_filesystem(path)
}

fn naive_local(t: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(t).naive_local()
}

#[cfg(unix)]
fn naive_from_unix(secs: i64) -> Option<NaiveDateTime> {
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.naive_local())
}
