//! Run orchestration: scan, hash, dedupe, copy, record.
//!
//! [`process_source`] drives one source directory end to end. Per file the
//! pipeline is:
//!
//! 1. Hash the content.
//! 2. Hash already cataloged → skip.
//! 3. Resolve the capture date, build the dated destination path.
//! 4. Copy (collision-resolved, never overwriting) and insert a catalog
//!    record.
//!
//! Failures are contained at file granularity: a file that cannot be
//! hashed, dated, or copied lands in the summary's error list and the run
//! moves on. The catalog is checkpoint-saved every [`CHECKPOINT_INTERVAL`]
//! insertions so a mid-run interruption loses at most one batch of records
//! (the copies themselves are already on disk and would be re-copied, not
//! lost). Dry runs count and report but write nothing — no copies, no
//! records, no catalog save.

use crate::catalog::{CatalogError, CatalogStore};
use crate::copier::{build_destination_path, copy_file};
use crate::date::resolve_media_date;
use crate::excludes::Excludes;
use crate::hasher::{HashAlgorithm, compute_hash};
use crate::scan::scan_directory;
use crate::types::{FileRecord, ScanSummary};
use chrono::Local;
use std::fs;
use std::path::Path;

/// Catalog insertions between checkpoint saves.
pub const CHECKPOINT_INTERVAL: u64 = 50;

/// Knobs for a single run, shared across all its sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    pub hash_algo: HashAlgorithm,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Per-file progress sink. The CLI plugs a progress bar in here; tests and
/// quiet mode use [`NoProgress`].
pub trait Progress {
    fn report(&mut self, scanned: u64, copied: u64, skipped: u64);
}

/// Silent [`Progress`] implementation.
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _scanned: u64, _copied: u64, _skipped: u64) {}
}

/// Ingest every media file under `source` into `target_root`, recording
/// copies in `store`.
///
/// Returns the per-source counters. `Err` is reserved for the end-of-source
/// catalog save failing; everything file-scoped is reported through the
/// summary instead.
pub fn process_source(
    source: &Path,
    target_root: &Path,
    store: &mut CatalogStore,
    excludes: &Excludes,
    options: &IngestOptions,
    progress: &mut dyn Progress,
) -> Result<ScanSummary, CatalogError> {
    let mut summary = ScanSummary::new(source);
    let mut insertions: u64 = 0;

    for (path, kind) in scan_directory(source, excludes) {
        summary.files_scanned += 1;

        match ingest_one(&path, target_root, store, options, kind) {
            Ok(Outcome::Skipped) => {
                summary.files_skipped += 1;
                if options.verbose {
                    println!("SKIP  {} (already cataloged)", path.display());
                }
            }
            Ok(Outcome::Copied { dest }) => {
                summary.files_copied += 1;
                insertions += 1;
                if options.verbose {
                    println!("COPY  {} -> {}", path.display(), dest);
                }
                if !options.dry_run && insertions % CHECKPOINT_INTERVAL == 0 {
                    // A failed checkpoint is not fatal; the end-of-source
                    // save will retry
                    if let Err(e) = store.save() {
                        record_error(&mut summary, &path, &format!("checkpoint save failed: {e}"));
                    }
                }
            }
            Ok(Outcome::WouldCopy { dest }) => {
                summary.files_copied += 1;
                if options.verbose {
                    println!("DRY-RUN {} -> {}", path.display(), dest);
                }
            }
            Err(message) => {
                record_error(&mut summary, &path, &message);
                if options.verbose {
                    println!("ERROR {}: {message}", path.display());
                }
            }
        }

        progress.report(
            summary.files_scanned,
            summary.files_copied,
            summary.files_skipped,
        );
    }

    if !options.dry_run {
        store.save()?;
    }
    Ok(summary)
}

enum Outcome {
    Skipped,
    Copied { dest: String },
    WouldCopy { dest: String },
}

fn ingest_one(
    path: &Path,
    target_root: &Path,
    store: &mut CatalogStore,
    options: &IngestOptions,
    kind: crate::types::MediaKind,
) -> Result<Outcome, String> {
    let hash = compute_hash(path, options.hash_algo).map_err(|e| format!("hashing failed: {e}"))?;

    if store.contains(&hash) {
        return Ok(Outcome::Skipped);
    }

    let (taken, date_source) =
        resolve_media_date(path).map_err(|e| format!("date resolution failed: {e}"))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| "path has no file name".to_string())?
        .to_string_lossy();
    let planned = build_destination_path(target_root, kind, taken.date(), &file_name);

    if options.dry_run {
        return Ok(Outcome::WouldCopy {
            dest: planned.display().to_string(),
        });
    }

    let dest = copy_file(path, &planned).map_err(|e| format!("copy failed: {e}"))?;
    let size = fs::metadata(path)
        .map_err(|e| format!("stat failed: {e}"))?
        .len();

    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    store.add(FileRecord {
        hash,
        original_path: path.display().to_string(),
        destination_path: dest.display().to_string(),
        media_type: kind,
        extension,
        date_taken: taken.date().to_string(),
        date_source,
        file_size_bytes: size,
        cataloged_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
    });

    Ok(Outcome::Copied {
        dest: dest.display().to_string(),
    })
}

fn record_error(summary: &mut ScanSummary, path: &Path, message: &str) {
    summary.files_errored += 1;
    summary
        .errors
        .push((path.display().to_string(), message.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog_path_for;
    use crate::test_helpers::{exif_jpeg_bytes, make_file};
    use tempfile::TempDir;
    use walkdir::WalkDir;

    fn run(source: &Path, target: &Path, store: &mut CatalogStore) -> ScanSummary {
        run_with(source, target, store, IngestOptions::default())
    }

    fn run_with(
        source: &Path,
        target: &Path,
        store: &mut CatalogStore,
        options: IngestOptions,
    ) -> ScanSummary {
        process_source(
            source,
            target,
            store,
            &Excludes::empty(),
            &options,
            &mut NoProgress,
        )
        .unwrap()
    }

    fn copied_files(target: &Path) -> Vec<std::path::PathBuf> {
        WalkDir::new(target)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| !p.ends_with("media_catalog.json"))
            .collect()
    }

    // =========================================================================
    // Core flow
    // =========================================================================

    #[test]
    fn copies_new_files_and_records_them() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("card");
        let target = tmp.path().join("backup");
        make_file(&source.join("a.jpg"), b"photo a");
        make_file(&source.join("clips/b.mp4"), b"clip b");

        let mut store = CatalogStore::open(&catalog_path_for(&target));
        let summary = run(&source, &target, &mut store);

        assert_eq!(summary.files_scanned, 2);
        assert_eq!(summary.files_copied, 2);
        assert_eq!(summary.files_skipped, 0);
        assert_eq!(summary.files_errored, 0);
        assert_eq!(store.record_count(), 2);
        assert_eq!(copied_files(&target).len(), 2);

        // Catalog was persisted at end of source
        let reopened = CatalogStore::open(&catalog_path_for(&target));
        assert_eq!(reopened.record_count(), 2);
    }

    #[test]
    fn second_run_skips_everything() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("card");
        let target = tmp.path().join("backup");
        make_file(&source.join("a.jpg"), b"photo a");
        make_file(&source.join("b.jpg"), b"photo b");

        let mut store = CatalogStore::open(&catalog_path_for(&target));
        run(&source, &target, &mut store);

        // Fresh store loaded from disk, as a new invocation would
        let mut store = CatalogStore::open(&catalog_path_for(&target));
        let summary = run(&source, &target, &mut store);

        assert_eq!(summary.files_copied, 0);
        assert_eq!(summary.files_skipped, 2);
        assert_eq!(copied_files(&target).len(), 2);
    }

    #[test]
    fn identical_content_copied_once() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("card");
        let target = tmp.path().join("backup");
        make_file(&source.join("IMG_0001.jpg"), b"same bytes");
        make_file(&source.join("copies/IMG_0001 (1).jpg"), b"same bytes");

        let mut store = CatalogStore::open(&catalog_path_for(&target));
        let summary = run(&source, &target, &mut store);

        assert_eq!(summary.files_copied, 1);
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(copied_files(&target).len(), 1);
    }

    #[test]
    fn same_name_different_content_gets_numbered() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("card");
        let target = tmp.path().join("backup");
        // Same capture date and file name, different content
        make_file(
            &source.join("cam1/IMG_0042.jpg"),
            &exif_jpeg_bytes("2024:03:15 10:00:00"),
        );
        let mut other = exif_jpeg_bytes("2024:03:15 11:00:00");
        other.extend_from_slice(b"different tail");
        make_file(&source.join("cam2/IMG_0042.jpg"), &other);

        let mut store = CatalogStore::open(&catalog_path_for(&target));
        let summary = run(&source, &target, &mut store);

        assert_eq!(summary.files_copied, 2);
        let day_dir = target.join("images/2024/03/15");
        assert!(day_dir.join("IMG_0042.jpg").exists());
        assert!(day_dir.join("IMG_0042_2.jpg").exists());
    }

    #[test]
    fn exif_date_places_file_in_dated_tree() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("card");
        let target = tmp.path().join("backup");
        make_file(
            &source.join("photo.jpg"),
            &exif_jpeg_bytes("2023:12:24 08:30:00"),
        );

        let mut store = CatalogStore::open(&catalog_path_for(&target));
        run(&source, &target, &mut store);

        let dest = target.join("images/2023/12/24/photo.jpg");
        assert!(dest.exists());

        let record = store.get(&compute_hash(&dest, HashAlgorithm::Sha256).unwrap());
        let record = record.unwrap();
        assert_eq!(record.date_taken, "2023-12-24");
        assert_eq!(record.extension, ".jpg");
    }

    // =========================================================================
    // Dry run
    // =========================================================================

    #[test]
    fn dry_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("card");
        let target = tmp.path().join("backup");
        make_file(&source.join("a.jpg"), b"photo a");

        let mut store = CatalogStore::open(&catalog_path_for(&target));
        let summary = run_with(
            &source,
            &target,
            &mut store,
            IngestOptions {
                dry_run: true,
                ..Default::default()
            },
        );

        assert_eq!(summary.files_copied, 1);
        assert!(!target.exists());
        assert!(!catalog_path_for(&target).exists());
    }

    #[test]
    fn dry_run_still_reports_duplicates() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("card");
        let target = tmp.path().join("backup");
        make_file(&source.join("a.jpg"), b"photo a");

        let mut store = CatalogStore::open(&catalog_path_for(&target));
        run(&source, &target, &mut store);

        let summary = run_with(
            &source,
            &target,
            &mut store,
            IngestOptions {
                dry_run: true,
                ..Default::default()
            },
        );
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.files_copied, 0);
    }

    // =========================================================================
    // Error containment
    // =========================================================================

    #[test]
    fn vanished_file_surfaces_as_error_outcome() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("backup");
        let mut store = CatalogStore::open(&catalog_path_for(&target));

        // A file gone between enumeration and hashing
        let result = ingest_one(
            &tmp.path().join("vanished.jpg"),
            &target,
            &mut store,
            &IngestOptions::default(),
            crate::types::MediaKind::Image,
        );

        let message = result.err().unwrap();
        assert!(message.contains("hashing failed"));
        assert_eq!(store.record_count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_reported_not_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("card");
        let target = tmp.path().join("backup");
        make_file(&source.join("good.jpg"), b"photo");
        let bad = source.join("bad.jpg");
        make_file(&bad, b"locked");
        fs::set_permissions(&bad, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&bad).is_ok() {
            // Running as root; permissions cannot make the file unreadable
            return;
        }

        let mut store = CatalogStore::open(&catalog_path_for(&target));
        let summary = run(&source, &target, &mut store);

        fs::set_permissions(&bad, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(summary.files_copied, 1);
        assert_eq!(summary.files_errored, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].0.ends_with("bad.jpg"));
    }
}
