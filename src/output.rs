//! CLI output: the live progress bar and the end-of-run summary.
//!
//! The summary has a `format_summary` function (returns `Vec<String>`) for
//! testability and a `print_summary` wrapper that writes to stdout; the
//! format function is pure.
//!
//! ```text
//! ============================================
//! Ingestion summary
//! ============================================
//!
//! Source: /media/sdcard
//!   Scanned: 412
//!   Copied:  37
//!   Skipped: 375 (already cataloged)
//!   Errors:  0
//!
//! Catalog: /backup/media_catalog.json (1893 entries)
//! ```

use crate::ingest::Progress;
use crate::types::ScanSummary;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

const BANNER_WIDTH: usize = 44;

/// Individual error lines shown before collapsing the rest into a count.
const MAX_ERRORS_SHOWN: usize = 20;

/// Progress bar for one source, driven by the per-file [`Progress`] calls.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);
        if let Ok(style) =
            ProgressStyle::with_template("[{bar:40}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Progress for ConsoleProgress {
    fn report(&mut self, scanned: u64, copied: u64, skipped: u64) {
        self.bar.set_position(scanned);
        self.bar
            .set_message(format!("{copied} copied, {skipped} skipped"));
    }
}

/// Render the end-of-run summary for all processed sources.
pub fn format_summary(
    summaries: &[ScanSummary],
    catalog_path: &Path,
    record_count: usize,
    dry_run: bool,
) -> Vec<String> {
    let banner = "=".repeat(BANNER_WIDTH);
    let title = if dry_run {
        "Dry run summary (nothing was written)"
    } else {
        "Ingestion summary"
    };

    let mut lines = vec![banner.clone(), title.to_string(), banner];

    for summary in summaries {
        lines.push(String::new());
        lines.push(format!("Source: {}", summary.source_path));
        lines.push(format!("  Scanned: {}", summary.files_scanned));
        lines.push(format!("  Copied:  {}", summary.files_copied));
        lines.push(format!(
            "  Skipped: {} (already cataloged)",
            summary.files_skipped
        ));
        lines.push(format!("  Errors:  {}", summary.files_errored));
    }

    if summaries.len() > 1 {
        let scanned: u64 = summaries.iter().map(|s| s.files_scanned).sum();
        let copied: u64 = summaries.iter().map(|s| s.files_copied).sum();
        let skipped: u64 = summaries.iter().map(|s| s.files_skipped).sum();
        let errored: u64 = summaries.iter().map(|s| s.files_errored).sum();
        lines.push(String::new());
        lines.push(format!(
            "Total: {scanned} scanned, {copied} copied, {skipped} skipped, {errored} errors"
        ));
    }

    let errors: Vec<&(String, String)> = summaries.iter().flat_map(|s| s.errors.iter()).collect();
    if !errors.is_empty() {
        lines.push(String::new());
        lines.push("Errors:".to_string());
        for (path, message) in errors.iter().take(MAX_ERRORS_SHOWN) {
            lines.push(format!("  {path}: {message}"));
        }
        if errors.len() > MAX_ERRORS_SHOWN {
            lines.push(format!(
                "  ... and {} more errors",
                errors.len() - MAX_ERRORS_SHOWN
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Catalog: {} ({} entries)",
        catalog_path.display(),
        record_count
    ));

    lines
}

pub fn print_summary(
    summaries: &[ScanSummary],
    catalog_path: &Path,
    record_count: usize,
    dry_run: bool,
) {
    for line in format_summary(summaries, catalog_path, record_count, dry_run) {
        println!("{line}");
    }
}
