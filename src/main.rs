use clap::Parser;
use media_catalog::catalog::{self, CatalogStore};
use media_catalog::excludes;
use media_catalog::hasher::HashAlgorithm;
use media_catalog::ingest::{self, IngestOptions, NoProgress};
use media_catalog::output::{self, ConsoleProgress};
use media_catalog::scan;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "media-catalog")]
#[command(about = "Consolidate photos and videos into a dated, duplicate-free archive")]
#[command(long_about = "\
Consolidate photos and videos into a dated, duplicate-free archive

Scans one or more source directories (SD cards, phone dumps, old backup
drives), content-hashes every media file, and copies files it has not seen
before into a date-organized tree under the target:

  target/
  ├── images/2024/03/15/IMG_0042.jpg
  ├── videos/2023/12/24/GOPR0117.mp4
  └── media_catalog.json

The catalog file records every copy by content hash, so re-running over the
same card — or a second card holding the same shots — copies nothing.
Duplicates are detected by content, not by name; renamed copies are still
skipped. Nothing in the target is ever overwritten: a name collision between
genuinely different files gets a numbered suffix (IMG_0042_2.jpg).

The capture date comes from embedded metadata (EXIF, or the video
container's creation time) when present, with filesystem timestamps as the
fallback. Use --dry-run to preview a run without writing anything.")]
#[command(version)]
struct Cli {
    /// Source directory to scan (repeat for multiple sources)
    #[arg(long = "source", required = true)]
    sources: Vec<PathBuf>,

    /// Archive root the dated tree is built under
    #[arg(long)]
    target: PathBuf,

    /// Content hash algorithm (pick one per archive and stay with it)
    #[arg(long, value_enum, default_value = "sha256")]
    hash: HashAlgorithm,

    /// Report what would be copied without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Print one line per file; implies --no-progress, since per-file
    /// lines and the bar would garble each other
    #[arg(long, short)]
    verbose: bool,

    /// Catalog file location (default: <target>/media_catalog.json)
    #[arg(long)]
    catalog_path: Option<PathBuf>,

    /// Exclude pattern: a name, *.ext, dir/, or a relative path glob
    /// (repeatable)
    #[arg(long = "exclude")]
    excludes: Vec<String>,

    /// File of exclude patterns, one per line, # comments
    #[arg(long)]
    exclude_file: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    for source in &cli.sources {
        if !source.is_dir() {
            return Err(format!("source is not a directory: {}", source.display()).into());
        }
    }
    if cli.target.exists() && !cli.target.is_dir() {
        return Err(format!("target is not a directory: {}", cli.target.display()).into());
    }

    let excludes = excludes::build_excludes(&cli.excludes, cli.exclude_file.as_deref());
    if cli.verbose && !excludes.is_empty() {
        println!("Excludes: {}", excludes.describe());
    }

    let catalog_path = cli
        .catalog_path
        .clone()
        .unwrap_or_else(|| catalog::catalog_path_for(&cli.target));
    let mut store = CatalogStore::open(&catalog_path);
    println!(
        "Catalog: {} ({} entries)",
        catalog_path.display(),
        store.record_count()
    );

    let options = IngestOptions {
        hash_algo: cli.hash,
        dry_run: cli.dry_run,
        verbose: cli.verbose,
    };

    let mut summaries = Vec::new();
    for source in &cli.sources {
        println!("Scanning {}", source.display());
        let summary = if cli.no_progress || cli.verbose {
            ingest::process_source(
                source,
                &cli.target,
                &mut store,
                &excludes,
                &options,
                &mut NoProgress,
            )?
        } else {
            let total = scan::count_media_files(source, &excludes);
            let mut bar = ConsoleProgress::new(total);
            let summary = ingest::process_source(
                source,
                &cli.target,
                &mut store,
                &excludes,
                &options,
                &mut bar,
            )?;
            bar.finish();
            summary
        };
        summaries.push(summary);
    }

    output::print_summary(&summaries, &catalog_path, store.record_count(), cli.dry_run);

    Ok(())
}
