//! # Media Catalog
//!
//! Duplicate-aware media ingestion: pull photos and videos off SD cards,
//! phone dumps, and old backup drives into one date-organized archive,
//! copying each distinct piece of content exactly once — ever.
//!
//! # Architecture: One Pass Per Source
//!
//! Each source directory is processed in a single streaming pass; per file:
//!
//! ```text
//! 1. Scan      walk the tree, classify by extension    (scan)
//! 2. Hash      stream the content through a digest     (hasher)
//! 3. Dedupe    hash already in the catalog? skip       (catalog)
//! 4. Date      EXIF / container time, fs fallback      (exif, date)
//! 5. Copy      images|videos/YYYY/MM/DD, no overwrite  (copier)
//! 6. Record    insert the catalog entry, checkpoint    (catalog)
//! ```
//!
//! The catalog is a single JSON file living in the target root. It is the
//! only state the tool keeps, and losing it costs at worst a re-copy —
//! never data. That asymmetry shapes the error handling throughout: reads
//! of other people's data (EXIF blobs, half-broken catalogs, unreadable
//! files on dying cards) degrade softly, while writes into the archive are
//! strict and atomic.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Source tree walking, media classification, exclude/hidden filtering |
//! | [`hasher`] | Streaming SHA-256/MD5 content digests |
//! | [`excludes`] | Exclude pattern compilation and matching |
//! | [`exif`] | Raw date-tag extraction from JPEG/TIFF/MP4 containers |
//! | [`date`] | Capture-date resolution: tags first, filesystem timestamps after |
//! | [`copier`] | Dated destination paths, collision suffixes, timestamp-preserving copy |
//! | [`catalog`] | The persistent hash → record JSON catalog |
//! | [`ingest`] | Per-source orchestration and error containment |
//! | [`types`] | Shared types: `MediaKind`, `FileRecord`, run summaries |
//! | [`output`] | Progress bar and end-of-run summary formatting |

pub mod catalog;
pub mod copier;
pub mod date;
pub mod excludes;
pub mod exif;
pub mod hasher;
pub mod ingest;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
