//! Content hashing for duplicate detection.
//!
//! Files are streamed in fixed-size chunks so memory use stays flat no
//! matter how large a video file is. Two algorithms are offered: SHA-256
//! (default, collision-resistant) and MD5 (faster on old hardware, plenty
//! for accidental-duplicate detection).
//!
//! The catalog does not tag entries with the algorithm that produced them.
//! Running with `--hash md5` against a catalog built with SHA-256 means no
//! hash ever matches — two disjoint duplicate-detection universes. Pick one
//! algorithm per archive and stay with it.

use clap::ValueEnum;
use md5::Md5;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read buffer size for streaming hashes.
const CHUNK_SIZE: usize = 64 * 1024;

/// Hash algorithm used for duplicate detection, selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Md5,
}

/// Compute the lowercase hex content digest of a file.
///
/// Fails with the underlying `io::Error` if the file cannot be opened or a
/// read fails mid-stream.
pub fn compute_hash(path: &Path, algo: HashAlgorithm) -> io::Result<String> {
    match algo {
        HashAlgorithm::Sha256 => digest_file::<Sha256>(path),
        HashAlgorithm::Md5 => digest_file::<Md5>(path),
    }
}

fn digest_file<D: Digest>(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = D::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(to_hex(&hasher.finalize()))
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing to a String cannot fail
        let _ = write!(out, "{b:02x}");
    }
    out
}
