//! Exclude rules for pruning the media scan.
//!
//! Patterns come from an exclude file (one per line, `#` comments) and/or
//! repeated `--exclude` flags; the two sets are simply unioned, with no
//! precedence between them. Supported forms:
//!
//! ```text
//! dqhelper        matches any directory or file named dqhelper
//! *.db            matches any file with that extension
//! .tmp            shorthand for *.tmp (leading dot, no wildcard)
//! PRIVATE/        trailing slash forces directory-only match
//! logs/archive    slash pattern, matched against the path relative to
//!                 the scan root using glob semantics
//! ```
//!
//! Each raw line is classified once at construction into one of three
//! compiled forms — extension set, name pattern, path-segment pattern —
//! and matching checks them in that fixed order. Extension matching is
//! case-insensitive; name and segment matching are case-sensitive.

use glob::Pattern;
use std::collections::HashSet;
use std::path::Path;

/// A compiled pattern that can exclude a directory from the walk.
#[derive(Debug, Clone)]
enum DirPattern {
    /// Matches a single path component (directory or file name).
    Name(Pattern),
    /// Matches the whole path relative to the scan root.
    Segment(Pattern),
}

/// Compiled exclude rule set. Immutable once built for a run.
#[derive(Debug, Clone, Default)]
pub struct Excludes {
    dir_patterns: Vec<DirPattern>,
    file_patterns: Vec<Pattern>,
    ext_set: HashSet<String>,
}

impl Excludes {
    /// The explicit "no rules" value used when nothing is configured.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile raw pattern lines. Blank lines, comments, and lines that do
    /// not compile as globs are dropped (an invalid glob can never match).
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut excludes = Self::default();

        for raw in patterns {
            let mut p = raw.as_ref().trim();
            if p.is_empty() || p.starts_with('#') {
                continue;
            }

            let dir_only = p.ends_with('/');
            p = p.trim_end_matches('/');

            // Leading dot with no wildcard → extension shorthand (.tmp → *.tmp)
            if p.starts_with('.') && !p.contains('*') {
                excludes.ext_set.insert(p.to_lowercase());
                continue;
            }

            // Wildcard extension pattern like *.db
            if let Some(ext) = p.strip_prefix('*')
                && ext.starts_with('.')
                && !p.contains('/')
            {
                excludes.ext_set.insert(ext.to_lowercase());
                continue;
            }

            if dir_only || !p.contains('/') {
                if let Ok(pattern) = Pattern::new(p) {
                    excludes.dir_patterns.push(DirPattern::Name(pattern.clone()));
                    if !dir_only {
                        excludes.file_patterns.push(pattern);
                    }
                }
            } else if let Ok(pattern) = Pattern::new(p) {
                excludes.dir_patterns.push(DirPattern::Segment(pattern));
            }
        }

        excludes
    }

    pub fn is_empty(&self) -> bool {
        self.dir_patterns.is_empty() && self.file_patterns.is_empty() && self.ext_set.is_empty()
    }

    /// Should a directory (path relative to the scan root) be skipped
    /// entirely, contents included?
    pub fn should_skip_dir(&self, rel_path: &Path) -> bool {
        let rel_str = rel_path.to_string_lossy();
        for pattern in &self.dir_patterns {
            match pattern {
                DirPattern::Name(p) => {
                    if rel_path
                        .iter()
                        .any(|part| p.matches(&part.to_string_lossy()))
                    {
                        return true;
                    }
                }
                DirPattern::Segment(p) => {
                    if p.matches(&rel_str) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Should a file be excluded, by extension or by name?
    pub fn should_skip_file(&self, file_path: &Path) -> bool {
        if let Some(ext) = file_path.extension() {
            let dotted = format!(".{}", ext.to_string_lossy().to_lowercase());
            if self.ext_set.contains(&dotted) {
                return true;
            }
        }

        if let Some(name) = file_path.file_name() {
            let name = name.to_string_lossy();
            if self.file_patterns.iter().any(|p| p.matches(&name)) {
                return true;
            }
        }

        false
    }

    /// Human-readable summary of the active rules, for verbose startup output.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.ext_set.is_empty() {
            let mut exts: Vec<&str> = self.ext_set.iter().map(String::as_str).collect();
            exts.sort_unstable();
            parts.push(format!("extensions: {}", exts.join(", ")));
        }
        if !self.dir_patterns.is_empty() {
            let names: Vec<&str> = self
                .dir_patterns
                .iter()
                .map(|p| match p {
                    DirPattern::Name(p) | DirPattern::Segment(p) => p.as_str(),
                })
                .collect();
            parts.push(format!("dirs/names: {}", names.join(", ")));
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// Read patterns from an exclude file, dropping comments and blank lines.
///
/// A missing file is not an error — it means no file-sourced patterns. Any
/// other read failure prints a warning and is otherwise ignored.
pub fn load_exclude_file(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            eprintln!("Warning: could not read exclude file {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Merge exclude-file patterns with CLI patterns (file first, then CLI;
/// matching itself has no precedence between the two sources).
pub fn build_excludes(cli_patterns: &[String], exclude_file: Option<&Path>) -> Excludes {
    let mut patterns = exclude_file.map(load_exclude_file).unwrap_or_default();
    patterns.extend(cli_patterns.iter().cloned());
    Excludes::new(&patterns)
}
