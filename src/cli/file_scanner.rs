use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::WalkDir;

use crate::core::tokenizer::Grammar;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
pub struct ScanResult {
    /// Sorted, deduplicated source files.
    pub files: BTreeSet<PathBuf>,
    pub skipped_count: usize,
}

/// Compiled ignore list: literal prefixes and glob patterns.
struct Ignores {
    literal: Vec<PathBuf>,
    globs: Vec<Pattern>,
}

impl Ignores {
    fn new(base_dir: &Path, patterns: &[String], verbose: bool) -> Self {
        let mut literal = Vec::new();
        let mut globs = Vec::new();
        for p in patterns {
            if is_glob_pattern(p) {
                match Pattern::new(p) {
                    Ok(pattern) => globs.push(pattern),
                    Err(e) => {
                        if verbose {
                            eprintln!(
                                "{} Invalid ignore pattern '{}': {}",
                                "warning:".bold().yellow(),
                                p,
                                e
                            );
                        }
                    }
                }
            } else {
                literal.push(base_dir.join(p));
            }
        }
        Self { literal, globs }
    }

    /// Globs are tried against both the full path and the path relative to
    /// the base directory.
    fn matches(&self, base_dir: &Path, path: &Path) -> bool {
        if self.literal.iter().any(|ignore| path.starts_with(ignore)) {
            return true;
        }
        let relative = path.strip_prefix(base_dir).unwrap_or(path);
        self.globs
            .iter()
            .any(|p| p.matches_path(path) || p.matches_path(relative))
    }
}

/// Collect the source files named by `patterns` under `base_dir`.
///
/// A pattern is a glob (matching files or directories) or a literal path.
/// Directories are walked recursively; only files with an extractable
/// extension are kept.
pub fn scan_files(
    base_dir: &Path,
    patterns: &[String],
    ignore_patterns: &[String],
    verbose: bool,
) -> ScanResult {
    let mut files = BTreeSet::new();
    let mut skipped_count = 0;
    let ignores = Ignores::new(base_dir, ignore_patterns, verbose);

    let roots: Vec<PathBuf> = if patterns.is_empty() {
        vec![base_dir.to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for pattern in patterns {
            if is_glob_pattern(pattern) {
                let full_pattern = base_dir.join(pattern);
                match glob(&full_pattern.to_string_lossy()) {
                    Ok(entries) => paths.extend(entries.flatten()),
                    Err(e) => {
                        if verbose {
                            eprintln!(
                                "{} Invalid glob pattern '{}': {}",
                                "warning:".bold().yellow(),
                                pattern,
                                e
                            );
                        }
                    }
                }
            } else {
                let path = base_dir.join(pattern);
                if path.exists() {
                    paths.push(path);
                } else if verbose {
                    eprintln!(
                        "{} Pattern path does not exist: {}",
                        "warning:".bold().yellow(),
                        path.display()
                    );
                }
            }
        }
        paths
    };

    for root in roots {
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    if verbose {
                        eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                    }
                    continue;
                }
            };
            let path = entry.path();
            if ignores.matches(base_dir, path) {
                continue;
            }
            if path.is_file() && is_scannable_file(path) {
                files.insert(path.to_path_buf());
            }
        }
    }

    ScanResult {
        files,
        skipped_count,
    }
}

fn is_scannable_file(path: &Path) -> bool {
    Grammar::from_path(path).is_some()
}
