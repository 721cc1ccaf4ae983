//! Extractor orchestrator.
//!
//! [`extract`] runs one file through every stage. [`extract_files`] fans a
//! file set out over the rayon pool; each file owns its tokens, cursor and
//! tree, so extractions share nothing.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use tracing::debug;

use crate::core::ExtractError;
use crate::core::comments::CommentCollector;
use crate::core::cursor::Cursor;
use crate::core::families::Family;
use crate::core::mapper::remap;
use crate::core::merge::{drop_ignored, run_pipeline};
use crate::core::parser::Parser;
use crate::core::report;
use crate::core::tokenizer::{BuiltinTokenizer, Grammar, Tokenizer};

pub use crate::core::report::Extraction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Drop keys whose namespace cannot be determined, with a warning.
    pub strict_namespace: bool,
    /// Namespace for keys that resolve to none.
    pub default_namespace: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strict_namespace: true,
            default_namespace: None,
        }
    }
}

pub fn extract(
    source: &str,
    grammar: Grammar,
    family: Family,
    options: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    extract_with(&BuiltinTokenizer, source, grammar, family, options)
}

/// Extract with a custom tokenizer.
pub fn extract_with(
    tokenizer: &dyn Tokenizer,
    source: &str,
    grammar: Grammar,
    family: Family,
    options: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    let config = family.config();

    let raw = tokenizer.tokenize(source, grammar)?;
    let raw_count = raw.len();
    let tokens = remap(raw, config.mappers);
    let tokens = drop_ignored(run_pipeline(tokens, config.pipeline)?);
    let merged_count = tokens.len();

    let mut collector = CommentCollector::new();
    let mut root = Parser::new(Cursor::new(tokens, &mut collector), &config.rules).parse()?;

    let mut warnings = Vec::new();
    (config.transform)(&mut root, &mut warnings);

    let extraction = report::generate(&root, collector.finish(), warnings, options);
    debug!(
        %family,
        raw = raw_count,
        merged = merged_count,
        keys = extraction.keys.len(),
        warnings = extraction.warnings.len(),
        "extracted"
    );
    Ok(extraction)
}

// ============================================================
// Family detection
// ============================================================

static NGX_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\|\s*translate\b|<[^>]*\st(?:\s|=|/|>)"#).expect("valid regex")
});

fn can_read(family: Family, grammar: Grammar) -> bool {
    grammar.is_script()
        || matches!(
            (family, grammar),
            (Family::Vue, Grammar::Vue)
                | (Family::Svelte, Grammar::Svelte)
                | (Family::Ngx, Grammar::AngularHtml)
        )
}

/// Grammar and family for a file, or `None` if it is not extractable.
///
/// A forced family wins for files it can read. Otherwise the extension
/// decides, and script files are claimed by the family whose package they
/// import.
pub fn detect_family(path: &Path, source: &str, forced: Option<Family>) -> Option<(Grammar, Family)> {
    let grammar = Grammar::from_path(path)?;
    if let Some(family) = forced
        && can_read(family, grammar)
    {
        return Some((grammar, family));
    }
    let family = match grammar {
        Grammar::Vue => Family::Vue,
        Grammar::Svelte => Family::Svelte,
        Grammar::AngularHtml if NGX_TEMPLATE.is_match(source) => Family::Ngx,
        Grammar::AngularHtml => return None,
        _ if source.contains("@tolgee/vue") => Family::Vue,
        _ if source.contains("@tolgee/svelte") => Family::Svelte,
        _ if source.contains("@tolgee/ngx") => Family::Ngx,
        _ => Family::React,
    };
    Some((grammar, family))
}

// ============================================================
// Batch
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExtraction {
    pub path: PathBuf,
    pub family: Family,
    pub extraction: Extraction,
}

/// A file whose extraction failed; the rest of the batch is unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct BatchResult {
    pub files: Vec<FileExtraction>,
    pub errors: Vec<FileError>,
}

enum Outcome {
    Done(FileExtraction),
    Failed(FileError),
    Skipped,
}

fn extract_file(path: &Path, forced: Option<Family>, options: &ExtractOptions) -> Outcome {
    if Grammar::from_path(path).is_none() {
        return Outcome::Skipped;
    }
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            return Outcome::Failed(FileError {
                path: path.to_path_buf(),
                error: e.to_string(),
            });
        }
    };
    let Some((grammar, family)) = detect_family(path, &source, forced) else {
        debug!(path = %path.display(), "skipped");
        return Outcome::Skipped;
    };
    match extract(&source, grammar, family, options) {
        Ok(extraction) => Outcome::Done(FileExtraction {
            path: path.to_path_buf(),
            family,
            extraction,
        }),
        Err(e) => Outcome::Failed(FileError {
            path: path.to_path_buf(),
            error: e.to_string(),
        }),
    }
}

/// Extract every file in parallel. Results are sorted by path.
pub fn extract_files(paths: &[PathBuf], forced: Option<Family>, options: &ExtractOptions) -> BatchResult {
    let outcomes: Vec<Outcome> = paths
        .par_iter()
        .map(|path| extract_file(path, forced, options))
        .collect();

    let mut batch = BatchResult::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Done(file) => batch.files.push(file),
            Outcome::Failed(error) => batch.errors.push(error),
            Outcome::Skipped => {}
        }
    }
    batch.files.sort_by(|a, b| a.path.cmp(&b.path));
    batch.errors.sort_by(|a, b| a.path.cmp(&b.path));
    batch
}
