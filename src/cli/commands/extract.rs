//! `extract print` and `extract check`.

use std::{
    collections::HashSet,
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::debug;

use super::super::{
    args::{ExtractArgs, OutputFormat},
    exit_status::ExitStatus,
    file_scanner::scan_files,
    report::{
        JsonFile, Totals, print_json_to, print_keys_to, print_success, print_totals_to, report,
    },
};
use crate::config::{CONFIG_FILE_NAME, Config, ConfigLoadResult, load_config};
use crate::core::extractor::{BatchResult, extract_files};
use crate::issues::{FileErrorIssue, Issue, WarningIssue};

/// A finished extraction run over the project.
struct Run {
    /// Directory that displayed paths are relative to.
    base: PathBuf,
    scanned: usize,
    batch: BatchResult,
}

impl Run {
    fn start(args: &ExtractArgs) -> Result<Self> {
        let cwd = env::current_dir().context("Failed to read the working directory")?;
        let ConfigLoadResult {
            config,
            root,
            from_file,
        } = load_config(&cwd)?;
        let verbose = args.common.verbose;
        if !from_file && verbose {
            eprintln!(
                "{} No {} found, using defaults",
                "note:".bold().cyan(),
                CONFIG_FILE_NAME
            );
        }

        let config = apply_overrides(config, args);
        config.validate()?;

        // Patterns given on the command line are relative to the working
        // directory, configured ones to the config file.
        let (base, patterns) = if args.patterns.is_empty() {
            (root, config.patterns.clone())
        } else {
            (cwd, args.patterns.clone())
        };

        let scan = scan_files(&base, &patterns, &config.ignores, verbose);
        if scan.skipped_count > 0 && !verbose {
            eprintln!(
                "{} {} path(s) could not be read (use {} for details)",
                "warning:".bold().yellow(),
                scan.skipped_count,
                "-v".cyan()
            );
        }
        let files: Vec<PathBuf> = scan.files.into_iter().collect();
        debug!(files = files.len(), base = %base.display(), "scanned");

        let batch = extract_files(&files, config.parser, &config.extract_options());
        Ok(Self {
            base,
            scanned: files.len(),
            batch,
        })
    }

    fn display(&self, path: &Path) -> String {
        display_path(&self.base, path)
    }

    fn issues(&self) -> Vec<Issue> {
        let warnings = self.batch.files.iter().flat_map(|file| {
            let file_path = self.display(&file.path);
            file.extraction.warnings.iter().map(move |warning| {
                Issue::Warning(WarningIssue {
                    file_path: file_path.clone(),
                    warning: warning.clone(),
                })
            })
        });
        let errors = self.batch.errors.iter().map(|error| {
            Issue::FileError(FileErrorIssue {
                file_path: self.display(&error.path),
                error: error.error.clone(),
            })
        });
        warnings.chain(errors).collect()
    }

    fn totals(&self) -> Totals {
        let unique: HashSet<(Option<&str>, &str)> = self
            .batch
            .files
            .iter()
            .flat_map(|file| &file.extraction.keys)
            .map(|key| (key.namespace.as_deref(), key.key_name.as_str()))
            .collect();
        Totals {
            files: self.batch.files.len(),
            unique_keys: unique.len(),
            warnings: self
                .batch
                .files
                .iter()
                .map(|file| file.extraction.warnings.len())
                .sum(),
        }
    }

    /// `with_keys` false leaves keys out, for `check`.
    fn json(&self, with_keys: bool) -> Vec<JsonFile<'_>> {
        let files = self
            .batch
            .files
            .iter()
            .filter(|file| with_keys || !file.extraction.warnings.is_empty())
            .map(|file| JsonFile {
                file: self.display(&file.path),
                keys: with_keys.then_some(file.extraction.keys.as_slice()),
                warnings: &file.extraction.warnings,
                error: None,
            });
        let errors = self.batch.errors.iter().map(|error| JsonFile {
            file: self.display(&error.path),
            keys: None,
            warnings: &[],
            error: Some(error.error.as_str()),
        });
        files.chain(errors).collect()
    }
}

fn apply_overrides(mut config: Config, args: &ExtractArgs) -> Config {
    if args.parser.is_some() {
        config.parser = args.parser;
    }
    if let Some(strict) = args.strict_namespace() {
        config.strict_namespace = strict;
    }
    if args.default_namespace.is_some() {
        config.default_namespace = args.default_namespace.clone();
    }
    config
}

/// Path relative to `base` with forward slashes, or the full path when it
/// lies outside.
fn display_path(base: &Path, path: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
        Err(_) => path.display().to_string(),
    }
}

/// List every extracted key and warning.
pub fn print(args: &ExtractArgs) -> Result<ExitStatus> {
    let run = Run::start(args)?;

    match args.format {
        OutputFormat::Json => {
            print_json_to(&run.json(true), &mut io::stdout().lock())?;
        }
        OutputFormat::Text => {
            let mut stdout = io::stdout().lock();
            for file in &run.batch.files {
                print_keys_to(&run.display(&file.path), &file.extraction.keys, &mut stdout);
            }
            stdout.flush().context("Failed to write output")?;
            drop(stdout);
            report(&run.issues());
            print_totals_to(run.totals(), &mut io::stdout().lock());
        }
    }

    Ok(ExitStatus::Success)
}

/// Report warnings only; fail when there are any.
pub fn check(args: &ExtractArgs) -> Result<ExitStatus> {
    let run = Run::start(args)?;
    let issues = run.issues();

    match args.format {
        OutputFormat::Json => print_json_to(&run.json(false), &mut io::stdout().lock())?,
        OutputFormat::Text if issues.is_empty() => print_success(run.scanned),
        OutputFormat::Text => report(&issues),
    }

    if issues.is_empty() {
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::Failure)
    }
}
