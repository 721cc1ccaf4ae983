//! Report formatting and printing utilities.
//!
//! Extracted keys are listed per file; warnings and file errors are shown
//! in cargo-style format. Kept apart from the engine so the library can be
//! used without the terminal output.

use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::issues::{ExtractedKey, Issue, Report, Severity, Warning};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print issues in cargo-style format to stdout.
pub fn report(issues: &[Issue]) {
    report_to(issues, &mut io::stdout().lock());
}

/// Print issues to a custom writer.
///
/// Useful for testing or redirecting output.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort_by(compare_issues);

    let max_line_width = calculate_max_line_width(&sorted);

    for issue in &sorted {
        print_issue(issue, writer, max_line_width);
    }

    print_summary(&sorted, writer);
}

/// Print a success message when no issues are found.
pub fn print_success(source_files: usize) {
    print_success_to(source_files, &mut io::stdout().lock());
}

/// Print a success message to a custom writer.
pub fn print_success_to<W: Write>(source_files: usize, writer: &mut W) {
    let msg = format!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} source {} - no issues found",
            source_files,
            plural(source_files, "file", "files")
        )
        .green()
    );
    let _ = writeln!(writer, "{}", msg);
}

/// Print the keys found in one file.
pub fn print_keys_to<W: Write>(file: &str, keys: &[ExtractedKey], writer: &mut W) {
    if keys.is_empty() {
        return;
    }
    let _ = writeln!(writer, "{}", file.bold());

    let line_width = keys
        .iter()
        .map(|k| k.line.to_string().len())
        .max()
        .unwrap_or(1);
    let key_width = keys
        .iter()
        .map(|k| UnicodeWidthStr::width(k.key_name.as_str()))
        .max()
        .unwrap_or(0);

    for key in keys {
        let padding = key_width - UnicodeWidthStr::width(key.key_name.as_str());
        let mut row = format!(
            "  {:>width$} {} {}{:padding$}",
            key.line.to_string().blue(),
            "|".blue(),
            key.key_name.green(),
            "",
            width = line_width,
            padding = padding
        );
        if let Some(namespace) = &key.namespace {
            row.push_str(&format!("  {} {}", "ns:".dimmed(), namespace.cyan()));
        }
        if let Some(default_value) = &key.default_value {
            row.push_str(&format!("  {}", format!("{:?}", default_value).dimmed()));
        }
        let _ = writeln!(writer, "{}", row.trim_end());
    }
    let _ = writeln!(writer);
}

/// Totals shown after `extract print`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub files: usize,
    /// Distinct (namespace, key) pairs.
    pub unique_keys: usize,
    pub warnings: usize,
}

pub fn print_totals_to<W: Write>(totals: Totals, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {} unique {} in {} {}, {} {}",
        "Found".bold(),
        totals.unique_keys,
        plural(totals.unique_keys, "key", "keys"),
        totals.files,
        plural(totals.files, "file", "files"),
        totals.warnings,
        plural(totals.warnings, "warning", "warnings"),
    );
}

/// One file in the JSON output.
#[derive(Debug, Serialize)]
pub struct JsonFile<'a> {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<&'a [ExtractedKey]>,
    #[serde(skip_serializing_if = "<[Warning]>::is_empty")]
    pub warnings: &'a [Warning],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

pub fn print_json_to<W: Write>(files: &[JsonFile<'_>], writer: &mut W) -> Result<()> {
    let json = serde_json::to_string_pretty(files).context("Failed to serialize output")?;
    writeln!(writer, "{}", json).context("Failed to write output")?;
    Ok(())
}

// ============================================================
// Internal Functions
// ============================================================

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_line_width: usize) {
    let severity_str = match issue.report_severity() {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        issue.message(),
        issue.code().dimmed().cyan()
    );

    let _ = writeln!(writer, "  {} {}", "-->".blue(), issue.location());

    if let Some(details) = issue.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Warning)
        .count();
    let total_problems = total_errors + total_warnings;

    if total_problems > 0 {
        let _ = writeln!(
            writer,
            "{} {} {} ({} {}, {} {})",
            FAILURE_MARK.red(),
            total_problems,
            plural(total_problems, "problem", "problems"),
            total_errors,
            plural(total_errors, "error", "errors").red(),
            total_warnings,
            plural(total_warnings, "warning", "warnings").yellow()
        );
    }
}

fn calculate_max_line_width(issues: &[Issue]) -> usize {
    issues
        .iter()
        .map(Issue::line)
        .filter(|&line| line > 0)
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}

fn compare_issues(a: &Issue, b: &Issue) -> std::cmp::Ordering {
    a.file_path()
        .cmp(b.file_path())
        .then_with(|| a.line().cmp(&b.line()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::{FileErrorIssue, WarningIssue, WarningKind};
    use pretty_assertions::assert_eq;

    fn strip_ansi(s: &str) -> String {
        let mut result = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    fn render(f: impl FnOnce(&mut Vec<u8>)) -> String {
        let mut out = Vec::new();
        f(&mut out);
        strip_ansi(&String::from_utf8(out).unwrap())
    }

    fn warning(file: &str, kind: WarningKind, line: usize) -> Issue {
        Issue::Warning(WarningIssue {
            file_path: file.to_string(),
            warning: Warning::new(kind, line),
        })
    }

    fn key(name: &str, ns: Option<&str>, default: Option<&str>, line: usize) -> ExtractedKey {
        ExtractedKey {
            key_name: name.to_string(),
            namespace: ns.map(str::to_string),
            default_value: default.map(str::to_string),
            line,
        }
    }

    // ============================================================
    // Issues
    // ============================================================

    #[test]
    fn test_report_empty_prints_nothing() {
        assert_eq!(render(|w| report_to(&[], w)), "");
    }

    #[test]
    fn test_report_warning() {
        let out = render(|w| report_to(&[warning("src/App.tsx", WarningKind::DynamicKey, 12)], w));
        assert!(out.contains("warning: "));
        assert!(out.contains("W_DYNAMIC_KEY"));
        assert!(out.contains("--> src/App.tsx:12"));
        assert!(out.contains("= note: "));
        assert!(out.contains("1 problem (0 errors, 1 warning)"));
    }

    #[test]
    fn test_report_unknown_tag_shows_raw_tag() {
        let out = render(|w| {
            report_to(
                &[warning("a.ts", WarningKind::Other("W_NEW_THING".to_string()), 1)],
                w,
            )
        });
        assert!(out.contains("warning: W_NEW_THING  W_NEW_THING"));
        assert!(!out.contains("note:"));
    }

    #[test]
    fn test_report_sorts_by_file_then_line() {
        let issues = vec![
            warning("b.ts", WarningKind::DynamicKey, 1),
            warning("a.ts", WarningKind::DynamicNamespace, 9),
            Issue::FileError(FileErrorIssue {
                file_path: "a.ts".to_string(),
                error: "boom".to_string(),
            }),
            warning("a.ts", WarningKind::UnusedIgnore, 2),
        ];
        let out = render(|w| report_to(&issues, w));
        let locations: Vec<&str> = out
            .lines()
            .filter_map(|l| l.trim().strip_prefix("--> "))
            .collect();
        assert_eq!(locations, vec!["a.ts", "a.ts:2", "a.ts:9", "b.ts:1"]);
        assert!(out.contains("error: boom  extract-error"));
        assert!(out.contains("4 problems (1 error, 3 warnings)"));
    }

    // ============================================================
    // Keys, totals and JSON
    // ============================================================

    #[test]
    fn test_print_keys_aligns_columns() {
        let keys = vec![
            key("a", Some("common"), None, 3),
            key("longer", None, Some("Hello"), 12),
        ];
        let out = render(|w| print_keys_to("src/App.tsx", &keys, w));
        assert_eq!(
            out,
            "src/App.tsx\n   3 | a       ns: common\n  12 | longer  \"Hello\"\n\n"
        );
    }

    #[test]
    fn test_print_keys_skips_empty_files() {
        assert_eq!(render(|w| print_keys_to("a.ts", &[], w)), "");
    }

    #[test]
    fn test_print_success() {
        assert_eq!(
            render(|w| print_success_to(1, w)),
            "\u{2713} Checked 1 source file - no issues found\n"
        );
    }

    #[test]
    fn test_print_totals() {
        let totals = Totals {
            files: 2,
            unique_keys: 1,
            warnings: 0,
        };
        assert_eq!(
            render(|w| print_totals_to(totals, w)),
            "Found 1 unique key in 2 files, 0 warnings\n"
        );
    }

    #[test]
    fn test_print_json() {
        let keys = vec![key("a", None, None, 1)];
        let warnings = vec![Warning::new(WarningKind::DynamicKey, 2)];
        let files = vec![
            JsonFile {
                file: "a.ts".to_string(),
                keys: Some(keys.as_slice()),
                warnings: &warnings,
                error: None,
            },
            JsonFile {
                file: "b.ts".to_string(),
                keys: None,
                warnings: &[],
                error: Some("unreadable"),
            },
        ];
        let out = render(|w| print_json_to(&files, w).unwrap());
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {
                    "file": "a.ts",
                    "keys": [{ "keyName": "a", "line": 1 }],
                    "warnings": [{ "warning": "W_DYNAMIC_KEY", "line": 2 }]
                },
                { "file": "b.ts", "error": "unreadable" }
            ])
        );
    }
}
