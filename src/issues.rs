//! Extraction results and issue types.
//!
//! The engine produces [`ExtractedKey`] and [`Warning`] records per file.
//! The CLI wraps warnings and per-file failures into [`Issue`]s, which all
//! implement [`Report`] for display.

use std::fmt;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================
// Engine Output
// ============================================================

/// A statically extracted translation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedKey {
    pub key_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub line: usize,
}

/// A diagnostic attached to a line of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub warning: WarningKind,
    pub line: usize,
}

impl Warning {
    pub fn new(warning: WarningKind, line: usize) -> Self {
        Self { warning, line }
    }
}

// ============================================================
// Warning Kinds
// ============================================================

/// Warning kinds, identified by their `W_*` tag.
///
/// The set is open: tags this build does not know are kept as
/// [`WarningKind::Other`] and displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WarningKind {
    DynamicKey,
    DynamicNamespace,
    DynamicDefaultValue,
    DynamicOptions,
    UnresolvableNamespace,
    MissingTSource,
    UnusedIgnore,
    MalformedKeyOverride,
    InvalidKeyOverride,
    VueSetupIsAReference,
    Other(String),
}

impl WarningKind {
    pub fn tag(&self) -> &str {
        match self {
            WarningKind::DynamicKey => "W_DYNAMIC_KEY",
            WarningKind::DynamicNamespace => "W_DYNAMIC_NAMESPACE",
            WarningKind::DynamicDefaultValue => "W_DYNAMIC_DEFAULT_VALUE",
            WarningKind::DynamicOptions => "W_DYNAMIC_OPTIONS",
            WarningKind::UnresolvableNamespace => "W_UNRESOLVABLE_NAMESPACE",
            WarningKind::MissingTSource => "W_MISSING_T_SOURCE",
            WarningKind::UnusedIgnore => "W_UNUSED_IGNORE",
            WarningKind::MalformedKeyOverride => "W_MALFORMED_KEY_OVERRIDE",
            WarningKind::InvalidKeyOverride => "W_INVALID_KEY_OVERRIDE",
            WarningKind::VueSetupIsAReference => "W_VUE_SETUP_IS_A_REFERENCE",
            WarningKind::Other(tag) => tag,
        }
    }

    /// Short human-readable name, if the kind is known.
    pub fn name(&self) -> Option<&'static str> {
        let name = match self {
            WarningKind::DynamicKey => "Dynamic key",
            WarningKind::DynamicNamespace => "Dynamic namespace",
            WarningKind::DynamicDefaultValue => "Dynamic default value",
            WarningKind::DynamicOptions => "Dynamic options",
            WarningKind::UnresolvableNamespace => "Cannot resolve namespace",
            WarningKind::MissingTSource => "Missing translation source",
            WarningKind::UnusedIgnore => "Unused ignore directive",
            WarningKind::MalformedKeyOverride => "Malformed key override",
            WarningKind::InvalidKeyOverride => "Invalid key override",
            WarningKind::VueSetupIsAReference => "Uncheckable Vue setup function",
            WarningKind::Other(_) => return None,
        };
        Some(name)
    }

    /// Explanation shown in verbose output.
    pub fn description(&self) -> Option<&'static str> {
        let text = match self {
            WarningKind::DynamicKey => {
                "The key is not a static string and cannot be extracted. Use a literal or a @tolgee-key comment."
            }
            WarningKind::DynamicNamespace => {
                "The namespace set on this key is not a static string."
            }
            WarningKind::DynamicDefaultValue => {
                "The default value is not a static string. The key is extracted without it."
            }
            WarningKind::DynamicOptions => {
                "The options object cannot be analyzed statically, so the namespace is unknown."
            }
            WarningKind::UnresolvableNamespace => {
                "The translation source this key depends on has a dynamic namespace."
            }
            WarningKind::MissingTSource => {
                "The `t` function is not bound to any translation source in scope."
            }
            WarningKind::UnusedIgnore => "The @tolgee-ignore comment does not apply to any key.",
            WarningKind::MalformedKeyOverride => "The @tolgee-key comment could not be parsed.",
            WarningKind::InvalidKeyOverride => {
                "The @tolgee-key comment has a missing or non-string key, ns or defaultValue."
            }
            WarningKind::VueSetupIsAReference => {
                "The setup function is a reference, so its translation source cannot be checked."
            }
            WarningKind::Other(_) => return None,
        };
        Some(text)
    }
}

impl FromStr for WarningKind {
    type Err = std::convert::Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let kind = match tag {
            "W_DYNAMIC_KEY" => WarningKind::DynamicKey,
            "W_DYNAMIC_NAMESPACE" => WarningKind::DynamicNamespace,
            "W_DYNAMIC_DEFAULT_VALUE" => WarningKind::DynamicDefaultValue,
            "W_DYNAMIC_OPTIONS" => WarningKind::DynamicOptions,
            "W_UNRESOLVABLE_NAMESPACE" => WarningKind::UnresolvableNamespace,
            "W_MISSING_T_SOURCE" => WarningKind::MissingTSource,
            "W_UNUSED_IGNORE" => WarningKind::UnusedIgnore,
            "W_MALFORMED_KEY_OVERRIDE" => WarningKind::MalformedKeyOverride,
            "W_INVALID_KEY_OVERRIDE" => WarningKind::InvalidKeyOverride,
            "W_VUE_SETUP_IS_A_REFERENCE" => WarningKind::VueSetupIsAReference,
            other => WarningKind::Other(other.to_string()),
        };
        Ok(kind)
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.tag()),
            None => f.write_str(self.tag()),
        }
    }
}

impl Serialize for WarningKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for WarningKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        let Ok(kind) = tag.parse();
        Ok(kind)
    }
}

// ============================================================
// Severity
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

// ============================================================
// Issue Types
// ============================================================

/// An extraction warning located in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningIssue {
    pub file_path: String,
    pub warning: Warning,
}

/// A file whose extraction failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileErrorIssue {
    pub file_path: String,
    pub error: String,
}

/// An issue found while extracting a set of files.
#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    Warning(WarningIssue),
    FileError(FileErrorIssue),
}

impl Issue {
    pub fn file_path(&self) -> &str {
        match self {
            Issue::Warning(issue) => &issue.file_path,
            Issue::FileError(issue) => &issue.file_path,
        }
    }

    /// Line of the issue; file-level issues sort first.
    pub fn line(&self) -> usize {
        match self {
            Issue::Warning(issue) => issue.warning.line,
            Issue::FileError(_) => 0,
        }
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Trait for types that can be reported to CLI.
#[enum_dispatch]
pub trait Report {
    /// `path:line` or just `path` for file-level issues.
    fn location(&self) -> String;

    /// Primary message to display.
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    /// Identifier shown next to the message.
    fn code(&self) -> String;

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

impl Report for WarningIssue {
    fn location(&self) -> String {
        format!("{}:{}", self.file_path, self.warning.line)
    }

    fn message(&self) -> String {
        self.warning
            .warning
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| self.warning.warning.tag().to_string())
    }

    fn report_severity(&self) -> Severity {
        Severity::Warning
    }

    fn code(&self) -> String {
        self.warning.warning.tag().to_string()
    }

    fn details(&self) -> Option<String> {
        self.warning.warning.description().map(str::to_string)
    }
}

impl Report for FileErrorIssue {
    fn location(&self) -> String {
        self.file_path.clone()
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Error
    }

    fn code(&self) -> String {
        "extract-error".to_string()
    }
}
