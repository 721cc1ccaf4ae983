//! Extraction engine.
//!
//! A file goes through these stages, each in its own module:
//!
//! 1. `tokenizer`: raw text to grammar-tagged tokens
//! 2. `mapper`: raw kinds narrowed to the shared [`token::Kind`] vocabulary
//! 3. `merge`: per-family finite-state machines collapse token runs
//! 4. `cursor` + `parser`: rule-driven recursive descent into a [`tree::Node`] tree
//! 5. `families`: per-family tree transforms
//! 6. `report`: namespace resolution, magic comments and warnings
//!
//! `extractor` wires the stages together for a single file.

pub mod comments;
pub mod cursor;
pub mod extractor;
pub mod families;
pub mod mapper;
pub mod merge;
pub mod parser;
pub mod report;
pub mod token;
pub mod tokenizer;
pub mod tree;

/// Internal failures that abort the extraction of a single file.
///
/// These indicate inconsistent grammar tables, never bad user input:
/// anything statically unresolvable in source text is a warning instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("rule for `{label}` consumed no tokens (line {line})")]
    NoProgress { label: String, line: usize },
    #[error("merge machine `{machine}` requested a custom merge but has no partition function")]
    MissingPartition { machine: &'static str },
    #[error("cursor label stack underflow")]
    LabelUnderflow,
    #[error("tokenizer: {0}")]
    Tokenize(String),
}
