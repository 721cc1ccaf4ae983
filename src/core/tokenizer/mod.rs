//! Lexical tokenizer.
//!
//! The engine only needs a flat, ordered stream of grammar-tagged tokens.
//! [`Tokenizer`] is the seam for plugging in a grammar-driven tokenizer;
//! [`BuiltinTokenizer`] is a hand-written scanner emitting TextMate-style
//! raw kinds for every supported grammar.

mod markup;
mod scanner;
mod script;

use std::path::Path;

use crate::core::ExtractError;
use crate::core::token::Token;

use markup::Dialect;
use scanner::Scanner;
use script::Stop;

/// Source grammar of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    JavaScript,
    TypeScript,
    Jsx,
    Tsx,
    Vue,
    Svelte,
    AngularHtml,
}

impl Grammar {
    /// Grammar for a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" | "mjs" | "cjs" => Some(Grammar::JavaScript),
            "ts" | "mts" | "cts" => Some(Grammar::TypeScript),
            "jsx" => Some(Grammar::Jsx),
            "tsx" => Some(Grammar::Tsx),
            "vue" => Some(Grammar::Vue),
            "svelte" => Some(Grammar::Svelte),
            "html" | "htm" => Some(Grammar::AngularHtml),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn root_scope(&self) -> &'static str {
        match self {
            Grammar::JavaScript => "source.js",
            Grammar::TypeScript => "source.ts",
            Grammar::Jsx => "source.js.jsx",
            Grammar::Tsx => "source.tsx",
            Grammar::Vue => "text.html.vue",
            Grammar::Svelte => "source.svelte",
            Grammar::AngularHtml => "text.html.derivative",
        }
    }

    /// Plain script grammars (no markup wrapper).
    pub fn is_script(&self) -> bool {
        matches!(
            self,
            Grammar::JavaScript | Grammar::TypeScript | Grammar::Jsx | Grammar::Tsx
        )
    }
}

pub trait Tokenizer: Sync {
    fn tokenize(&self, source: &str, grammar: Grammar) -> Result<Vec<Token>, ExtractError>;
}

/// Built-in scanner. Never fails: unterminated constructs end at EOF.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinTokenizer;

impl Tokenizer for BuiltinTokenizer {
    fn tokenize(&self, source: &str, grammar: Grammar) -> Result<Vec<Token>, ExtractError> {
        let mut sc = Scanner::new(source, grammar.root_scope());
        match grammar {
            // `.js` files often hold JSX too; `.ts` type assertions forbid it.
            Grammar::TypeScript => script::scan_script(&mut sc, false, Stop::Eof),
            Grammar::JavaScript | Grammar::Jsx | Grammar::Tsx => {
                script::scan_script(&mut sc, true, Stop::Eof)
            }
            Grammar::Vue => markup::scan_markup(&mut sc, Dialect::Vue),
            Grammar::Svelte => markup::scan_markup(&mut sc, Dialect::Svelte),
            Grammar::AngularHtml => markup::scan_markup(&mut sc, Dialect::Angular),
        }
        Ok(sc.finish())
    }
}
