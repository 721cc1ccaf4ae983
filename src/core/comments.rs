//! Magic comments.
//!
//! `@tolgee-ignore` suppresses the key site on the next line and
//! `@tolgee-key` replaces it (or declares a key with no site at all):
//!
//! ```text
//! // @tolgee-key greeting
//! // @tolgee-key { key: 'greeting', ns: 'home', defaultValue: 'Hi' }
//! ```
//!
//! Comments are parsed when the cursor moves past them. The
//! [`CommentCollector`] hook also records the line of the next real token,
//! so an inline `/* @tolgee-ignore */ t('a')` applies to its own line.

use crate::core::cursor::{AdvanceHook, Cursor};
use crate::core::families::react;
use crate::core::mapper::{remap, script_mapper};
use crate::core::merge::run_pipeline;
use crate::core::parser::{Parser, RuleTable};
use crate::core::token::{Kind, Token};
use crate::core::tokenizer::{BuiltinTokenizer, Grammar, Tokenizer};
use crate::core::tree::{Dict, Node};

const IGNORE_MARKER: &str = "@tolgee-ignore";
const KEY_MARKER: &str = "@tolgee-key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Ignore,
    Key {
        key_name: String,
        namespace: Option<String>,
        default_value: Option<String>,
    },
    /// The `{ ... }` payload is not an object literal.
    Malformed,
    /// The payload has no string `key`, or a non-string `ns`/`defaultValue`.
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicComment {
    pub line: usize,
    pub end_line: usize,
    /// Line of the first non-comment token after the comment.
    pub next_line: Option<usize>,
    pub directive: Directive,
}

impl MagicComment {
    /// Whether the comment targets a key site on `line`: the site starts on
    /// the line after the comment, or right after it on the same line.
    pub fn applies_to(&self, line: usize) -> bool {
        self.end_line + 1 == line || (self.end_line == line && self.next_line == Some(line))
    }
}

/// Collects magic comments as the cursor advances.
#[derive(Debug, Default)]
pub struct CommentCollector {
    comments: Vec<MagicComment>,
    pending: usize,
}

impl CommentCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Vec<MagicComment> {
        self.comments
    }
}

impl AdvanceHook for CommentCollector {
    fn before_advance(&mut self, token: &Token) {
        if token.is(Kind::Comment) {
            if let Some(comment) = parse_comment(token) {
                self.comments.push(comment);
                self.pending += 1;
            }
            return;
        }
        let len = self.comments.len();
        for comment in &mut self.comments[len - self.pending..] {
            comment.next_line = Some(token.line);
        }
        self.pending = 0;
    }
}

/// Comment text without its delimiters or the `*` gutter of doc blocks.
fn comment_body(text: &str) -> String {
    let text = text.trim();
    let body = if let Some(rest) = text.strip_prefix("//") {
        rest
    } else if let Some(rest) = text.strip_prefix("/*") {
        rest.strip_suffix("*/").unwrap_or(rest)
    } else if let Some(rest) = text.strip_prefix("<!--") {
        rest.strip_suffix("-->").unwrap_or(rest)
    } else {
        text
    };
    body.lines()
        .map(|line| line.trim_start().trim_start_matches('*').trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// `marker` followed by the end of the text or whitespace.
fn strip_marker<'a>(body: &'a str, marker: &str) -> Option<&'a str> {
    let rest = body.strip_prefix(marker)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then(|| rest.trim())
}

/// Parse a comment token; `None` if it carries no marker.
pub fn parse_comment(token: &Token) -> Option<MagicComment> {
    let body = comment_body(&token.text);
    let directive = if strip_marker(&body, IGNORE_MARKER).is_some() {
        Directive::Ignore
    } else {
        let payload = strip_marker(&body, KEY_MARKER)?;
        // A bare key ends with its line.
        let bare = payload.lines().next().unwrap_or_default().trim();
        if payload.starts_with('{') {
            parse_payload(payload)
        } else if bare.is_empty() {
            Directive::Invalid
        } else {
            Directive::Key {
                key_name: bare.to_string(),
                namespace: None,
                default_value: None,
            }
        }
    };
    Some(MagicComment {
        line: token.line,
        end_line: token.end_line(),
        next_line: None,
        directive,
    })
}

/// `{ key: 'a', ns: 'b', defaultValue: 'c' }`, read with the script object
/// parser so unquoted keys, trailing commas and comments are accepted.
fn parse_payload(payload: &str) -> Directive {
    match parse_object_literal(payload) {
        Some(dict) => directive_from_dict(&dict),
        None => Directive::Malformed,
    }
}

fn parse_object_literal(payload: &str) -> Option<Dict> {
    let raw = BuiltinTokenizer.tokenize(payload, Grammar::JavaScript).ok()?;
    let tokens = run_pipeline(remap(raw, &[script_mapper]), react::PIPELINE).ok()?;
    if tokens.first().and_then(|t| t.semantic) != Some(Kind::BlockBegin) || !closes_at_end(&tokens) {
        return None;
    }
    let rules = RuleTable::base();
    let mut hook = ();
    let mut parser = Parser::new(Cursor::new(tokens, &mut hook), &rules);
    let mut nodes = parser.parse().ok()?;
    match (nodes.pop(), nodes.is_empty()) {
        (Some(Node::Dict(dict)), true) => Some(dict),
        _ => None,
    }
}

/// The opening brace is closed by the last token and not before.
fn closes_at_end(tokens: &[Token]) -> bool {
    let tokens: Vec<&Token> = tokens.iter().filter(|t| !t.is(Kind::Comment)).collect();
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.semantic {
            Some(Kind::BlockBegin) => depth += 1,
            Some(Kind::BlockEnd) => {
                depth = match depth.checked_sub(1) {
                    Some(depth) => depth,
                    None => return false,
                };
                if depth == 0 {
                    return i + 1 == tokens.len();
                }
            }
            _ => {}
        }
    }
    false
}

fn directive_from_dict(dict: &Dict) -> Directive {
    let field = |name: &str| -> Result<Option<String>, ()> {
        match dict.get(name) {
            None => Ok(None),
            Some(node) => node.as_static_str().map(|s| Some(s.to_string())).ok_or(()),
        }
    };
    match (field("key"), field("ns"), field("defaultValue")) {
        (Ok(Some(key_name)), Ok(namespace), Ok(default_value)) => Directive::Key {
            key_name,
            namespace,
            default_value,
        },
        _ => Directive::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn comment(text: &str) -> Option<Directive> {
        parse_comment(&Token::new("comment.line.double-slash", text, 1, 0)).map(|c| c.directive)
    }

    fn key(name: &str, ns: Option<&str>, default: Option<&str>) -> Option<Directive> {
        Some(Directive::Key {
            key_name: name.to_string(),
            namespace: ns.map(str::to_string),
            default_value: default.map(str::to_string),
        })
    }

    // ============================================================
    // Markers
    // ============================================================

    #[test]
    fn test_ignore_in_every_comment_style() {
        for text in [
            "// @tolgee-ignore",
            "/* @tolgee-ignore */",
            "/** @tolgee-ignore */",
            "<!-- @tolgee-ignore -->",
            "// @tolgee-ignore because reasons",
        ] {
            assert_eq!(comment(text), Some(Directive::Ignore), "{text}");
        }
    }

    #[test]
    fn test_plain_comments_are_not_magic() {
        assert_eq!(comment("// just a note"), None);
        assert_eq!(comment("// @tolgee-ignored"), None);
        assert_eq!(comment("// see @tolgee-ignore"), None);
    }

    #[test]
    fn test_bare_key_is_verbatim() {
        assert_eq!(comment("// @tolgee-key  hello.world  "), key("hello.world", None, None));
        assert_eq!(comment(r"// @tolgee-key \{not-an-object}"), key(r"\{not-an-object}", None, None));
        assert_eq!(comment("// @tolgee-key"), Some(Directive::Invalid));
    }

    #[test]
    fn test_doc_block_gutter() {
        assert_eq!(comment("/**\n * @tolgee-ignore\n */"), Some(Directive::Ignore));
        assert_eq!(comment("/**\n * @tolgee-key fromdoc\n */"), key("fromdoc", None, None));
        assert_eq!(
            comment("/**\n * @tolgee-key fromdoc\n * Shown on the landing page.\n */"),
            key("fromdoc", None, None)
        );
        assert_eq!(
            comment("/**\n * @tolgee-key {\n *   key: 'a',\n *   ns: 'b',\n * }\n */"),
            key("a", Some("b"), None)
        );
    }

    // ============================================================
    // Object payloads
    // ============================================================

    #[test]
    fn test_object_payload() {
        assert_eq!(
            comment("// @tolgee-key { key: 'a', ns: \"b\", defaultValue: 'C', }"),
            key("a", Some("b"), Some("C"))
        );
        assert_eq!(
            comment("/* @tolgee-key { /* inline */ 'key': 'a' } */"),
            key("a", None, None)
        );
    }

    #[test]
    fn test_invalid_payloads() {
        assert_eq!(comment("// @tolgee-key { ns: 'b' }"), Some(Directive::Invalid));
        assert_eq!(comment("// @tolgee-key { key: 1 }"), Some(Directive::Invalid));
        assert_eq!(comment("// @tolgee-key { key: 'a', ns: x }"), Some(Directive::Invalid));
    }

    #[test]
    fn test_malformed_payloads() {
        assert_eq!(comment("// @tolgee-key { key: 'a' } trailing"), Some(Directive::Malformed));
        assert_eq!(comment("// @tolgee-key {} {}"), Some(Directive::Malformed));
    }

    // ============================================================
    // Attachment
    // ============================================================

    #[test]
    fn test_collector_records_next_token_line() {
        let mut collector = CommentCollector::new();
        collector.before_advance(&Token::new("c", "/* @tolgee-ignore */", 3, 0).with_semantic(Kind::Comment));
        collector.before_advance(&Token::new("c", "// nothing", 3, 0).with_semantic(Kind::Comment));
        collector.before_advance(&Token::new("v", "t", 3, 0).with_semantic(Kind::Identifier));
        collector.before_advance(&Token::new("c", "// @tolgee-ignore", 5, 0).with_semantic(Kind::Comment));
        let comments = collector.finish();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].next_line, Some(3));
        assert!(comments[0].applies_to(3));
        assert!(comments[0].applies_to(4));
        assert_eq!(comments[1].next_line, None);
        assert!(comments[1].applies_to(6));
        assert!(!comments[1].applies_to(5));
    }

    #[test]
    fn test_block_comment_applies_after_its_last_line() {
        let token = Token::new("comment.block", "/*\n @tolgee-ignore\n*/", 2, 0);
        let comment = parse_comment(&token).unwrap();
        assert_eq!(comment.directive, Directive::Ignore);
        assert!(comment.applies_to(5));
        assert!(!comment.applies_to(3));
    }
}
