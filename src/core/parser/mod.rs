//! Rule table and recursive-descent tree builder.
//!
//! [`Parser::parse_values`] is the one generic loop: tokens whose kind has a
//! registered rule are handed to that rule, everything else becomes a leaf.
//! Rules are plain function pointers registered per kind in a [`RuleTable`];
//! families start from [`RuleTable::base`] and add their own triggers.

pub mod object;
pub mod rules;
pub mod tag;

use std::collections::HashMap;

use crate::core::ExtractError;
use crate::core::cursor::Cursor;
use crate::core::token::{Kind, Token};
use crate::core::tree::{Dict, Node, Value};

/// Parsing routine started at the current token. A rule must consume at
/// least one token.
pub type RuleFn = fn(&mut Parser<'_>) -> Result<Node, ExtractError>;

/// A markup attribute whose name is a trigger, with its value if it has one.
#[derive(Debug, Clone)]
pub struct AttributeTrigger {
    pub token: Token,
    pub value: Option<Node>,
}

/// Builds a node from an attribute trigger and the element's other props.
/// The rule takes the props it understands out of the dict.
pub type AttributeRuleFn = fn(AttributeTrigger, &mut Dict) -> Node;

#[derive(Clone, Default)]
pub struct RuleTable {
    tokens: HashMap<Kind, RuleFn>,
    attributes: HashMap<Kind, AttributeRuleFn>,
}

impl RuleTable {
    /// Structural rules every family shares.
    pub fn base() -> Self {
        Self::default()
            .with(Kind::BlockBegin, object::parse_object)
            .with(Kind::ListBegin, parse_list)
            .with(Kind::ExpressionBegin, parse_group)
            .with(Kind::TemplateExprBegin, parse_group)
            .with(Kind::ExpressionTemplateBegin, parse_group)
            .with(Kind::TagBegin, tag::parse_tag)
    }

    pub fn with(mut self, kind: Kind, rule: RuleFn) -> Self {
        self.tokens.insert(kind, rule);
        self
    }

    pub fn with_attribute(mut self, kind: Kind, rule: AttributeRuleFn) -> Self {
        self.attributes.insert(kind, rule);
        self
    }

    pub fn rule(&self, kind: Kind) -> Option<RuleFn> {
        self.tokens.get(&kind).copied()
    }

    pub fn attribute_rule(&self, kind: Kind) -> Option<AttributeRuleFn> {
        self.attributes.get(&kind).copied()
    }
}

pub struct Parser<'a> {
    pub cursor: Cursor<'a>,
    rules: &'a RuleTable,
}

impl<'a> Parser<'a> {
    pub fn new(cursor: Cursor<'a>, rules: &'a RuleTable) -> Self {
        Self { cursor, rules }
    }

    pub fn rules(&self) -> &'a RuleTable {
        self.rules
    }

    /// Parse the whole stream into the root values.
    pub fn parse(&mut self) -> Result<Vec<Node>, ExtractError> {
        self.parse_values(&[])
    }

    /// Run `rule` at the current token under a fresh label, checking that it
    /// made progress.
    pub fn invoke(&mut self, rule: RuleFn) -> Result<Node, ExtractError> {
        let label = match self.cursor.kind() {
            Some(kind) => self.cursor.label_for(kind),
            None => format!("depth.{}", self.cursor.depth()),
        };
        self.cursor.push_label(label);
        let node = rule(self)?;
        self.cursor.pop_label()?;
        Ok(node)
    }

    /// Parse sibling values until a kind in `ends` (left unconsumed) or the
    /// end of the stream.
    pub fn parse_values(&mut self, ends: &[Kind]) -> Result<Vec<Node>, ExtractError> {
        let mut values = Vec::new();
        let mut last_opaque = false;

        while !self.cursor.is_done() {
            let kind = self.cursor.kind();
            if let Some(kind) = kind
                && ends.contains(&kind)
            {
                break;
            }
            if let Some(kind) = kind
                && let Some(rule) = self.rules.rule(kind)
            {
                values.push(self.invoke(rule)?);
                last_opaque = false;
                continue;
            }

            let Some(token) = self.cursor.next() else {
                break;
            };
            match leaf(&token) {
                Leaf::Value(node) => {
                    values.push(node);
                    last_opaque = false;
                }
                Leaf::Skip => {}
                Leaf::Opaque => {
                    // A run of unknown tokens is one unknown value.
                    if !last_opaque {
                        values.push(Node::opaque(token.line));
                        last_opaque = true;
                    }
                }
            }
        }
        Ok(values)
    }

    /// Parse a comma-separated run opened by the current token and closed by
    /// `close`. Empty elements are skipped.
    pub fn parse_sequence(&mut self, close: Kind) -> Result<Vec<Node>, ExtractError> {
        self.cursor.next();
        let mut items = Vec::new();
        loop {
            match self.cursor.kind() {
                None => break,
                Some(kind) if kind == close => {
                    self.cursor.next();
                    break;
                }
                Some(Kind::Comma) => {
                    self.cursor.next();
                }
                Some(_) => {
                    let line = self.cursor.line();
                    let values = self.parse_values(&[Kind::Comma, close])?;
                    if !values.is_empty() {
                        items.push(Node::from_values(line, values));
                    }
                }
            }
        }
        Ok(items)
    }

    /// Call arguments, if the current token opens them.
    pub fn parse_args(&mut self) -> Result<Vec<Node>, ExtractError> {
        if self.cursor.at(Kind::ExpressionBegin) {
            self.parse_sequence(Kind::ExpressionEnd)
        } else {
            Ok(Vec::new())
        }
    }

    /// Consume the trigger token a rule was invoked on.
    pub fn take_trigger(&mut self) -> Result<Token, ExtractError> {
        let line = self.cursor.line();
        self.cursor.next().ok_or(ExtractError::NoProgress {
            label: "trigger".to_string(),
            line,
        })
    }
}

// ============================================================
// Leaves
// ============================================================

enum Leaf {
    Value(Node),
    Opaque,
    Skip,
}

fn leaf(token: &Token) -> Leaf {
    let line = token.line;
    let value = match token.semantic {
        Some(Kind::String) => Value::String(token.text.clone()),
        Some(Kind::Number) => match parse_number(&token.text) {
            Some(n) => Value::Number(n),
            None => return Leaf::Opaque,
        },
        Some(Kind::Boolean) => Value::Bool(token.text == "true"),
        Some(Kind::Null) => Value::Null,
        Some(Kind::Text) => {
            let text = token.text.trim();
            if text.is_empty() {
                return Leaf::Skip;
            }
            Value::String(text.to_string())
        }
        // Closings of elements are structure, not values.
        Some(Kind::TagClosing | Kind::TagEnd | Kind::TagSelfClosingEnd) => return Leaf::Skip,
        _ => return Leaf::Opaque,
    };
    Leaf::Value(Node::Primitive { line, value })
}

/// Numeric literal value: separators, radix prefixes and BigInt suffix.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.replace('_', "");
    let text = text.strip_suffix('n').unwrap_or(&text);
    let lower = text.to_ascii_lowercase();
    let radix = |digits: &str, radix: u32| u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
    if let Some(hex) = lower.strip_prefix("0x") {
        radix(hex, 16)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        radix(oct, 8)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        radix(bin, 2)
    } else {
        lower.parse().ok()
    }
}

// ============================================================
// Structural rules
// ============================================================

fn closer_of(open: Option<Kind>) -> Kind {
    match open {
        Some(Kind::TemplateExprBegin) => Kind::TemplateExprEnd,
        Some(Kind::ExpressionTemplateBegin) => Kind::ExpressionTemplateEnd,
        Some(Kind::ListBegin) => Kind::ListEnd,
        Some(Kind::BlockBegin) => Kind::BlockEnd,
        _ => Kind::ExpressionEnd,
    }
}

/// `( ... )`, `${ ... }` and embedded `{ ... }` groups.
pub fn parse_group(p: &mut Parser<'_>) -> Result<Node, ExtractError> {
    let open = p.take_trigger()?;
    let close = closer_of(open.semantic);
    let values = p.parse_values(&[close])?;
    p.cursor.eat(close);
    Ok(Node::expression(open.line, values))
}

/// `[a, b]`.
pub fn parse_list(p: &mut Parser<'_>) -> Result<Node, ExtractError> {
    let line = p.cursor.line();
    let values = p.parse_sequence(Kind::ListEnd)?;
    Ok(Node::Array { line, values })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::mapper::{markup_mapper, remap, script_mapper};
    use crate::core::merge::machines::{
        ATTRIBUTE_HYPHEN, GLOBAL_T_FUNCTION, STRING, T_COMPONENT, T_FUNCTION, TAG_BEGIN,
        TAG_CLOSING, TEMPLATE, USE_TRANSLATE,
    };
    use crate::core::merge::{Merger, run_pipeline};
    use crate::core::tokenizer::{BuiltinTokenizer, Grammar, Tokenizer};

    /// Tokenize TSX source through a minimal script pipeline.
    pub fn tokens(source: &str) -> Vec<Token> {
        let raw = BuiltinTokenizer.tokenize(source, Grammar::Tsx).unwrap();
        let tokens = remap(raw, &[markup_mapper, script_mapper]);
        let pipeline: &[&(dyn Merger + Sync)] = &[
            &STRING,
            &TEMPLATE,
            &ATTRIBUTE_HYPHEN,
            &TAG_CLOSING,
            &T_COMPONENT,
            &TAG_BEGIN,
            &GLOBAL_T_FUNCTION,
            &T_FUNCTION,
            &USE_TRANSLATE,
        ];
        run_pipeline(tokens, pipeline).unwrap()
    }

    pub fn parse_with(source: &str, rules: &RuleTable) -> Vec<Node> {
        let mut hook = ();
        let cursor = Cursor::new(tokens(source), &mut hook);
        Parser::new(cursor, rules).parse().unwrap()
    }

    pub fn parse(source: &str) -> Vec<Node> {
        parse_with(source, &RuleTable::base())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::parse;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literals_become_primitives() {
        let nodes = parse("'a' 1 true null");
        assert_eq!(
            nodes,
            vec![
                Node::string(1, "a"),
                Node::Primitive {
                    line: 1,
                    value: Value::Number(1.0)
                },
                Node::Primitive {
                    line: 1,
                    value: Value::Bool(true)
                },
                Node::Primitive {
                    line: 1,
                    value: Value::Null
                },
            ]
        );
    }

    #[test]
    fn test_unknown_runs_collapse() {
        let nodes = parse("a + b");
        assert_eq!(nodes, vec![Node::opaque(1)]);
    }

    #[test]
    fn test_group_and_list() {
        let nodes = parse("('a')\n['b', , 'c']");
        assert_eq!(
            nodes,
            vec![
                Node::expression(1, vec![Node::string(1, "a")]),
                Node::Array {
                    line: 2,
                    values: vec![Node::string(2, "b"), Node::string(2, "c")],
                },
            ]
        );
    }

    #[test]
    fn test_stray_closers_are_opaque() {
        let nodes = parse(") 'a'");
        assert_eq!(nodes, vec![Node::opaque(1), Node::string(1, "a")]);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1_000"), Some(1000.0));
        assert_eq!(parse_number("0xff"), Some(255.0));
        assert_eq!(parse_number("0b101"), Some(5.0));
        assert_eq!(parse_number("10n"), Some(10.0));
        assert_eq!(parse_number("1.5e2"), Some(150.0));
        assert_eq!(parse_number("1e"), None);
    }

    #[test]
    fn test_rule_without_progress_is_fatal() {
        fn stuck(_: &mut Parser<'_>) -> Result<Node, ExtractError> {
            Ok(Node::opaque(1))
        }
        let rules = RuleTable::base().with(Kind::Identifier, stuck);
        let mut hook = ();
        let cursor = Cursor::new(super::test_support::tokens("a"), &mut hook);
        let err = Parser::new(cursor, &rules).parse().unwrap_err();
        assert_eq!(
            err,
            ExtractError::NoProgress {
                label: "depth.0".to_string(),
                line: 1
            }
        );
    }
}
