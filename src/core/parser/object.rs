//! Object literals.
//!
//! Object literals and statement blocks share the `{ }` token pair. The
//! object routine parses properties until something does not fit the
//! `key: value,` shape, then falls back to a plain expression holding
//! everything seen so far plus the rest of the block.

use crate::core::ExtractError;
use crate::core::parser::{Parser, parse_group, parse_list};
use crate::core::token::Kind;
use crate::core::tree::{Dict, Node};

const KEY_KINDS: &[Kind] = &[
    Kind::Identifier,
    Kind::String,
    Kind::Number,
    Kind::Keyword,
    Kind::Boolean,
    Kind::Null,
];

pub fn parse_object(p: &mut Parser<'_>) -> Result<Node, ExtractError> {
    let open = p.take_trigger()?;
    let mut dict = Dict::new(open.line);

    loop {
        let Some(kind) = p.cursor.kind() else {
            return Ok(Node::Dict(dict));
        };
        match kind {
            Kind::BlockEnd => {
                p.cursor.next();
                return Ok(Node::Dict(dict));
            }
            Kind::Comma => {
                p.cursor.next();
            }
            Kind::Spread => {
                let line = p.cursor.line();
                p.cursor.next();
                let values = p.parse_values(&[Kind::Comma, Kind::BlockEnd])?;
                dict.unknown.push(Node::from_values(line, values));
            }
            Kind::ListBegin => {
                let key = p.invoke(parse_list)?;
                if p.cursor.eat(Kind::Colon).is_none() {
                    return fallback(p, dict, vec![key]);
                }
                let line = p.cursor.line();
                let values = p.parse_values(&[Kind::Comma, Kind::BlockEnd])?;
                dict.unknown.push(key);
                dict.unknown.push(Node::from_values(line, values));
            }
            kind if KEY_KINDS.contains(&kind) => {
                let next = p.cursor.peek().and_then(|t| t.semantic);
                match next {
                    Some(Kind::Colon) => {
                        let Some(key) = p.cursor.next() else { break };
                        p.cursor.next();
                        let line = p.cursor.line();
                        let values = p.parse_values(&[Kind::Comma, Kind::BlockEnd])?;
                        dict.insert(key.text, Node::from_values(line, values));
                    }
                    Some(Kind::Comma | Kind::BlockEnd) if kind == Kind::Identifier => {
                        let Some(key) = p.cursor.next() else { break };
                        dict.insert(key.text, Node::opaque(key.line));
                    }
                    Some(Kind::ExpressionBegin) => {
                        let Some(key) = p.cursor.next() else { break };
                        let params = p.invoke(parse_group)?;
                        if !p.cursor.at(Kind::BlockBegin) {
                            // `{ f(x) }`: a call, so this is a block.
                            return fallback(p, dict, vec![Node::opaque(key.line), params]);
                        }
                        let body = p.invoke(parse_object)?;
                        dict.insert(key.text, Node::expression(key.line, vec![params, body]));
                    }
                    _ => return fallback(p, dict, Vec::new()),
                }
            }
            _ => return fallback(p, dict, Vec::new()),
        }
    }
    Ok(Node::Dict(dict))
}

/// Give up on the object shape: the block is an expression.
fn fallback(p: &mut Parser<'_>, dict: Dict, extra: Vec<Node>) -> Result<Node, ExtractError> {
    let line = dict.line;
    let mut values = dict.into_values();
    values.extend(extra);
    values.extend(p.parse_values(&[Kind::BlockEnd])?);
    p.cursor.eat(Kind::BlockEnd);
    Ok(Node::expression(line, values))
}
