//! Markup elements.
//!
//! Elements are parsed flat: a tag rule consumes the opening tag and its
//! attributes only, and children stay siblings of the element in the
//! enclosing value list. Closing tags are skipped by the generic loop.

use crate::core::ExtractError;
use crate::core::parser::{AttributeTrigger, Parser, parse_group};
use crate::core::token::Kind;
use crate::core::tree::{Block, Dict, Node, Value};

/// Attributes of one opening tag.
#[derive(Debug, Default)]
pub struct Props {
    pub dict: Dict,
    /// Attributes registered as triggers, in source order.
    pub triggers: Vec<AttributeTrigger>,
    pub self_closing: bool,
}

/// Parse attributes up to and including the end of the opening tag.
pub fn parse_props(p: &mut Parser<'_>, line: usize) -> Result<Props, ExtractError> {
    let mut props = Props {
        dict: Dict::new(line),
        ..Props::default()
    };
    let rules = p.rules();

    while let Some(kind) = p.cursor.kind() {
        match kind {
            Kind::TagEnd => {
                p.cursor.next();
                break;
            }
            Kind::TagSelfClosingEnd => {
                p.cursor.next();
                props.self_closing = true;
                break;
            }
            Kind::TagAttributeName => {
                let Some(name) = p.cursor.next() else { break };
                let value = parse_attribute_value(p)?
                    .unwrap_or_else(|| Node::Primitive {
                        line: name.line,
                        value: Value::Bool(true),
                    });
                props.dict.insert(name.text, value);
            }
            kind if rules.attribute_rule(kind).is_some() => {
                let Some(token) = p.cursor.next() else { break };
                let value = parse_attribute_value(p)?;
                props.triggers.push(AttributeTrigger { token, value });
            }
            Kind::ExpressionTemplateBegin => {
                // `{...spread}` and other attributes without a static name.
                let node = p.invoke(parse_group)?;
                props.dict.unknown.push(node);
            }
            // A new element or the end of the stream: the tag was never closed.
            Kind::TagBegin | Kind::TagClosing | Kind::ScriptBegin | Kind::ScriptEnd => break,
            kind if kind.is_trigger() => break,
            _ => {
                p.cursor.next();
            }
        }
    }
    Ok(props)
}

/// `= value` after an attribute name, if present.
fn parse_attribute_value(p: &mut Parser<'_>) -> Result<Option<Node>, ExtractError> {
    if p.cursor.eat(Kind::Assignment).is_none() {
        return Ok(None);
    }
    let Some(token) = p.cursor.current() else {
        return Ok(None);
    };
    let line = token.line;
    match token.semantic {
        Some(Kind::String) => {
            let text = token.text.clone();
            p.cursor.next();
            Ok(Some(Node::string(line, text)))
        }
        Some(Kind::ExpressionTemplateBegin) => p.invoke(parse_group).map(Some),
        Some(Kind::TagEnd | Kind::TagSelfClosingEnd) | None => Ok(None),
        Some(_) => {
            p.cursor.next();
            Ok(Some(Node::opaque(line)))
        }
    }
}

/// `<name attr=...>`: the props dict, plus whatever the attribute rules built.
pub fn parse_tag(p: &mut Parser<'_>) -> Result<Node, ExtractError> {
    let open = p.take_trigger()?;
    let props = parse_props(p, open.line)?;
    let rules = p.rules();

    let mut dict = props.dict;
    let mut sites = Vec::new();
    for trigger in props.triggers {
        let Some(kind) = trigger.token.semantic else {
            continue;
        };
        if let Some(rule) = rules.attribute_rule(kind) {
            sites.push(rule(trigger, &mut dict));
        }
    }

    if sites.is_empty() {
        return Ok(Node::Dict(dict));
    }
    let mut values = vec![Node::Dict(dict)];
    values.extend(sites);
    Ok(Node::expression(open.line, values))
}

/// `<script ...> ... </script>` in single-file components.
pub fn parse_script(p: &mut Parser<'_>) -> Result<Node, ExtractError> {
    let open = p.take_trigger()?;
    parse_props(p, open.line)?;
    let values = p.parse_values(&[Kind::ScriptEnd])?;
    p.cursor.eat(Kind::ScriptEnd);
    Ok(Node::Expression {
        line: open.line,
        block: Block::Script,
        values,
    })
}

/// Children of an element up to its closing tag `</name>`, which is consumed.
/// Closing tags of other elements are skipped.
pub fn parse_children(p: &mut Parser<'_>, name: &str) -> Result<Vec<Node>, ExtractError> {
    let mut children = Vec::new();
    while let Some(token) = p.cursor.current() {
        if token.is(Kind::TagClosing) {
            let done = token.text == name;
            p.cursor.next();
            if done {
                break;
            }
            continue;
        }
        children.extend(p.parse_values(&[Kind::TagClosing])?);
    }
    Ok(children)
}
