//! Key-site rules shared by several families.
//!
//! Call forms accept `(key)`, `(key, default)`, `(key, options)`,
//! `(key, default, options)` and the object form `({ key, ns, defaultValue })`.

use crate::core::ExtractError;
use crate::core::parser::Parser;
use crate::core::parser::tag::{parse_children, parse_props};
use crate::core::tree::{Dict, KeyInfo, NamespaceInfo, Node};

/// `t(...)`: a key site whose namespace may come from the enclosing source.
pub fn t_function(p: &mut Parser<'_>) -> Result<Node, ExtractError> {
    call(p, true)
}

/// `tolgee.t(...)` and other calls not bound to a translation source.
pub fn global_t_function(p: &mut Parser<'_>) -> Result<Node, ExtractError> {
    call(p, false)
}

fn call(p: &mut Parser<'_>, depends_on_context: bool) -> Result<Node, ExtractError> {
    let trigger = p.take_trigger()?;
    let args = p.parse_args()?;
    Ok(Node::KeyInfo(key_from_args(
        trigger.line,
        depends_on_context,
        args,
    )))
}

/// `useTranslate(ns)` / `getTranslate(ns)`. A namespace list binds its
/// first entry.
pub fn namespace_source(p: &mut Parser<'_>) -> Result<Node, ExtractError> {
    let trigger = p.take_trigger()?;
    let mut args = p.parse_args()?.into_iter();
    let mut values = Vec::new();

    let name = match args.next() {
        Some(Node::Array { values: mut list, .. }) if !list.is_empty() => {
            let first = list.remove(0);
            values.extend(list);
            Some(Box::new(first))
        }
        // `useTranslate([])` binds the default namespace.
        Some(Node::Array { .. }) | None => None,
        Some(other) => Some(Box::new(other)),
    };
    values.extend(args);

    Ok(Node::NamespaceInfo(NamespaceInfo {
        line: trigger.line,
        name,
        values,
    }))
}

/// `<T keyName=".." defaultValue=".." ns="..">children</T>`.
///
/// Static text children stand in for a missing default value.
pub fn t_component(p: &mut Parser<'_>) -> Result<Node, ExtractError> {
    let trigger = p.take_trigger()?;
    let props = parse_props(p, trigger.line)?;
    let mut dict = props.dict;

    let mut info = KeyInfo {
        line: trigger.line,
        key_name: dict.take(&["keyName", "key-name"]).map(Box::new),
        default_value: dict.take(&["defaultValue", "default-value"]).map(Box::new),
        namespace: dict.take(&["ns"]).map(Box::new),
        ..KeyInfo::default()
    };

    let mut children = if props.self_closing {
        Vec::new()
    } else {
        parse_children(p, &trigger.text)?
    };
    if info.default_value.is_none()
        && let [child] = children.as_slice()
        && child.as_static_str().is_some()
    {
        info.default_value = children.pop().map(Box::new);
    }

    info.values = dict.into_values();
    info.values.extend(children);
    Ok(Node::KeyInfo(info))
}

// ============================================================
// Argument assignment
// ============================================================

/// Assign call arguments to key, default value and options.
pub fn key_from_args(line: usize, depends_on_context: bool, args: Vec<Node>) -> KeyInfo {
    let mut info = KeyInfo {
        line,
        depends_on_context,
        ..KeyInfo::default()
    };
    let mut args = args.into_iter();

    match args.next() {
        None => {}
        Some(Node::Dict(mut dict)) => {
            info.key_name = dict.take(&["key", "keyName"]).map(Box::new);
            apply_options(&mut info, dict);
        }
        Some(key) => {
            info.key_name = Some(Box::new(key));
            match args.next() {
                None => {}
                Some(Node::Dict(options)) => apply_options(&mut info, options),
                // `t('key', options)` with options held in a variable.
                Some(other) if other.is_opaque() => {
                    info.options_dynamic = true;
                    info.values.push(other);
                }
                Some(default) => {
                    info.default_value = Some(Box::new(default));
                    match args.next() {
                        None => {}
                        Some(Node::Dict(options)) => apply_options(&mut info, options),
                        Some(other) => {
                            info.options_dynamic = true;
                            info.values.push(other);
                        }
                    }
                }
            }
        }
    }

    info.values.extend(args);
    info
}

/// Read `ns` and `defaultValue` from an options dict; the rest are values.
pub fn apply_options(info: &mut KeyInfo, mut options: Dict) {
    if !options.unknown.is_empty() {
        info.options_dynamic = true;
    }
    if let Some(ns) = options.take(&["ns"]) {
        info.namespace = Some(Box::new(ns));
    }
    if let Some(default) = options.take(&["defaultValue"])
        && info.default_value.is_none()
    {
        info.default_value = Some(Box::new(default));
    }
    info.values.extend(options.into_values());
}
