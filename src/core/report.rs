//! Report generator.
//!
//! Walks the transformed tree in document order, threading the nearest
//! translation source down to key sites, and turns every [`KeyInfo`] into an
//! [`ExtractedKey`] or a [`Warning`]. Magic comments are applied here; the
//! ones no key site consumed are reported after the walk.

use serde::Serialize;

use crate::core::comments::{Directive, MagicComment};
use crate::core::extractor::ExtractOptions;
use crate::core::tree::{Block, KeyInfo, Node};
use crate::issues::{ExtractedKey, Warning, WarningKind};

/// Keys and warnings of one file, in line order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub keys: Vec<ExtractedKey>,
    pub warnings: Vec<Warning>,
}

/// Translation source in scope at a point of the walk.
#[derive(Debug, Clone, Copy)]
enum Source<'t> {
    Unbound,
    /// Bound by a source call; `None` when it was called without a namespace.
    Bound(Option<&'t Node>),
}

struct Reporter<'o> {
    options: &'o ExtractOptions,
    comments: Vec<MagicComment>,
    consumed: Vec<bool>,
    out: Extraction,
}

pub fn generate(
    root: &[Node],
    comments: Vec<MagicComment>,
    warnings: Vec<Warning>,
    options: &ExtractOptions,
) -> Extraction {
    let mut reporter = Reporter {
        options,
        consumed: vec![false; comments.len()],
        comments,
        out: Extraction::default(),
    };
    for warning in warnings {
        if !reporter.take_ignore(warning.line) {
            reporter.out.warnings.push(warning);
        }
    }
    reporter.walk(root, Source::Unbound);
    reporter.finish()
}

impl Reporter<'_> {
    /// Walk sibling values. A translation source applies to the siblings
    /// after it; the returned source is the one in scope at the end.
    fn walk<'t>(&mut self, values: impl IntoIterator<Item = &'t Node>, mut source: Source<'t>) -> Source<'t> {
        for node in values {
            match node {
                Node::NamespaceInfo(info) => {
                    self.walk(&info.values, source);
                    source = Source::Bound(info.name.as_deref());
                }
                Node::KeyInfo(info) => {
                    self.key(info, source);
                    self.walk(&info.values, source);
                }
                // Sources declared in a script block are visible to the markup.
                Node::Expression {
                    block: Block::Script,
                    values,
                    ..
                } => source = self.walk(values, source),
                other => {
                    self.walk(other.children(), source);
                }
            }
        }
        source
    }

    fn take_comment(&mut self, line: usize) -> Option<Directive> {
        let index = self.comments.iter().enumerate().position(|(i, c)| {
            !self.consumed[i]
                && c.applies_to(line)
                && matches!(c.directive, Directive::Ignore | Directive::Key { .. })
        })?;
        self.consumed[index] = true;
        Some(self.comments[index].directive.clone())
    }

    /// Consume an ignore comment covering a construct that only warns.
    fn take_ignore(&mut self, line: usize) -> bool {
        let found = self.comments.iter().enumerate().position(|(i, c)| {
            !self.consumed[i] && c.applies_to(line) && c.directive == Directive::Ignore
        });
        if let Some(index) = found {
            self.consumed[index] = true;
        }
        found.is_some()
    }

    fn warn(&mut self, kind: WarningKind, line: usize) {
        self.out.warnings.push(Warning::new(kind, line));
    }

    fn emit(&mut self, key_name: String, namespace: Option<String>, default_value: Option<String>, line: usize) {
        let namespace = namespace.or_else(|| self.options.default_namespace.clone());
        self.out.keys.push(ExtractedKey {
            key_name,
            namespace,
            default_value,
            line,
        });
    }

    fn key(&mut self, info: &KeyInfo, source: Source<'_>) {
        let line = info.line;
        match self.take_comment(line) {
            Some(Directive::Ignore) => return,
            Some(Directive::Key {
                key_name,
                namespace,
                default_value,
            }) => {
                self.emit(key_name, namespace, default_value, line);
                return;
            }
            _ => {}
        }

        let Some(key_name) = info.key_name.as_deref().and_then(Node::as_static_str) else {
            self.warn(WarningKind::DynamicKey, line);
            return;
        };

        let strict = self.options.strict_namespace;
        if strict
            && info.depends_on_context
            && info.namespace.is_none()
            && matches!(source, Source::Unbound)
        {
            self.warn(WarningKind::MissingTSource, line);
            return;
        }
        if strict && info.options_dynamic {
            self.warn(WarningKind::DynamicOptions, line);
            return;
        }

        let namespace = match (&info.namespace, source) {
            (Some(ns), _) => match ns.as_static_str() {
                Some(ns) => Some(ns),
                None => {
                    self.warn(WarningKind::DynamicNamespace, line);
                    return;
                }
            },
            (None, Source::Bound(Some(ns))) if info.depends_on_context => match ns.as_static_str() {
                Some(ns) => Some(ns),
                None => {
                    self.warn(WarningKind::UnresolvableNamespace, line);
                    return;
                }
            },
            _ => None,
        };

        let default_value = match info.default_value.as_deref() {
            None => None,
            Some(node) => match node.as_static_str() {
                Some(value) => Some(value),
                None => {
                    self.warn(WarningKind::DynamicDefaultValue, line);
                    None
                }
            },
        };

        self.emit(
            key_name.to_string(),
            namespace.map(str::to_string),
            default_value.map(str::to_string),
            line,
        );
    }

    fn finish(mut self) -> Extraction {
        let comments = std::mem::take(&mut self.comments);
        for (comment, consumed) in comments.into_iter().zip(std::mem::take(&mut self.consumed)) {
            if consumed {
                continue;
            }
            match comment.directive {
                Directive::Ignore => self.warn(WarningKind::UnusedIgnore, comment.line),
                Directive::Key {
                    key_name,
                    namespace,
                    default_value,
                } => self.emit(key_name, namespace, default_value, comment.line),
                Directive::Malformed => self.warn(WarningKind::MalformedKeyOverride, comment.line),
                Directive::Invalid => self.warn(WarningKind::InvalidKeyOverride, comment.line),
            }
        }
        self.out.keys.sort_by_key(|k| k.line);
        self.out.warnings.sort_by_key(|w| w.line);
        self.out
    }
}
