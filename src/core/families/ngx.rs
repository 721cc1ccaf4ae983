//! Angular templates and services.
//!
//! Three constructs: the `'key' | translate:...` pipe, the `t` attribute
//! directive and `translateService.instant(...)`-style service calls. The
//! pipe has no key of its own; the transform hands it the expression to its
//! left.

use std::sync::LazyLock;

use super::{Family, FamilyConfig};
use crate::core::ExtractError;
use crate::core::mapper::{Mapper, markup_mapper, script_mapper};
use crate::core::merge::machines::{
    ATTRIBUTE_HYPHEN, BINDING, STRING, TAG_BEGIN, TAG_CLOSING, TEMPLATE,
};
use crate::core::merge::{EndAction, Machine, Merger, Step, concat};
use crate::core::parser::rules::{apply_options, global_t_function};
use crate::core::parser::{AttributeTrigger, Parser, RuleTable};
use crate::core::token::{Kind, Token};
use crate::core::tree::{Dict, KeyInfo, Node};
use crate::issues::Warning;

// ============================================================
// Mapping and merging
// ============================================================

fn ngx_mapper(raw: &str) -> Option<Kind> {
    if raw.starts_with("keyword.operator.bitwise.or") {
        Some(Kind::Pipe)
    } else if raw.starts_with("punctuation.definition.binding.begin") {
        Some(Kind::TagBindBegin)
    } else if raw.starts_with("punctuation.definition.binding.end") {
        Some(Kind::TagBindEnd)
    } else {
        None
    }
}

pub static MAPPERS: &[Mapper] = &[ngx_mapper, markup_mapper, script_mapper];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeState {
    Start,
    Pipe,
}

fn pipe_step(state: PipeState, token: &Token) -> Step<PipeState> {
    match (state, token.semantic) {
        (PipeState::Start, Some(Kind::Pipe)) => Step::Continue(PipeState::Pipe),
        (PipeState::Pipe, Some(Kind::Identifier)) if token.text == "translate" => {
            Step::End(EndAction::MergeAll)
        }
        _ => Step::Abort,
    }
}

/// `| translate` → pipe trigger.
pub static PIPE: Machine<PipeState> = Machine {
    name: "merged.trigger.ngx.pipe",
    initial: PipeState::Start,
    step: pipe_step,
    result: Kind::TriggerNgxPipe,
    reduce: concat,
    partition: None,
};

fn directive_step(_: (), token: &Token) -> Step<()> {
    if token.is_text(Kind::TagAttributeName, "t") {
        Step::End(EndAction::MergeAll)
    } else {
        Step::Abort
    }
}

/// `t` attribute → directive trigger.
/// Matches a single token, so it carries no state.
pub static DIRECTIVE: Machine<()> = Machine {
    name: "merged.trigger.ngx.directive",
    initial: (),
    step: directive_step,
    result: Kind::TriggerNgxDirective,
    reduce: concat,
    partition: None,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Start,
    This,
    ThisDot,
    Receiver,
    Dot,
    Method,
}

const SERVICE_METHODS: &[&str] = &["instant", "get", "translate", "stream"];

fn is_service_name(token: &Token) -> bool {
    token.is(Kind::Identifier) && token.text.to_ascii_lowercase().contains("translate")
}

fn service_step(state: ServiceState, token: &Token) -> Step<ServiceState> {
    match (state, token.semantic) {
        (ServiceState::Start, Some(Kind::Identifier)) if token.text == "this" => {
            Step::Continue(ServiceState::This)
        }
        (ServiceState::Start | ServiceState::ThisDot, _) if is_service_name(token) => {
            Step::Continue(ServiceState::Receiver)
        }
        (ServiceState::This, Some(Kind::Accessor)) => Step::Continue(ServiceState::ThisDot),
        (ServiceState::Receiver, Some(Kind::Accessor)) => Step::Continue(ServiceState::Dot),
        (ServiceState::Dot, Some(Kind::Identifier))
            if SERVICE_METHODS.contains(&token.text.as_str()) =>
        {
            Step::Continue(ServiceState::Method)
        }
        (ServiceState::Method, Some(Kind::ExpressionBegin)) => Step::End(EndAction::MergeCustom),
        _ => Step::Abort,
    }
}

/// Leave `this .` in front and the `(` behind the merged call.
fn service_partition(tokens: &[Token]) -> (usize, usize) {
    let start = if tokens.first().is_some_and(|t| t.text == "this") {
        2
    } else {
        0
    };
    (start, tokens.len().saturating_sub(1))
}

/// `[this.]translateService.instant(` → service trigger.
pub static SERVICE: Machine<ServiceState> = Machine {
    name: "merged.trigger.ngx.service",
    initial: ServiceState::Start,
    step: service_step,
    result: Kind::TriggerNgxService,
    reduce: concat,
    partition: Some(service_partition),
};

pub static PIPELINE: &[&(dyn Merger + Sync)] = &[
    &STRING,
    &TEMPLATE,
    &ATTRIBUTE_HYPHEN,
    &BINDING,
    &DIRECTIVE,
    &TAG_CLOSING,
    &TAG_BEGIN,
    &PIPE,
    &SERVICE,
];

// ============================================================
// Rules
// ============================================================

/// Where a pipe argument ends.
const PIPE_ARG_ENDS: &[Kind] = &[
    Kind::Colon,
    Kind::Pipe,
    Kind::TriggerNgxPipe,
    Kind::Comma,
    Kind::Semicolon,
    Kind::ExpressionEnd,
    Kind::ExpressionTemplateEnd,
    Kind::ListEnd,
    Kind::BlockEnd,
];

/// `| translate[:arg[:arg]]`: a static string argument is the default
/// value, a dict holds the options.
fn pipe(p: &mut Parser<'_>) -> Result<Node, ExtractError> {
    let trigger = p.take_trigger()?;
    let mut info = KeyInfo {
        line: trigger.line,
        ..KeyInfo::default()
    };
    while p.cursor.eat(Kind::Colon).is_some() {
        let line = p.cursor.line();
        let values = p.parse_values(PIPE_ARG_ENDS)?;
        if values.is_empty() {
            continue;
        }
        match Node::from_values(line, values).into_single() {
            Node::Dict(options) => apply_options(&mut info, options),
            default if info.default_value.is_none() && default.as_static_str().is_some() => {
                info.default_value = Some(Box::new(default));
            }
            other => {
                info.options_dynamic = true;
                info.values.push(other);
            }
        }
    }
    Ok(Node::KeyInfo(info))
}

/// `<p t key="k" ns="n" default="D" [params]="{..}">`.
fn directive(trigger: AttributeTrigger, props: &mut Dict) -> Node {
    let line = trigger.token.line;
    let mut info = KeyInfo {
        line,
        // A directive without `key` is never static.
        key_name: Some(Box::new(
            props.take(&["key"]).unwrap_or_else(|| Node::opaque(line)),
        )),
        namespace: props.take(&["ns"]).map(Box::new),
        default_value: props.take(&["default", "defaultValue"]).map(Box::new),
        ..KeyInfo::default()
    };
    if let Some(params) = props.take(&["params"]) {
        info.values.push(params);
    }
    Node::KeyInfo(info)
}

pub fn rules() -> RuleTable {
    RuleTable::base()
        .with(Kind::TriggerNgxPipe, pipe)
        .with(Kind::TriggerNgxService, global_t_function)
        .with_attribute(Kind::TriggerNgxDirective, directive)
}

// ============================================================
// Transform
// ============================================================

fn transform(root: &mut Vec<Node>, _: &mut Vec<Warning>) {
    adopt_keys(root);
}

fn is_keyless(node: &Node) -> bool {
    matches!(node, Node::KeyInfo(info) if info.key_name.is_none())
}

/// Give each keyless key site the operand to its left: the siblings since
/// the previous key site.
fn adopt_keys(values: &mut Vec<Node>) {
    let mut start = 0;
    let mut i = 0;
    while i < values.len() {
        if is_keyless(&values[i]) && i > start {
            let line = values[start].line();
            let operand: Vec<Node> = values.drain(start..i).collect();
            i = start;
            if let Node::KeyInfo(info) = &mut values[i] {
                info.key_name = Some(Box::new(Node::from_values(line, operand)));
            }
        }
        if matches!(values[i], Node::KeyInfo(_)) {
            start = i + 1;
        }
        i += 1;
    }
    for node in values.iter_mut() {
        adopt_keys_in(node);
    }
}

fn adopt_keys_in(node: &mut Node) {
    match node {
        Node::Expression { values, .. } | Node::Array { values, .. } => adopt_keys(values),
        Node::KeyInfo(info) => adopt_keys(&mut info.values),
        Node::NamespaceInfo(info) => adopt_keys(&mut info.values),
        Node::Dict(dict) => {
            for (_, value) in dict.value.iter_mut() {
                adopt_keys_in(value);
            }
            adopt_keys(&mut dict.unknown);
        }
        Node::Primitive { .. } => {}
    }
}

pub static CONFIG: LazyLock<FamilyConfig> = LazyLock::new(|| FamilyConfig {
    family: Family::Ngx,
    mappers: MAPPERS,
    pipeline: PIPELINE,
    rules: rules(),
    transform,
});
