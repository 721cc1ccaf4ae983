//! Vue single-file components.
//!
//! Adds to the script rules: `$t(...)` global calls, the `v-t` directive,
//! `<script>` blocks and options-API `setup` functions, whose bodies are
//! flattened into the script top level so the namespace they bind applies
//! to the template.

use std::sync::LazyLock;

use super::{Family, FamilyConfig, relocate_scripts};
use crate::core::ExtractError;
use crate::core::mapper::{Mapper, markup_mapper, script_mapper};
use crate::core::merge::machines::{
    ATTRIBUTE_HYPHEN, CallState, GLOBAL_T_FUNCTION, SCRIPT_BEGIN, SCRIPT_END, STRING,
    T_COMPONENT, T_FUNCTION, TAG_BEGIN, TAG_CLOSING, TEMPLATE, USE_TRANSLATE, callee_step,
};
use crate::core::merge::{EndAction, Machine, Merger, Step, concat};
use crate::core::parser::object::parse_object;
use crate::core::parser::rules::apply_options;
use crate::core::parser::tag::parse_script;
use crate::core::parser::{AttributeTrigger, Parser, RuleTable};
use crate::core::token::{Kind, Token};
use crate::core::tree::{Block, Dict, KeyInfo, Node};
use crate::issues::{Warning, WarningKind};

// ============================================================
// Mapping and merging
// ============================================================

/// Binding shorthands and modifiers carry no meaning once the attribute
/// value is known to be an expression.
fn vue_mapper(raw: &str) -> Option<Kind> {
    if raw.starts_with("punctuation.attribute-shorthand")
        || raw.starts_with("punctuation.separator.modifier")
        || raw.starts_with("entity.other.attribute-name.modifier")
    {
        Some(Kind::Ignore)
    } else {
        None
    }
}

pub static MAPPERS: &[Mapper] = &[vue_mapper, markup_mapper, script_mapper];

fn dollar_t_step(state: CallState, token: &Token) -> Step<CallState> {
    callee_step(state, token, &["$t"])
}

/// `$t(` → global key site.
pub static DOLLAR_T: Machine<CallState> = Machine {
    name: "merged.trigger.vue.global.t",
    initial: CallState::Start,
    step: dollar_t_step,
    result: Kind::TriggerGlobalTFunction,
    reduce: concat,
    partition: None,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    Start,
    Name,
}

fn setup_step(state: SetupState, token: &Token) -> Step<SetupState> {
    match (state, token.semantic) {
        (SetupState::Start, Some(Kind::Identifier)) if token.text == "setup" => {
            Step::Continue(SetupState::Name)
        }
        (SetupState::Name, Some(Kind::ExpressionBegin | Kind::Colon)) => {
            Step::End(EndAction::ReplaceFirst)
        }
        _ => Step::Abort,
    }
}

/// `setup(` and `setup:` in a component definition.
pub static SETUP: Machine<SetupState> = Machine {
    name: "merged.trigger.vue.setup",
    initial: SetupState::Start,
    step: setup_step,
    result: Kind::TriggerVueSetup,
    reduce: concat,
    partition: None,
};

fn directive_step(_: (), token: &Token) -> Step<()> {
    if token.is_text(Kind::TagAttributeName, "v-t") {
        Step::End(EndAction::MergeAll)
    } else {
        Step::Abort
    }
}

/// `v-t` attribute → directive trigger. Runs after [`ATTRIBUTE_HYPHEN`].
/// Matches a single token, so it carries no state.
pub static DIRECTIVE: Machine<()> = Machine {
    name: "merged.trigger.vue.directive",
    initial: (),
    step: directive_step,
    result: Kind::TriggerVueDirective,
    reduce: concat,
    partition: None,
};

pub static PIPELINE: &[&(dyn Merger + Sync)] = &[
    &STRING,
    &TEMPLATE,
    &ATTRIBUTE_HYPHEN,
    &DIRECTIVE,
    &TAG_CLOSING,
    &SCRIPT_BEGIN,
    &SCRIPT_END,
    &T_COMPONENT,
    &TAG_BEGIN,
    &DOLLAR_T,
    &GLOBAL_T_FUNCTION,
    &T_FUNCTION,
    &USE_TRANSLATE,
    &SETUP,
];

// ============================================================
// Rules
// ============================================================

/// `setup() { ... }`, `setup: function () { ... }`, `setup: () => expr`
/// or `setup: reference`.
fn setup(p: &mut Parser<'_>) -> Result<Node, ExtractError> {
    let trigger = p.take_trigger()?;
    let line = trigger.line;
    p.cursor.eat(Kind::Colon);
    let mut function_keyword = false;
    while let Some(token) = p.cursor.current()
        && token.is(Kind::Keyword)
    {
        function_keyword |= token.text == "function";
        p.cursor.next();
    }
    // `function setup() {}`: the name is not part of the value.
    if function_keyword
        && matches!(
            p.cursor.kind(),
            Some(Kind::Identifier | Kind::TriggerVueSetup)
        )
    {
        p.cursor.next();
    }

    let is_function = match p.cursor.kind() {
        Some(Kind::ExpressionBegin) => true,
        Some(Kind::Identifier) => {
            let next = p.cursor.peek().and_then(|t| t.semantic);
            next == Some(Kind::Arrow)
        }
        _ => false,
    };
    if !is_function {
        let values = p.parse_values(&[Kind::Comma, Kind::BlockEnd])?;
        return Ok(Node::Expression {
            line,
            block: Block::SetupReference,
            values,
        });
    }

    // `(props, ctx)` or a single arrow parameter.
    if p.cursor.at(Kind::Identifier) {
        p.cursor.next();
    }
    if p.cursor.at(Kind::ExpressionBegin) {
        p.parse_args()?;
    }
    p.cursor.eat(Kind::Arrow);

    let values = if p.cursor.at(Kind::BlockBegin) {
        match p.invoke(parse_object)? {
            Node::Expression { values, .. } => values,
            Node::Dict(dict) => dict.into_values(),
            other => vec![other],
        }
    } else {
        p.parse_values(&[Kind::Comma, Kind::BlockEnd])?
    };
    Ok(Node::Expression {
        line,
        block: Block::Setup,
        values,
    })
}

/// `v-t="'key'"` or `v-t="{ key: 'key', ns: 'ns', defaultValue: '..' }"`.
fn directive(trigger: AttributeTrigger, _: &mut Dict) -> Node {
    let mut info = KeyInfo {
        line: trigger.token.line,
        ..KeyInfo::default()
    };
    match trigger.value.map(Node::into_single) {
        Some(Node::Dict(mut dict)) => {
            info.key_name = dict.take(&["key", "keyName", "path"]).map(Box::new);
            apply_options(&mut info, dict);
        }
        Some(key) => info.key_name = Some(Box::new(key)),
        None => {}
    }
    Node::KeyInfo(info)
}

pub fn rules() -> RuleTable {
    super::react::script_rules()
        .with(Kind::ScriptBegin, parse_script)
        .with(Kind::TriggerVueSetup, setup)
        .with_attribute(Kind::TriggerVueDirective, directive)
}

// ============================================================
// Transform
// ============================================================

fn transform(root: &mut Vec<Node>, warnings: &mut Vec<Warning>) {
    relocate_scripts(root);
    let has_scripts = root.iter().any(|node| node.is_block(Block::Script));
    if !has_scripts {
        // Plain script file: the root is the script top level.
        flatten_setup(root, warnings);
        return;
    }
    for node in root.iter_mut() {
        if let Node::Expression {
            block: Block::Script,
            values,
            ..
        } = node
        {
            flatten_setup(values, warnings);
        }
    }
}

/// Splice every setup body found under a top-level value right after it.
fn flatten_setup(top: &mut Vec<Node>, warnings: &mut Vec<Warning>) {
    let mut i = 0;
    while i < top.len() {
        if top[i].is_block(Block::Setup) {
            let body = match top.remove(i) {
                Node::Expression { values, .. } => values,
                _ => Vec::new(),
            };
            let n = body.len();
            top.splice(i..i, body);
            i += n;
            continue;
        }
        if top[i].is_block(Block::SetupReference) {
            warnings.push(Warning::new(WarningKind::VueSetupIsAReference, top[i].line()));
        }
        let mut bodies = Vec::new();
        take_setups(&mut top[i], &mut bodies, warnings);
        let n = bodies.len();
        top.splice(i + 1..i + 1, bodies);
        i += 1 + n;
    }
}

fn take_setups(node: &mut Node, out: &mut Vec<Node>, warnings: &mut Vec<Warning>) {
    match node {
        Node::Expression { values, .. } | Node::Array { values, .. } => {
            take_setups_from(values, out, warnings)
        }
        Node::KeyInfo(info) => take_setups_from(&mut info.values, out, warnings),
        Node::NamespaceInfo(info) => take_setups_from(&mut info.values, out, warnings),
        Node::Dict(dict) => {
            for (_, value) in dict.value.iter_mut() {
                take_setups(value, out, warnings);
            }
            take_setups_from(&mut dict.unknown, out, warnings);
        }
        Node::Primitive { .. } => {}
    }
}

fn take_setups_from(values: &mut Vec<Node>, out: &mut Vec<Node>, warnings: &mut Vec<Warning>) {
    let mut i = 0;
    while i < values.len() {
        if values[i].is_block(Block::Setup) {
            if let Node::Expression { values: body, .. } = values.remove(i) {
                out.extend(body);
            }
            continue;
        }
        if values[i].is_block(Block::SetupReference) {
            warnings.push(Warning::new(WarningKind::VueSetupIsAReference, values[i].line()));
        }
        take_setups(&mut values[i], out, warnings);
        i += 1;
    }
}

pub static CONFIG: LazyLock<FamilyConfig> = LazyLock::new(|| FamilyConfig {
    family: Family::Vue,
    mappers: MAPPERS,
    pipeline: PIPELINE,
    rules: rules(),
    transform,
});
