//! Svelte components.
//!
//! `getTranslate(ns)` binds a namespace and `$t(...)` reads the bound store,
//! so `$t` is resolved against the enclosing source like React's `t`.

use std::sync::LazyLock;

use super::{Family, FamilyConfig, relocate_scripts};
use crate::core::mapper::{Mapper, markup_mapper, script_mapper};
use crate::core::merge::machines::{
    ATTRIBUTE_HYPHEN, CallState, GET_TRANSLATE, GLOBAL_T_FUNCTION, SCRIPT_BEGIN, SCRIPT_END,
    STRING, T_COMPONENT, TAG_BEGIN, TAG_CLOSING, TEMPLATE, callee_step, first_text,
};
use crate::core::merge::{Machine, Merger, Step};
use crate::core::parser::RuleTable;
use crate::core::parser::rules::{global_t_function, namespace_source, t_component, t_function};
use crate::core::parser::tag::parse_script;
use crate::core::token::{Kind, Token};
use crate::core::tree::Node;
use crate::issues::Warning;

pub static MAPPERS: &[Mapper] = &[markup_mapper, script_mapper];

fn store_t_step(state: CallState, token: &Token) -> Step<CallState> {
    callee_step(state, token, &["$t"])
}

/// `$t(` → context-dependent key site.
pub static STORE_T: Machine<CallState> = Machine {
    name: "merged.trigger.svelte.t",
    initial: CallState::Start,
    step: store_t_step,
    result: Kind::TriggerTFunction,
    reduce: first_text,
    partition: None,
};

pub static PIPELINE: &[&(dyn Merger + Sync)] = &[
    &STRING,
    &TEMPLATE,
    &ATTRIBUTE_HYPHEN,
    &TAG_CLOSING,
    &SCRIPT_BEGIN,
    &SCRIPT_END,
    &T_COMPONENT,
    &TAG_BEGIN,
    &GLOBAL_T_FUNCTION,
    &STORE_T,
    &GET_TRANSLATE,
];

pub fn rules() -> RuleTable {
    RuleTable::base()
        .with(Kind::ScriptBegin, parse_script)
        .with(Kind::TriggerTFunction, t_function)
        .with(Kind::TriggerGlobalTFunction, global_t_function)
        .with(Kind::TriggerNamespaceSource, namespace_source)
        .with(Kind::TriggerTComponent, t_component)
}

fn transform(root: &mut Vec<Node>, _: &mut Vec<Warning>) {
    relocate_scripts(root);
}

pub static CONFIG: LazyLock<FamilyConfig> = LazyLock::new(|| FamilyConfig {
    family: Family::Svelte,
    mappers: MAPPERS,
    pipeline: PIPELINE,
    rules: rules(),
    transform,
});
