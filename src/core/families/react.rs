//! React and plain script.
//!
//! `useTranslate(ns)` / `getTranslate(ns)` bind a namespace, `t(...)` is a
//! key site resolved against it, `x.t(...)` is a global key site and
//! `<T keyName=..>` is the component form.

use std::sync::LazyLock;

use super::{Family, FamilyConfig, identity};
use crate::core::mapper::{Mapper, markup_mapper, script_mapper};
use crate::core::merge::Merger;
use crate::core::merge::machines::{
    ATTRIBUTE_HYPHEN, GET_TRANSLATE, GLOBAL_T_FUNCTION, STRING, T_COMPONENT, T_FUNCTION,
    TAG_BEGIN, TAG_CLOSING, TEMPLATE, USE_TRANSLATE,
};
use crate::core::parser::RuleTable;
use crate::core::parser::rules::{global_t_function, namespace_source, t_component, t_function};
use crate::core::token::Kind;

pub static MAPPERS: &[Mapper] = &[markup_mapper, script_mapper];

pub static PIPELINE: &[&(dyn Merger + Sync)] = &[
    &STRING,
    &TEMPLATE,
    &ATTRIBUTE_HYPHEN,
    &TAG_CLOSING,
    &T_COMPONENT,
    &TAG_BEGIN,
    &GLOBAL_T_FUNCTION,
    &T_FUNCTION,
    &USE_TRANSLATE,
    &GET_TRANSLATE,
];

/// Script key sites shared with the markup families.
pub fn script_rules() -> RuleTable {
    RuleTable::base()
        .with(Kind::TriggerTFunction, t_function)
        .with(Kind::TriggerGlobalTFunction, global_t_function)
        .with(Kind::TriggerNamespaceSource, namespace_source)
        .with(Kind::TriggerTComponent, t_component)
}

pub static CONFIG: LazyLock<FamilyConfig> = LazyLock::new(|| FamilyConfig {
    family: Family::React,
    mappers: MAPPERS,
    pipeline: PIPELINE,
    rules: script_rules(),
    transform: identity,
});
