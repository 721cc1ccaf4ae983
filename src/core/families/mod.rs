//! Syntax families.
//!
//! A family bundles everything that differs between framework flavours: the
//! kind mappers, the merge pipeline, the rule table and the tree transform.
//! Families are composed from the shared tables plus their own additions.

pub mod ngx;
pub mod react;
pub mod svelte;
pub mod vue;

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::mapper::Mapper;
use crate::core::merge::Pipeline;
use crate::core::parser::RuleTable;
use crate::core::tree::{Block, Node};
use crate::issues::Warning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    React,
    Vue,
    Svelte,
    Ngx,
}

impl Family {
    pub fn name(&self) -> &'static str {
        match self {
            Family::React => "react",
            Family::Vue => "vue",
            Family::Svelte => "svelte",
            Family::Ngx => "ngx",
        }
    }

    pub fn config(&self) -> &'static FamilyConfig {
        match self {
            Family::React => &react::CONFIG,
            Family::Vue => &vue::CONFIG,
            Family::Svelte => &svelte::CONFIG,
            Family::Ngx => &ngx::CONFIG,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "react" => Ok(Family::React),
            "vue" => Ok(Family::Vue),
            "svelte" => Ok(Family::Svelte),
            "ngx" => Ok(Family::Ngx),
            other => Err(format!("unknown parser `{other}`")),
        }
    }
}

/// Tree rewrite run once after parsing.
pub type TransformFn = fn(&mut Vec<Node>, &mut Vec<Warning>);

pub struct FamilyConfig {
    pub family: Family,
    pub mappers: &'static [Mapper],
    pub pipeline: Pipeline,
    pub rules: RuleTable,
    pub transform: TransformFn,
}

/// Transform of families that need none.
pub fn identity(_: &mut Vec<Node>, _: &mut Vec<Warning>) {}

/// Move `<script>` blocks ahead of the markup, keeping their relative order,
/// so translation sources they declare are in scope for the template.
pub fn relocate_scripts(values: &mut Vec<Node>) {
    let (scripts, rest): (Vec<Node>, Vec<Node>) = std::mem::take(values)
        .into_iter()
        .partition(|node| node.is_block(Block::Script));
    values.extend(scripts);
    values.extend(rest);
}
