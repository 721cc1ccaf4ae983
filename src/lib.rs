//! tolgee-extract - static extraction of Tolgee translation keys
//!
//! Scans React, Vue, Svelte and Angular sources for the calls, components
//! and markup directives that reference translation keys, and reports the
//! keys together with warnings for anything that cannot be resolved
//! statically.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: `.tolgeerc.json` loading
//! - `core`: Extraction engine (tokens, merging, parsing, reporting)
//! - `issues`: Extracted keys, warning kinds and issue reporting

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
