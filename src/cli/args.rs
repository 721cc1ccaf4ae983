//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract print`: list every extracted key and warning
//! - `extract check`: report warnings only, failing when there are any
//! - `init`: create a `.tolgeerc.json` configuration file

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::core::families::Family;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(ExtractCommand::Print(args)))
            | Some(Command::Extract(ExtractCommand::Check(args))) => args.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    /// Files, directories or glob patterns (overrides config file)
    pub patterns: Vec<String>,

    /// Force a syntax family instead of detecting it per file
    #[arg(long, value_enum)]
    pub parser: Option<Family>,

    /// Drop keys whose namespace cannot be determined
    #[arg(long, overrides_with = "no_strict_namespace")]
    pub strict_namespace: bool,

    /// Keep keys whose namespace cannot be determined
    #[arg(long, overrides_with = "strict_namespace")]
    pub no_strict_namespace: bool,

    /// Namespace for keys that resolve to none (overrides config file)
    #[arg(long)]
    pub default_namespace: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ExtractArgs {
    /// The strict-namespace override, if either flag was given.
    pub fn strict_namespace(&self) -> Option<bool> {
        if self.strict_namespace {
            Some(true)
        } else if self.no_strict_namespace {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ExtractCommand {
    /// Print the keys and warnings found in each file
    Print(ExtractArgs),
    /// Report extraction warnings; exits with 1 if there are any
    Check(ExtractArgs),
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract Tolgee translation keys from source files
    #[command(subcommand)]
    Extract(ExtractCommand),
    /// Initialize a new .tolgeerc.json configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Arguments {
        Arguments::try_parse_from(std::iter::once("tolgee-extract").chain(args.iter().copied()))
            .unwrap()
    }

    fn extract_args(args: &[&str]) -> ExtractArgs {
        match parse(args).command {
            Some(Command::Extract(ExtractCommand::Print(args)))
            | Some(Command::Extract(ExtractCommand::Check(args))) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_extract_print_defaults() {
        let args = extract_args(&["extract", "print"]);
        assert!(args.patterns.is_empty());
        assert_eq!(args.parser, None);
        assert_eq!(args.strict_namespace(), None);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.common.verbose);
    }

    #[test]
    fn test_extract_check_with_overrides() {
        let args = extract_args(&[
            "extract",
            "check",
            "src/**/*.vue",
            "--parser",
            "vue",
            "--no-strict-namespace",
            "--default-namespace",
            "common",
            "--format",
            "json",
            "-v",
        ]);
        assert_eq!(args.patterns, vec!["src/**/*.vue"]);
        assert_eq!(args.parser, Some(Family::Vue));
        assert_eq!(args.strict_namespace(), Some(false));
        assert_eq!(args.default_namespace.as_deref(), Some("common"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.common.verbose);
    }

    #[test]
    fn test_last_strict_flag_wins() {
        let args = extract_args(&["extract", "print", "--no-strict-namespace", "--strict-namespace"]);
        assert_eq!(args.strict_namespace(), Some(true));
    }

    #[test]
    fn test_verbose_is_read_from_subcommand() {
        assert!(parse(&["extract", "print", "--verbose"]).verbose());
        assert!(!parse(&["init"]).verbose());
    }

    #[test]
    fn test_unknown_parser_is_rejected() {
        let result = Arguments::try_parse_from(["tolgee-extract", "extract", "print", "--parser", "solid"]);
        assert!(result.is_err());
    }
}
