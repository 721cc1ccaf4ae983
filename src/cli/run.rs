use anyhow::Result;

use super::{
    args::{Arguments, Command, ExtractCommand},
    commands::{extract, init::init},
    exit_status::ExitStatus,
};

/// Dispatch to the command handler.
pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Extract(ExtractCommand::Print(args))) => extract::print(&args),
        Some(Command::Extract(ExtractCommand::Check(args))) => extract::check(&args),
        Some(Command::Init) => init(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
