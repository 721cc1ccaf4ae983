use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): extraction completed; `extract check` found no issues
/// - `Failure` (1): `extract check` found warnings or unreadable files
/// - `Error` (2): the command itself failed (bad config, I/O error, ...)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
