//! Process exit codes for the CLI tool.

use arcmill::Error;

/// Exit status used when a second Ctrl+C aborts the process (128 + SIGINT).
pub const USER_INTERRUPT: i32 = 130;

/// Outcome of a command, as reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// Finished, but something was skipped or nothing matched.
    Warning = 1,
    FatalError = 2,
    /// The archive is corrupt or its codec rejected it.
    BadArchive = 3,
    /// The name is not a known archive suffix, or the format is read-only.
    BadFormat = 4,
    IoError = 5,
    UserInterrupt = USER_INTERRUPT,
    /// A source or key set the operation cannot use.
    BadInput = 255,
}

impl ExitCode {
    /// Returns the numeric exit status.
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Maps a failed operation onto an exit code.
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    if error.is_classification() {
        return ExitCode::BadFormat;
    }
    match error {
        Error::Io(_) | Error::DestinationWrite { .. } => ExitCode::IoError,
        Error::NoCodec { .. } => ExitCode::BadFormat,
        Error::Codec { .. } | Error::SourceRead { .. } => ExitCode::BadArchive,
        Error::Cancelled => ExitCode::UserInterrupt,
        Error::InvalidSource { .. } | Error::TooManyEntries { .. } => ExitCode::BadInput,
        _ => ExitCode::FatalError,
    }
}
