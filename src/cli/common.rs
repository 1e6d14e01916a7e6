//! Shared CLI types: exit codes, errors and output helpers.

use serde::Serialize;
use std::fmt;

/// Process exit codes used by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Invalid input: bad arguments, malformed project or config
    Validation = 1,
    /// File system or archive failure
    Io = 2,
    /// Interrupted with Ctrl-C
    Cancelled = 130,
}

impl ExitCode {
    /// Numeric process exit code.
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// A failed command, carrying the exit code to terminate with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Exit code for the process
    pub kind: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// Invalid input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::Validation,
            message: message.into(),
        }
    }

    /// File system or archive failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::Io,
            message: message.into(),
        }
    }

    /// User interrupt.
    pub fn cancelled() -> Self {
        Self {
            kind: ExitCode::Cancelled,
            message: "Operation cancelled".to_string(),
        }
    }

    /// Wraps a library error, choosing the exit code with [`classify`].
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self {
            kind: classify(err),
            message: chain(err),
        }
    }

    /// Numeric exit code.
    pub const fn exit_code(&self) -> i32 {
        self.kind.code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for command handlers.
pub type CliResult<T> = Result<T, CliError>;

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize output to JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Maps a failure to an exit code: I/O and archive errors are `Io`,
/// everything else is `Validation`.
pub fn classify(err: &anyhow::Error) -> ExitCode {
    let is_io = err
        .chain()
        .any(|cause| cause.is::<std::io::Error>() || cause.is::<zip::result::ZipError>());
    if is_io {
        ExitCode::Io
    } else {
        ExitCode::Validation
    }
}

/// Formats an error chain on one line (`outer: inner: root`).
pub fn chain(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::validation("bad").exit_code(), 1);
        assert_eq!(CliError::io("disk").exit_code(), 2);
        assert_eq!(CliError::cancelled().exit_code(), 130);
        assert_eq!(ExitCode::Success.code(), 0);
    }

    #[test]
    fn test_classify() {
        let io_err = anyhow::Error::new(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
            .context("Failed to open");
        assert_eq!(classify(&io_err), ExitCode::Io);
        assert_eq!(CliError::from_error(&io_err).message, "Failed to open: gone");
        assert_eq!(classify(&anyhow::anyhow!("bad input")), ExitCode::Validation);
    }

    #[test]
    fn test_chain_joins_context() {
        let err = anyhow::anyhow!("root cause").context("outer");
        assert_eq!(chain(&err), "outer: root cause");
    }
}
