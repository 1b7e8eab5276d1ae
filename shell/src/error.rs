use crate::command::ExitCode;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while dispatching one command line.
///
/// Only [`ShellError::Redirect`] is fatal: a redirect target that cannot be
/// opened ends the whole shell. Every other variant is reported and turned
/// into a non-zero status by [`ShellError::exit_code`].
#[derive(Debug, Error)]
pub enum ShellError {
    /// The line is longer than [`crate::parser::MAX_LINE_LEN`] characters.
    #[error("command line is longer than {limit} characters")]
    LineTooLong { limit: usize },

    /// The command has more tokens than [`crate::lexer::MAX_ARGS`].
    #[error("too many arguments: {count} (at most {limit})")]
    TooManyArguments { count: usize, limit: usize },

    /// The line contains a NUL character, which no program argument can carry.
    #[error("command line contains a NUL character")]
    EmbeddedNul,

    /// There is nothing to run, e.g. the left side of `> out`.
    #[error("empty command")]
    EmptyCommand,

    /// A redirect operator with no file name after it.
    #[error("missing file name after redirect")]
    MissingTarget,

    /// History recall kept resolving to another recall.
    #[error("history recall nested deeper than {limit} levels")]
    RecallTooDeep { limit: usize },

    /// The redirect target could not be opened.
    #[error("cannot open out buffer: {}: {source}", .path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cd: {}: {source}", .path.display())]
    DirectoryNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history: no command matches '{key}'")]
    HistoryNotFound { key: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ShellError {
    /// Whether the whole process has to stop instead of just this command.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Redirect { .. })
    }

    /// Status reported for a command that failed with this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ShellError::LineTooLong { .. }
            | ShellError::EmbeddedNul
            | ShellError::TooManyArguments { .. }
            | ShellError::EmptyCommand
            | ShellError::MissingTarget
            | ShellError::RecallTooDeep { .. } => 2,
            _ => 1,
        }
    }
}
