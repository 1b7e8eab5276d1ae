//! Tokenization of a single command into its argument vector.
//!
//! Operators are resolved by [`crate::parser`] before a command reaches this
//! module, so tokens here are plain whitespace-separated words. Quoting is not
//! supported: a token can never contain a space.

use crate::error::ShellError;

/// Largest number of tokens a command may have.
pub const MAX_ARGS: usize = 128;

/// Program name followed by its arguments, in the order they were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argv(Vec<String>);

impl Argv {
    /// The program to run, i.e. the first token.
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    /// Everything after the program name.
    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Arguments as borrowed strings, the shape `argh` expects.
    pub fn args_as_str(&self) -> Vec<&str> {
        self.args().iter().map(String::as_str).collect()
    }
}

/// Split `command` on whitespace into an [`Argv`].
///
/// Fails with [`ShellError::EmptyCommand`] when there is no token at all and
/// with [`ShellError::TooManyArguments`] past [`MAX_ARGS`] tokens.
pub fn split_into_tokens(command: &str) -> Result<Argv, ShellError> {
    let tokens: Vec<String> = command.split_whitespace().map(str::to_string).collect();
    if tokens.is_empty() {
        return Err(ShellError::EmptyCommand);
    }
    if tokens.len() > MAX_ARGS {
        return Err(ShellError::TooManyArguments {
            count: tokens.len(),
            limit: MAX_ARGS,
        });
    }
    Ok(Argv(tokens))
}
