use crate::command::ExitCode;
use crate::error::ShellError;
use crate::interpreter::Session;
use crate::lexer::Argv;
use argh::{EarlyExit, FromArgs};
use std::fs;
use std::io;
use std::io::{Read, Write};
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "history".
    fn name() -> &'static str;

    /// Executes the command using provided IO streams and shell state.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode, ShellError>;
}

/// Parse `argv` as built-in `T` and run it.
///
/// Usage errors and `--help` print argh's text to `stdout` instead of failing:
/// status 1 for errors, 0 for help.
pub(crate) fn run_builtin<T: BuiltinCommand>(
    argv: &Argv,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
    session: &mut Session,
) -> Result<ExitCode, ShellError> {
    match T::from_args(&[T::name()], &argv.args_as_str()) {
        Ok(cmd) => cmd.execute(stdin, stdout, session),
        Err(EarlyExit { output, status }) => {
            stdout.write_all(output.as_bytes())?;
            Ok(if status.is_err() { 1 } else { 0 })
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode, ShellError> {
        let env = &mut session.env;
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => env.home_dir(),
        };

        let new_dir = env.resolve(target);
        let canonical = fs::canonicalize(&new_dir).map_err(|source| {
            ShellError::DirectoryNotFound {
                path: new_dir.clone(),
                source,
            }
        })?;
        if !canonical.is_dir() {
            return Err(ShellError::DirectoryNotFound {
                path: new_dir,
                source: io::Error::from(io::ErrorKind::NotADirectory),
            });
        }

        env.set_var("PWD", canonical.to_string_lossy());
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List the most recent commands with their sequence numbers and run times.
pub struct History {}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode, ShellError> {
        session.history.write_to(stdout)?;
        Ok(0)
    }
}
