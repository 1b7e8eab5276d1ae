use crate::builtin::{self, Cd, History};
use crate::command::{ExitCode, InheritedStdin, Stdin, Stdout};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external;
use crate::history::{HISTORY_CAPACITY, HistoryEntry, HistoryStore};
use crate::io_adapters::Console;
use crate::lexer;
use crate::parser::{self, HistoryCommand, Operator};
use log::{debug, error, warn};
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io;
use std::time::Instant;

/// How many recalls may resolve to another recall before giving up.
pub const MAX_RECALL_DEPTH: usize = HISTORY_CAPACITY;

/// State a command runs against: the environment and the command history.
///
/// Operators dispatch their operands in a clone of the session (see
/// [`Session::subshell`]), which plays the part of a forked child. The
/// console is shared with every clone.
#[derive(Debug, Clone)]
pub struct Session {
    pub env: Environment,
    pub history: HistoryStore,
    pub console: Console,
}

impl Session {
    /// Snapshot of this session for a child context.
    pub fn subshell(&self) -> Session {
        self.clone()
    }

    /// Classify `line` and run it with the given streams.
    ///
    /// Priority: an operator split first, then `cd`, then the history
    /// built-ins, then an external program. `depth` counts history recalls
    /// on the way here.
    pub(crate) fn execute(
        &mut self,
        line: &str,
        mut stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        depth: usize,
    ) -> Result<ExitCode, ShellError> {
        let split = parser::split_command(line);
        if let Some(operator) = split.operator {
            debug!("{:?}: left {:?}, right {:?}", operator, split.left, split.right);
            return match operator {
                op if op.is_redirect() => {
                    self.console.line(format_args!("File Redirect"))?;
                    self.redirect(op, &split, stdin, stdout, depth)
                }
                Operator::Pipe => {
                    self.console.line(format_args!("Pipe Redirect"))?;
                    let code = self.pipe(&split, stdin, stdout, depth)?;
                    self.console.line(format_args!("Pipe Exited with {code} status"))?;
                    Ok(code)
                }
                op => {
                    self.console.line(format_args!("Command Chain"))?;
                    self.chain(op, &split, stdin, stdout, depth)
                }
            };
        }

        if parser::is_cd(line) {
            self.console.line(format_args!("cd command."))?;
            let argv = lexer::split_into_tokens(line)?;
            return match builtin::run_builtin::<Cd>(&argv, &mut stdin, &mut stdout, self) {
                Err(e @ ShellError::DirectoryNotFound { .. }) => {
                    self.console.line(format_args!("'cd' failed to find directory."))?;
                    warn!("{e}");
                    Ok(e.exit_code())
                }
                other => other,
            };
        }

        if let Some(command) = parser::is_history(line) {
            self.console.line(format_args!("history command"))?;
            if command == HistoryCommand::List {
                let argv = lexer::split_into_tokens(line)?;
                return builtin::run_builtin::<History>(&argv, &mut stdin, &mut stdout, self);
            }
            return self.recall(&command, line, stdin, stdout, depth);
        }

        let argv = lexer::split_into_tokens(line)?;
        self.console.line(format_args!("UNIX command {}", line.trim()))?;
        let code = external::spawn_plain(&argv, stdin, stdout, &self.env, &self.console)?;
        self.console.line(format_args!("UNIX exited with {code} status."))?;
        Ok(code)
    }

    /// Re-run a recorded command without recording it again.
    fn recall(
        &mut self,
        key: &HistoryCommand,
        line: &str,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        depth: usize,
    ) -> Result<ExitCode, ShellError> {
        if depth >= MAX_RECALL_DEPTH {
            return Err(ShellError::RecallTooDeep {
                limit: MAX_RECALL_DEPTH,
            });
        }

        let Some(recalled) = self.history.recall(key).map(str::to_owned) else {
            self.console.line(format_args!("'history' failed to find command."))?;
            let e = ShellError::HistoryNotFound {
                key: line.trim().trim_start_matches('!').to_string(),
            };
            warn!("{e}");
            return Ok(e.exit_code());
        };

        debug!("recalled {recalled:?}");
        self.execute(&recalled, stdin, stdout, depth + 1)
    }
}

/// Report a non-fatal error and turn it into the command's status.
///
/// Fatal errors pass through untouched.
pub(crate) fn settle(
    console: &Console,
    result: Result<ExitCode, ShellError>,
) -> Result<ExitCode, ShellError> {
    match result {
        Err(e) if !e.is_fatal() => {
            console.line(format_args!("{e}"))?;
            warn!("command failed: {e}");
            Ok(e.exit_code())
        }
        other => other,
    }
}

/// Like [`settle`], for the result of a child context.
///
/// A fatal error ends only the child, which then exits with status 1; the
/// shell that started it keeps going.
pub(crate) fn settle_child(
    console: &Console,
    result: Result<ExitCode, ShellError>,
) -> Result<ExitCode, ShellError> {
    match settle(console, result) {
        Err(e) if e.is_fatal() => {
            error!("child context stopped: {e}");
            console.line(format_args!("{FATAL_MESSAGE}"))?;
            Ok(1)
        }
        other => other,
    }
}

const FATAL_MESSAGE: &str = "cannot open out buffer: exit.";

/// Install a do-nothing SIGINT handler.
///
/// The shell survives Ctrl-C while a program runs in the foreground. Spawned
/// programs get the default disposition back on exec and still terminate.
pub fn ignore_interrupts() -> nix::Result<()> {
    extern "C" fn on_interrupt(_: nix::libc::c_int) {}

    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler touches no state at all.
    unsafe { signal::sigaction(Signal::SIGINT, &action) }?;
    Ok(())
}

/// A line-oriented shell: classifies each line, runs it and keeps a history.
///
/// Example
/// ```no_run
/// use cmdsh::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.dispatch("echo hello world").unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    session: Session,
    dispatched: u64,
}

impl Interpreter {
    /// Create an interpreter with an empty history running in `env`.
    ///
    /// Status lines go to the process's standard output.
    pub fn new(env: Environment) -> Self {
        Self::with_console(env, Console::stdout())
    }

    /// Like [`Interpreter::new`], printing status lines to `console`.
    pub fn with_console(env: Environment, console: Console) -> Self {
        Self {
            session: Session {
                env,
                history: HistoryStore::new(),
                console,
            },
            dispatched: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Number of lines recorded so far; also the last sequence number handed out.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Dispatch one line using the shell's own standard streams.
    pub fn dispatch(&mut self, line: &str) -> Result<ExitCode, ShellError> {
        self.dispatch_with_output(line, Box::new(InheritedStdin::new()), Box::new(io::stdout()))
    }

    /// Dispatch one top-level line with explicit standard streams.
    ///
    /// The line is recorded in the history before it runs and its wall-clock
    /// run time is filled in afterwards. Errors that only concern this line
    /// are reported and become its status; a fatal error is returned.
    pub fn dispatch_with_output(
        &mut self,
        line: &str,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
    ) -> Result<ExitCode, ShellError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(0);
        }
        if let Err(e) = parser::validate_line(line) {
            return settle(&self.session.console, Err(e));
        }

        self.dispatched += 1;
        let number = self.dispatched;
        self.session.history.record(HistoryEntry::new(number, line));

        let started = Instant::now();
        let result = self.session.execute(line, stdin, stdout, 0);
        self.session.history.backfill(number, started.elapsed());

        let result = settle(&self.session.console, result);
        if result.is_err() {
            self.session.console.line(format_args!("{FATAL_MESSAGE}"))?;
        }
        result
    }

    /// Interactive prompt loop.
    ///
    /// Reads lines until `exit` or end of input. Ctrl-C at the prompt is
    /// ignored. Returns an error only when a fatal error ends the shell.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new()?;

        loop {
            let readline = rl.readline(&format!("[{}] $ ", self.dispatched));
            match readline {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line.split_whitespace().next() == Some("exit") {
                        break;
                    }
                    rl.add_history_entry(line)?;
                    self.dispatch(line)?;
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    /// An interpreter running in the environment captured from this process.
    fn default() -> Self {
        Self::new(Environment::new())
    }
}
