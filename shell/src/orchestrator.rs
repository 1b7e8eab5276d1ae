//! Process orchestration for lines that carry an operator.
//!
//! Each operand is dispatched again, recursively, inside a child context: a
//! snapshot of the [`Session`] that behaves like a forked shell. Nothing a
//! child context does to its environment or history reaches the parent, and
//! a fatal error inside one only ends that child with status 1.

use crate::command::{ExitCode, Stdin, Stdout};
use crate::error::ShellError;
use crate::interpreter::{Session, settle_child};
use crate::parser::{Operator, Split};
use log::{debug, error};
use nix::fcntl::OFlag;
use nix::unistd;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::thread::{self, ScopedJoinHandle};

impl Session {
    /// Run `split.left` with one standard stream replaced by the file `split.right`.
    ///
    /// The file is opened before anything runs; failing to open it is fatal.
    pub(crate) fn redirect(
        &self,
        operator: Operator,
        split: &Split,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        depth: usize,
    ) -> Result<ExitCode, ShellError> {
        if split.right.is_empty() {
            return Err(ShellError::MissingTarget);
        }
        let path = self.env.resolve(&split.right);
        let file = open_target(operator, &path).map_err(|source| {
            error!("cannot open {} for {}: {}", path.display(), operator.symbol(), source);
            ShellError::Redirect {
                path: path.clone(),
                source,
            }
        })?;

        let mut child = self.subshell();
        let result = match operator {
            Operator::InputRedirect => child.execute(&split.left, Box::new(file), stdout, depth),
            _ => child.execute(&split.left, stdin, Box::new(file), depth),
        };
        settle_child(&self.console, result)
    }

    /// Connect the output of `split.left` to the input of `split.right`.
    ///
    /// Both sides run at the same time, each in its own child context on a
    /// scoped thread, and are joined in creation order. The status of the
    /// pipe is the status of the right side.
    pub(crate) fn pipe(
        &self,
        split: &Split,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        depth: usize,
    ) -> Result<ExitCode, ShellError> {
        let (reader, writer) = anonymous_pipe()?;
        let mut writer_side = self.subshell();
        let mut reader_side = self.subshell();

        thread::scope(|scope| {
            let left = scope.spawn(move || {
                let result = writer_side.execute(&split.left, stdin, Box::new(writer), depth);
                settle_child(&writer_side.console, result)
            });
            let right = scope.spawn(move || {
                let result = reader_side.execute(&split.right, Box::new(reader), stdout, depth);
                settle_child(&reader_side.console, result)
            });

            let left_code = join(left)?;
            let right_code = join(right)?;
            debug!("pipe sides exited with {left_code} and {right_code}");
            Ok(right_code)
        })
    }

    /// Run `split.left`, then `split.right` if the left status allows it.
    ///
    /// `&&` continues on status 0, `||` on any other status. The chain yields
    /// the status of the last command that ran.
    pub(crate) fn chain(
        &self,
        operator: Operator,
        split: &Split,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        depth: usize,
    ) -> Result<ExitCode, ShellError> {
        let mut child = self.subshell();
        let result = child.execute(&split.left, stdin.try_clone()?, stdout.try_clone()?, depth);
        let left_code = settle_child(&self.console, result)?;

        let run_right = match operator {
            Operator::And => left_code == 0,
            _ => left_code != 0,
        };
        if !run_right {
            debug!("{} short-circuited with {}", operator.symbol(), left_code);
            return Ok(left_code);
        }
        let result = child.execute(&split.right, stdin, stdout, depth);
        settle_child(&self.console, result)
    }
}

fn open_target(operator: Operator, path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    match operator {
        Operator::TruncateRedirect => options.write(true).create(true).truncate(true),
        Operator::AppendRedirect => options.append(true).create(true),
        _ => options.read(true),
    };
    options.mode(0o644).open(path)
}

/// Both ends are close-on-exec; a child only keeps the end installed as its stdio.
fn anonymous_pipe() -> Result<(File, File), ShellError> {
    let (read_end, write_end) = unistd::pipe2(OFlag::O_CLOEXEC).map_err(io::Error::from)?;
    Ok((File::from(read_end), File::from(write_end)))
}

fn join(handle: ScopedJoinHandle<'_, Result<ExitCode, ShellError>>) -> Result<ExitCode, ShellError> {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}
