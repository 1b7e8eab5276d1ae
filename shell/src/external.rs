use crate::command::{ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::error::ShellError;
use crate::io_adapters::Console;
use crate::lexer::Argv;
use log::{debug, warn};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Run a program and block until it terminates.
///
/// The program is resolved through `PATH` (see [`find_command_path`]) and
/// started in `env.current_dir` with `env.vars` exported. A program that
/// cannot be found or started is reported on `console` as
/// `<name>: command not found` and counts as status 0, exactly like a child
/// whose exec failed and exited cleanly.
pub fn spawn_plain(
    argv: &Argv,
    stdin: Box<dyn Stdin>,
    stdout: Box<dyn Stdout>,
    env: &Environment,
    console: &Console,
) -> Result<ExitCode, ShellError> {
    let search_paths = env.get_var("PATH").unwrap_or_default();
    let program = match find_command_path(
        OsStr::new(&search_paths),
        &env.current_dir,
        Path::new(argv.program()),
    ) {
        Some(program) => program.into_owned(),
        None => return command_not_found(argv, console),
    };

    debug!("spawning {} {:?}", program.display(), argv.args());
    let spawned = Command::new(&program)
        .arg0(argv.program())
        .args(argv.args())
        .stdin(stdin.stdio())
        .stdout(stdout.stdio())
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir)
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            warn!("failed to start {}: {}", program.display(), e);
            return command_not_found(argv, console);
        }
    };

    let exit_status = child.wait()?;
    debug!("{} exited with {}", program.display(), exit_status);
    match exit_status.code() {
        Some(x) => Ok(x),
        None => Ok(terminated_by_signal(exit_status)),
    }
}

fn command_not_found(argv: &Argv, console: &Console) -> Result<ExitCode, ShellError> {
    console.line(format_args!("{}: command not found", argv.program()))?;
    Ok(0)
}

fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it names an executable file.
/// - `./foo` or a relative path with multiple components (e.g., `bin/sh`):
///   resolved against `current_dir`, returned if it names an executable file.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first executable match. Relative PATH entries are taken
///   relative to `current_dir`.
/// - Empty path: returns `None`.
pub fn find_command_path<'a>(
    search_paths: &OsStr,
    current_dir: &Path,
    path: &'a Path,
) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => {
            // Empty path -> not found
            None
        }
        (Some(x), None) if !path.starts_with(".") => {
            // Single component -> search in PATH
            find_in_path(search_paths, current_dir, x.as_os_str()).map(Cow::Owned)
        }
        _ => {
            // Multiple components -> search in current dir
            let candidate = current_dir.join(path);
            find_by_path(&candidate).map(|p| Cow::Owned(p.to_path_buf()))
        }
    }
}

fn find_in_path(search_paths: &OsStr, current_dir: &Path, cmd: &OsStr) -> Option<PathBuf> {
    if search_paths.is_empty() {
        return None;
    }
    for dir in std::env::split_paths(search_paths) {
        let path = current_dir.join(dir).join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

/// A regular file with at least one execute bit set.
fn find_by_path(path: &Path) -> Option<&Path> {
    let metadata = fs::metadata(path).ok()?;
    let executable = metadata.permissions().mode() & 0o111 != 0;
    if metadata.is_file() && executable {
        Some(path)
    } else {
        None
    }
}
