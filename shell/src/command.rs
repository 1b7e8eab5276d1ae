use std::fs::File;
use std::io::{self, Read, Write};
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Abstraction over a readable input stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// Implementors wrap the shell's own standard input, a redirect source file or
/// the read end of a pipe. Streams are `Send` so a pipe side can run on its own
/// thread.
pub trait Stdin: Read + Send {
    /// Convert this input into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;

    /// Duplicate the handle so two commands of a chain can share it.
    fn try_clone(&self) -> io::Result<Box<dyn Stdin>>;
}

/// Abstraction over a writable output stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
pub trait Stdout: Write + Send {
    /// Convert this output into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;

    /// Duplicate the handle so two commands of a chain can share it.
    fn try_clone(&self) -> io::Result<Box<dyn Stdout>>;
}

impl Stdin for File {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }

    fn try_clone(&self) -> io::Result<Box<dyn Stdin>> {
        Ok(Box::new(File::try_clone(self)?))
    }
}

impl Stdout for File {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }

    fn try_clone(&self) -> io::Result<Box<dyn Stdout>> {
        Ok(Box::new(File::try_clone(self)?))
    }
}

impl Stdout for io::Stdout {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }

    fn try_clone(&self) -> io::Result<Box<dyn Stdout>> {
        Ok(Box::new(io::stdout()))
    }
}

/// The shell's own standard input, handed to children unchanged.
pub struct InheritedStdin(io::Stdin);

impl InheritedStdin {
    pub fn new() -> Self {
        Self(io::stdin())
    }
}

impl Default for InheritedStdin {
    fn default() -> Self {
        Self::new()
    }
}

impl Read for InheritedStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Stdin for InheritedStdin {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }

    fn try_clone(&self) -> io::Result<Box<dyn Stdin>> {
        Ok(Box::new(InheritedStdin::new()))
    }
}
