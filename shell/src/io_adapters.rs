use std::fmt;
use std::io::{self, Result as IoResult, Write};
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

/// Where the shell writes its own status lines ("UNIX command ls", ...).
///
/// Kept apart from the command's stdout so a redirect or pipe never captures
/// them. Clones share one sink, so child contexts on other threads write to
/// the same place.
#[derive(Clone)]
pub struct Console {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// The shell process's own standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Write one status line.
    pub fn line(&self, args: fmt::Arguments<'_>) -> IoResult<()> {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        sink.write_fmt(args)?;
        sink.write_all(b"\n")?;
        sink.flush()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// Memory-backed writer for capturing the output of built-ins.
///
/// Clones share one buffer. External programs cannot write into memory, so
/// handing this writer to one of them discards its output.
#[derive(Clone, Default)]
pub struct MemWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemWriter {
    /// Public constructor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Convenience for tests and callers expecting text output.
    pub fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl crate::command::Stdout for MemWriter {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::null()
    }

    fn try_clone(&self) -> IoResult<Box<dyn crate::command::Stdout>> {
        Ok(Box::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let writer = MemWriter::new();
        let mut other = writer.clone();
        write!(other, "shared").unwrap();
        assert_eq!(writer.contents_lossy(), "shared");
    }

    #[test]
    fn test_console_lines_end_with_newline() {
        let sink = MemWriter::new();
        let console = Console::new(sink.clone());
        console.line(format_args!("UNIX command {}", "ls")).unwrap();
        console.clone().line(format_args!("done")).unwrap();
        assert_eq!(sink.contents_lossy(), "UNIX command ls\ndone\n");
    }
}
