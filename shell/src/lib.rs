//! A small line-oriented command interpreter.
//!
//! Each input line is classified and dispatched to one of: the `cd` built-in,
//! the `history` built-in and its `!N` / `!prefix` recall forms, a file
//! redirect (`>`, `>>`, `<`), a two-stage pipe (`|`), a conditional chain
//! (`&&`, `||`) or a plain external program. Only the first operator on a
//! line is recognised.
//!
//! The main entry point is [`Interpreter`], which owns the shell state and a
//! bounded [`history::HistoryStore`] of the last ten lines it dispatched.
//! The public modules [`parser`] and [`lexer`] expose the line classifier and
//! the argument builder on their own.

mod builtin;
pub mod command;
pub mod env;
pub mod error;
mod external;
pub mod history;
mod interpreter;
mod io_adapters;
pub mod lexer;
mod orchestrator;
pub mod parser;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::{Interpreter, MAX_RECALL_DEPTH, Session, ignore_interrupts};

pub use command::ExitCode;
pub use env::Environment;
pub use error::ShellError;
pub use io_adapters::{Console, MemWriter};
