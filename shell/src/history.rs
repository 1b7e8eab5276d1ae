//! Bounded, insertion-ordered record of the commands the shell dispatched.

use crate::parser::HistoryCommand;
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

/// Number of entries retained; recording past it evicts the oldest.
pub const HISTORY_CAPACITY: usize = 10;

/// One dispatched command line.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub number: u64,
    pub elapsed: Duration,
    pub command: String,
}

impl HistoryEntry {
    /// A fresh entry whose elapsed time is filled in once the command finishes.
    pub fn new(number: u64, command: impl Into<String>) -> Self {
        Self {
            number,
            elapsed: Duration::ZERO,
            command: command.into(),
        }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:.6} seconds] {}",
            self.number,
            self.elapsed.as_secs_f64(),
            self.command
        )
    }
}

/// Oldest-first FIFO of at most [`HISTORY_CAPACITY`] entries.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append `entry`, evicting the oldest one when the store is full.
    pub fn record(&mut self, entry: HistoryEntry) {
        if self.entries.len() == HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Store the measured run time of entry `number`, if it is still retained.
    pub fn backfill(&mut self, number: u64, elapsed: Duration) {
        if let Some(entry) = self.entries.iter_mut().rev().find(|e| e.number == number) {
            entry.elapsed = elapsed;
        }
    }

    /// Entries from oldest to newest.
    pub fn list(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the command a recall refers to, scanning newest to oldest.
    ///
    /// [`HistoryCommand::List`] never recalls anything. An empty prefix never
    /// matches.
    pub fn recall(&self, key: &HistoryCommand) -> Option<&str> {
        let mut newest_first = self.entries.iter().rev();
        let found = match key {
            HistoryCommand::List => None,
            HistoryCommand::Number(number) => newest_first.find(|e| e.number == *number),
            HistoryCommand::Prefix(prefix) if prefix.is_empty() => None,
            HistoryCommand::Prefix(prefix) => {
                newest_first.find(|e| e.command.starts_with(prefix.as_str()))
            }
        };
        found.map(|e| e.command.as_str())
    }

    /// Write one line per entry, oldest first.
    pub fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        for entry in self.list() {
            writeln!(out, "{entry}")?;
        }
        Ok(())
    }
}
