//! Classification of a raw command line.
//!
//! A line is split at the first operator found scanning left to right. Only
//! one operator per line is recognised; everything after it belongs to the
//! right-hand operand verbatim.

use crate::error::ShellError;
use std::fmt;

/// Longest accepted command line, in characters.
pub const MAX_LINE_LEN: usize = 511;

/// Operator that joins the two halves of a [`Split`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Output redirection (`>`): writes standard output to a file, **truncating** it first.
    TruncateRedirect,
    /// Output redirection with append (`>>`): writes standard output to the end of a file.
    AppendRedirect,
    /// Input redirection (`<`): reads standard input from a file.
    InputRedirect,
    /// The pipe operator (`|`).
    Pipe,
    /// Run the right side only when the left side succeeded (`&&`).
    And,
    /// Run the right side only when the left side failed (`||`).
    Or,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::TruncateRedirect => ">",
            Operator::AppendRedirect => ">>",
            Operator::InputRedirect => "<",
            Operator::Pipe => "|",
            Operator::And => "&&",
            Operator::Or => "||",
        }
    }

    /// Redirect operators take a file name on the right, not a command.
    pub fn is_redirect(self) -> bool {
        matches!(
            self,
            Operator::TruncateRedirect | Operator::AppendRedirect | Operator::InputRedirect
        )
    }
}

/// A command line decomposed into an operator and its operands.
///
/// Without an operator `left` holds the whole (trimmed) line and `right` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub operator: Option<Operator>,
    pub left: String,
    /// File name for redirects, command line for pipes and chains.
    pub right: String,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Some(op) => write!(f, "{} {} {}", self.left, op.symbol(), self.right),
            None => write!(f, "{}", self.left),
        }
    }
}

/// Which form of the `history` built-in a line invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryCommand {
    /// `history`: list the retained entries.
    List,
    /// `!text`: re-run the newest command starting with `text`.
    Prefix(String),
    /// `!N`: re-run the command with sequence number `N`.
    ///
    /// Numbers too large to represent are stored as 0, which never matches.
    Number(u64),
}

/// Reject lines the shell cannot carry through to a program.
pub fn validate_line(line: &str) -> Result<(), ShellError> {
    if line.chars().count() > MAX_LINE_LEN {
        return Err(ShellError::LineTooLong {
            limit: MAX_LINE_LEN,
        });
    }
    if line.contains('\0') {
        return Err(ShellError::EmbeddedNul);
    }
    Ok(())
}

/// Split `line` at its first operator.
///
/// Two-character operators win over their one-character prefix (`>>` over
/// `>`, `||` over `|`). A lone `&` is not an operator and stays part of the
/// text. Whitespace around both operands is dropped.
pub fn split_command(line: &str) -> Split {
    let mut chars = line.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        let next = chars.peek().map(|&(_, next)| next);
        let (operator, width) = match (c, next) {
            ('>', Some('>')) => (Operator::AppendRedirect, 2),
            ('>', _) => (Operator::TruncateRedirect, 1),
            ('<', _) => (Operator::InputRedirect, 1),
            ('|', Some('|')) => (Operator::Or, 2),
            ('|', _) => (Operator::Pipe, 1),
            ('&', Some('&')) => (Operator::And, 2),
            _ => continue,
        };
        return Split {
            operator: Some(operator),
            left: line[..start].trim().to_string(),
            right: line[start + width..].trim().to_string(),
        };
    }

    Split {
        operator: None,
        left: line.trim().to_string(),
        right: String::new(),
    }
}

/// Whether the line invokes the `cd` built-in.
pub fn is_cd(line: &str) -> bool {
    line.split_whitespace().next() == Some("cd")
}

/// Classify a line as one of the history built-in forms, if it is one.
pub fn is_history(line: &str) -> Option<HistoryCommand> {
    let line = line.trim();
    if line.split_whitespace().next() == Some("history") {
        return Some(HistoryCommand::List);
    }

    let key = line.strip_prefix('!')?;
    if key.starts_with(|c: char| c.is_ascii_digit()) {
        let digits: String = key.chars().take_while(|c| c.is_ascii_digit()).collect();
        Some(HistoryCommand::Number(digits.parse().unwrap_or(0)))
    } else {
        Some(HistoryCommand::Prefix(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(op: Option<Operator>, left: &str, right: &str) -> Split {
        Split {
            operator: op,
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    #[test]
    fn test_plain_command_has_no_operator() {
        assert_eq!(split_command("ls -la /tmp"), split(None, "ls -la /tmp", ""));
    }

    #[test]
    fn test_each_operator_is_recognised() {
        let cases = [
            ("echo hi > out.txt", Operator::TruncateRedirect, "echo hi", "out.txt"),
            ("echo hi >> out.txt", Operator::AppendRedirect, "echo hi", "out.txt"),
            ("wc -l < in.txt", Operator::InputRedirect, "wc -l", "in.txt"),
            ("ls | wc -l", Operator::Pipe, "ls", "wc -l"),
            ("true && echo yes", Operator::And, "true", "echo yes"),
            ("false || echo no", Operator::Or, "false", "echo no"),
        ];
        for (line, op, left, right) in cases {
            assert_eq!(split_command(line), split(Some(op), left, right), "{line}");
        }
    }

    #[test]
    fn test_operator_without_spaces() {
        assert_eq!(
            split_command("echo hi>>log"),
            split(Some(Operator::AppendRedirect), "echo hi", "log")
        );
    }

    #[test]
    fn test_first_operator_wins() {
        // the right side keeps the second operator untouched
        assert_eq!(
            split_command("cat a.txt | grep x > out"),
            split(Some(Operator::Pipe), "cat a.txt", "grep x > out")
        );
        assert_eq!(
            split_command("sort < in > out"),
            split(Some(Operator::InputRedirect), "sort", "in > out")
        );
    }

    #[test]
    fn test_lone_ampersand_is_not_an_operator() {
        assert_eq!(
            split_command("echo a & b"),
            split(None, "echo a & b", "")
        );
    }

    #[test]
    fn test_operator_detection_applies_to_builtins() {
        let s = split_command("cd /tmp > out");
        assert_eq!(s.operator, Some(Operator::TruncateRedirect));
        assert_eq!(s.left, "cd /tmp");
    }

    #[test]
    fn test_split_rejoin_keeps_meaning() {
        for line in [
            "ls -a | wc -l",
            "echo one   >   file",
            "make && ./run",
            "test -d x || mkdir x",
            "pwd",
        ] {
            let first = split_command(line);
            let again = split_command(&first.to_string());
            assert_eq!(first, again, "{line}");
        }
    }

    #[test]
    fn test_is_cd_checks_first_word() {
        assert!(is_cd("cd"));
        assert!(is_cd("cd /tmp"));
        assert!(is_cd("  cd .."));
        assert!(!is_cd("cdrecord -v"));
        assert!(!is_cd("echo cd"));
    }

    #[test]
    fn test_is_history_forms() {
        assert_eq!(is_history("history"), Some(HistoryCommand::List));
        assert_eq!(is_history("!12"), Some(HistoryCommand::Number(12)));
        assert_eq!(is_history("!3abc"), Some(HistoryCommand::Number(3)));
        assert_eq!(
            is_history("!ls -l"),
            Some(HistoryCommand::Prefix("ls -l".to_string()))
        );
        assert_eq!(is_history("!"), Some(HistoryCommand::Prefix(String::new())));
        assert_eq!(is_history("ls !1"), None);
        assert_eq!(is_history("historyx"), None);
    }

    #[test]
    fn test_huge_recall_number_never_matches() {
        assert_eq!(
            is_history("!99999999999999999999999"),
            Some(HistoryCommand::Number(0))
        );
    }

    #[test]
    fn test_validate_line_limits() {
        assert!(validate_line(&"a".repeat(MAX_LINE_LEN)).is_ok());
        assert!(matches!(
            validate_line(&"a".repeat(MAX_LINE_LEN + 1)),
            Err(ShellError::LineTooLong { limit: MAX_LINE_LEN })
        ));
        assert!(matches!(
            validate_line("echo a\0b"),
            Err(ShellError::EmbeddedNul)
        ));
    }
}
