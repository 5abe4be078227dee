//! Diagnostic module - Error reporting records and rendering.
//!
//! This module provides the [`Diagnostic`] record that lexer and parser
//! errors convert into, plus rendering against the original source text
//! so template authors see the offending line with a caret underline.
//!
//! # Examples
//!
//! ```
//! use weftc_util::diagnostic::{Diagnostic, Level};
//! use weftc_util::span::Span;
//!
//! let diag = Diagnostic::error("unexpected token ','", Span::new(4, 5, 1, 5))
//!     .with_help("remove the trailing comma");
//! let rendered = diag.render("1 + ,");
//! assert!(rendered.contains("error: unexpected token ','"));
//! assert!(rendered.contains("1:5"));
//! ```

use crate::span::Span;
use std::fmt;

/// Diagnostic severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that aborts parsing
    Error,
    /// A warning that does not abort parsing
    Warning,
    /// Additional information about a diagnostic
    Note,
    /// A suggestion for fixing an issue
    Help,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
            Level::Help => write!(f, "help"),
        }
    }
}

/// A diagnostic message with severity and location
///
/// # Examples
///
/// ```
/// use weftc_util::diagnostic::{Diagnostic, Level};
/// use weftc_util::span::Span;
///
/// let diag = Diagnostic::error("something went wrong", Span::DUMMY);
/// assert_eq!(diag.level, Level::Error);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    /// Diagnostic severity level
    pub level: Level,
    /// Main diagnostic message
    pub message: String,
    /// Source location
    pub span: Span,
    /// Help suggestions for fixing the issue
    pub helps: Vec<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            helps: Vec::new(),
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Warning, message, span)
    }

    /// Add a help suggestion
    ///
    /// # Examples
    ///
    /// ```
    /// use weftc_util::diagnostic::Diagnostic;
    /// use weftc_util::span::Span;
    ///
    /// let diag = Diagnostic::error("disallowed key", Span::DUMMY)
    ///     .with_help("quote the key");
    /// assert_eq!(diag.helps, vec!["quote the key"]);
    /// ```
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.helps.push(help.into());
        self
    }

    /// Render the diagnostic against the source it was produced from.
    ///
    /// Produces the severity and message, the `line:column` anchor, the
    /// offending source line, and a caret underline covering the span
    /// (clamped to the line). Help suggestions follow on `= help:` lines.
    pub fn render(&self, source: &str) -> String {
        let mut out = format!("{}: {}\n", self.level, self.message);

        let line_no = self.span.line.max(1);
        let column = self.span.column.max(1);
        out.push_str(&format!(" --> {}:{}\n", line_no, column));

        if let Some(line_text) = source.lines().nth(line_no as usize - 1) {
            out.push_str(&format!("  |\n{} | {}\n", line_no, line_text));

            let pad = " ".repeat(column as usize - 1);
            let line_chars = line_text.chars().count();
            let width = self
                .span
                .len()
                .max(1)
                .min(line_chars.saturating_sub(column as usize - 1).max(1));
            out.push_str(&format!("  | {}{}\n", pad, "^".repeat(width)));
        }

        for help in &self.helps {
            out.push_str(&format!("  = help: {}\n", help));
        }

        out
    }
}
