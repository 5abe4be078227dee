//! Lexical error types.
//!
//! A [`LexError`] carries the span of the offending input and a
//! deterministic message. The first lexical error aborts tokenization;
//! there is no recovery.

use thiserror::Error;
use weftc_util::{Diagnostic, Span};

/// An error produced while tokenizing expression source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// A string literal ran into a raw newline or the end of input.
    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    /// An escape sequence inside a string literal is not recognized.
    #[error("invalid escape sequence '\\{escape}'")]
    BadEscape { escape: String, span: Span },

    /// A numeric literal is malformed (bad hex digits, missing exponent
    /// digits, trailing identifier characters, or out-of-range value).
    #[error("malformed number literal '{literal}'")]
    BadNumber { literal: String, span: Span },

    /// A character that cannot start any token.
    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char, span: Span },
}

impl LexError {
    /// The span of the offending input.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnterminatedString { span }
            | LexError::BadEscape { span, .. }
            | LexError::BadNumber { span, .. }
            | LexError::UnexpectedChar { span, .. } => *span,
        }
    }

    /// Byte offset where the error begins.
    pub fn offset(&self) -> usize {
        self.span().start
    }

    /// Convert into a renderable diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string(), self.span())
    }
}
