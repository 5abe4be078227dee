//! Parse error types.
//!
//! A [`ParseError`] carries the span of the offending (lookahead) token
//! and a deterministic message. Any error at any depth aborts the active
//! entry point and bubbles to the caller; there is no recovery and no
//! partial AST.

use thiserror::Error;
use weftc_lex::LexError;
use weftc_util::{Diagnostic, Span};

/// An error produced while parsing an expression form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The lexer rejected the input before the grammar was consulted.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A token that cannot appear in the current position.
    #[error("unexpected token {found}")]
    UnexpectedToken { found: String, span: Span },

    /// A specific construct was required but something else was found.
    #[error("expected {expected}, found {found}")]
    Expected {
        expected: String,
        found: String,
        span: Span,
    },

    /// The reserved identifier `ij` used as a variable or base key.
    #[error("Invalid param name 'ij'")]
    ReservedIj { span: Span },

    /// An unquoted single identifier used as a map-literal key.
    #[error("Disallowed single-identifier key '{key}' in map literal")]
    DisallowedMapKey { key: String, span: Span },

    /// The entry point's form was parsed but input remained.
    #[error("unexpected trailing input: {found}")]
    TrailingInput { found: String, span: Span },
}

impl ParseError {
    /// The span of the offending input.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(err) => err.span(),
            ParseError::UnexpectedToken { span, .. }
            | ParseError::Expected { span, .. }
            | ParseError::ReservedIj { span }
            | ParseError::DisallowedMapKey { span, .. }
            | ParseError::TrailingInput { span, .. } => *span,
        }
    }

    /// Byte offset of the offending token.
    pub fn offset(&self) -> usize {
        self.span().start
    }

    /// Convert into a renderable diagnostic.
    ///
    /// The disallowed-map-key error carries the two accepted rewrites as
    /// help suggestions.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string(), self.span());
        match self {
            ParseError::DisallowedMapKey { key, .. } => diag
                .with_help(format!("use single quotes for a string key: '{}'", key))
                .with_help(format!("use parentheses to reference a global: ({})", key)),
            _ => diag,
        }
    }
}
