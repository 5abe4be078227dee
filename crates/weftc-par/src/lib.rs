//! weftc-par - Parser for Weft Template Expressions
//!
//! This crate recognizes the expression grammar by recursive descent with
//! Pratt-style binding powers for the binary operators, and builds the
//! typed AST defined in [`ast`]. It exposes five entry points, one per
//! top-level form; each fully consumes its input and returns an
//! [`ExprRoot`] (or a sequence of them).
//!
//! # Grammar
//!
//! ```ebnf
//! expression  = ternary ;
//! ternary     = binary [ "?" ternary ":" ternary ] ;
//! binary      = prefix { binop prefix } ;              (* precedence climbing *)
//! prefix      = "(" expression ")"
//!             | ("-" | "not") prefix
//!             | ident "(" [ expression { "," expression } ] ")"
//!             | dataref
//!             | ident { dotident }                      (* global *)
//!             | "[" ... "]"                             (* list or map *)
//!             | literal ;
//! dataref     = ( "$ij." ident | dollarident ) { dotident | dotindex | "[" expression "]" } ;
//! list        = "[" [ expression { "," expression } [ "," ] ] "]" ;
//! map         = "[" ( ":" | entry { "," entry } [ "," ] ) "]" ;
//! entry       = expression ":" expression ;
//! ```
//!
//! # Operator precedence (lowest to highest)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 | `? :` | Right |
//! | 2 | `or` | Left |
//! | 3 | `and` | Left |
//! | 4 | `==`, `!=` | Left |
//! | 5 | `<`, `>`, `<=`, `>=` | Left |
//! | 6 | `+`, `-` | Left |
//! | 7 | `*`, `/`, `%` | Left |
//! | 8 | unary `-`, `not` | Prefix |
//!
//! # Grammar-level restrictions
//!
//! Two spellings are rejected with dedicated errors rather than general
//! token mismatches: the reserved identifier `ij` as a variable or base
//! key (`Invalid param name 'ij'`), and an unquoted single identifier as
//! a map-literal key (which would otherwise be ambiguous with a
//! single-identifier global).
//!
//! # Example
//!
//! ```
//! use weftc_par::{parse_expression, ast::{BinOp, Expr}};
//!
//! let root = parse_expression("1 + 2 * 3").unwrap();
//! match root.child() {
//!     Expr::Binary(b) => assert_eq!(b.op, BinOp::Add),
//!     other => panic!("expected binary expression, got {:?}", other),
//! }
//! ```

pub mod ast;
pub mod error;
mod expr;

mod edge_cases;

pub use ast::ExprRoot;
pub use error::ParseError;

use ast::{Expr, VarExpr};
use weftc_lex::{tokenize, Token, TokenSpan};
use weftc_util::Span;

/// Recursive descent parser over a pre-lexed token stream.
///
/// The parser owns its token vector and a cursor position; lookahead is
/// positional indexing and never re-lexes. Independent instances are
/// independent; a parser is consumed by one entry-point call.
pub(crate) struct Parser {
    /// Token stream, always terminated by `Eof`.
    tokens: Vec<TokenSpan>,

    /// Current position in the token stream.
    position: usize,
}

impl Parser {
    /// Create a new parser from tokens.
    fn new(tokens: Vec<TokenSpan>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Current token with its span; `Eof` past the end.
    fn current_ts(&self) -> TokenSpan {
        match self.tokens.get(self.position) {
            Some(ts) => *ts,
            None => {
                let span = self.tokens.last().map(|ts| ts.span).unwrap_or(Span::DUMMY);
                TokenSpan::new(Token::Eof, span)
            }
        }
    }

    /// Current token kind.
    fn current(&self) -> Token {
        self.current_ts().token
    }

    /// Span of the current token.
    fn current_span(&self) -> Span {
        self.current_ts().span
    }

    /// Token kind `offset` positions ahead.
    fn peek(&self, offset: usize) -> Token {
        match self.tokens.get(self.position + offset) {
            Some(ts) => ts.token,
            None => Token::Eof,
        }
    }

    /// Consume and return the current token.
    fn advance(&mut self) -> TokenSpan {
        let ts = self.current_ts();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        ts
    }

    /// Consume the current token if it matches.
    fn match_token(&mut self, expected: Token) -> bool {
        if self.current() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a specific token or fail with an expectation error.
    fn expect(&mut self, expected: Token, what: &str) -> Result<TokenSpan, ParseError> {
        if self.current() == expected {
            Ok(self.advance())
        } else {
            Err(ParseError::Expected {
                expected: what.to_string(),
                found: self.current().to_string(),
                span: self.current_span(),
            })
        }
    }

    /// Require end of input after a fully parsed form.
    fn expect_eof(&self) -> Result<(), ParseError> {
        match self.current() {
            Token::Eof => Ok(()),
            other => Err(ParseError::TrailingInput {
                found: other.to_string(),
                span: self.current_span(),
            }),
        }
    }
}

/// Parses a single expression, requiring end of input after it.
///
/// # Example
///
/// ```
/// use weftc_par::parse_expression;
///
/// assert!(parse_expression("not $done and $count > 0").is_ok());
/// assert!(parse_expression("1 +").is_err());
/// ```
pub fn parse_expression(source: &str) -> Result<ExprRoot, ParseError> {
    let mut parser = Parser::new(tokenize(source)?);
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(ExprRoot::new(expr))
}

/// Parses a comma-separated list of one or more expressions.
///
/// A trailing comma is not permitted, and the list may not be empty.
///
/// # Example
///
/// ```
/// use weftc_par::parse_expression_list;
///
/// let roots = parse_expression_list("$a, 1 + 2, 'x'").unwrap();
/// assert_eq!(roots.len(), 3);
/// ```
pub fn parse_expression_list(source: &str) -> Result<Vec<ExprRoot>, ParseError> {
    let mut parser = Parser::new(tokenize(source)?);

    let mut roots = vec![ExprRoot::new(parser.parse_expr()?)];
    while parser.match_token(Token::Comma) {
        roots.push(ExprRoot::new(parser.parse_expr()?));
    }

    parser.expect_eof()?;
    Ok(roots)
}

/// Parses a single variable `$name`, requiring end of input after it.
///
/// The reserved name `ij` is rejected.
pub fn parse_variable(source: &str) -> Result<ExprRoot, ParseError> {
    let mut parser = Parser::new(tokenize(source)?);

    let expr = match parser.current() {
        Token::DollarIdent(name) => {
            if name.as_str() == "ij" {
                return Err(ParseError::ReservedIj {
                    span: parser.current_span(),
                });
            }
            let ts = parser.advance();
            Expr::Var(VarExpr {
                name,
                span: ts.span,
            })
        }
        other => {
            return Err(ParseError::Expected {
                expected: "a variable".to_string(),
                found: other.to_string(),
                span: parser.current_span(),
            })
        }
    };

    parser.expect_eof()?;
    Ok(ExprRoot::new(expr))
}

/// Parses a data reference, requiring end of input after it.
pub fn parse_data_reference(source: &str) -> Result<ExprRoot, ParseError> {
    let mut parser = Parser::new(tokenize(source)?);
    let expr = parser.parse_data_ref()?;
    parser.expect_eof()?;
    Ok(ExprRoot::new(expr))
}

/// Parses a dotted global name, requiring end of input after it.
///
/// The produced [`ast::GlobalExpr`] carries the full dotted name joined
/// verbatim: `"a.b.c"`.
pub fn parse_global(source: &str) -> Result<ExprRoot, ParseError> {
    let mut parser = Parser::new(tokenize(source)?);

    let expr = match parser.current() {
        Token::Ident(name) => {
            let ts = parser.advance();
            parser.parse_global_tail(name, ts.span)
        }
        other => {
            return Err(ParseError::Expected {
                expected: "a global name".to_string(),
                found: other.to_string(),
                span: parser.current_span(),
            })
        }
    };

    parser.expect_eof()?;
    Ok(ExprRoot::new(expr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;

    #[test]
    fn test_parse_expression_consumes_input() {
        assert!(parse_expression("1 + 2").is_ok());
        let err = parse_expression("1 + 2 3").unwrap_err();
        assert!(matches!(err, ParseError::TrailingInput { .. }));
        assert_eq!(err.offset(), 6);
    }

    #[test]
    fn test_parse_expression_list_counts() {
        assert_eq!(parse_expression_list("1").unwrap().len(), 1);
        assert_eq!(parse_expression_list("1, 2, 3").unwrap().len(), 3);
    }

    #[test]
    fn test_parse_expression_list_rejects_trailing_comma() {
        let err = parse_expression_list("1, 2,").unwrap_err();
        assert!(matches!(err, ParseError::Expected { .. }));
    }

    #[test]
    fn test_parse_expression_list_rejects_empty() {
        assert!(parse_expression_list("").is_err());
        assert!(parse_expression_list(", 1").is_err());
    }

    #[test]
    fn test_parse_variable() {
        let root = parse_variable("$foo").unwrap();
        match root.child() {
            Expr::Var(v) => assert_eq!(v.name.as_str(), "foo"),
            other => panic!("expected variable, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_variable_rejects_ij() {
        let err = parse_variable("$ij").unwrap_err();
        assert!(matches!(err, ParseError::ReservedIj { .. }));
        assert_eq!(err.to_string(), "Invalid param name 'ij'");
    }

    #[test]
    fn test_parse_variable_rejects_non_variables() {
        assert!(parse_variable("foo").is_err());
        assert!(parse_variable("$a.b").is_err()); // trailing access
        assert!(parse_variable("1").is_err());
    }

    #[test]
    fn test_parse_global_joins_dotted_name() {
        let root = parse_global("some.global.name").unwrap();
        match root.child() {
            Expr::Global(g) => assert_eq!(g.name.as_str(), "some.global.name"),
            other => panic!("expected global, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_single_segment() {
        let root = parse_global("GLOBAL_CONST").unwrap();
        match root.child() {
            Expr::Global(g) => assert_eq!(g.name.as_str(), "GLOBAL_CONST"),
            other => panic!("expected global, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_rejects_calls_and_vars() {
        assert!(matches!(
            parse_global("foo(1)").unwrap_err(),
            ParseError::TrailingInput { .. }
        ));
        assert!(parse_global("$foo").is_err());
    }

    #[test]
    fn test_entry_points_surface_lex_errors() {
        assert!(matches!(
            parse_expression("0x1a").unwrap_err(),
            ParseError::Lex(_)
        ));
        assert!(matches!(
            parse_variable("$ foo").unwrap_err(),
            ParseError::Lex(_)
        ));
    }

    #[test]
    fn test_root_wrapper_round_trip() {
        let mut root = parse_expression("42").unwrap();
        let replacement = parse_expression("43").unwrap().into_child();
        let old = root.replace(replacement);
        match old {
            Expr::Literal(lit) => assert_eq!(lit.value, Literal::Int(42)),
            other => panic!("expected literal, got {:?}", other),
        }
        match root.child() {
            Expr::Literal(lit) => assert_eq!(lit.value, Literal::Int(43)),
            other => panic!("expected literal, got {:?}", other),
        }
    }
}
