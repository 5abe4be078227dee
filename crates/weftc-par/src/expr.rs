//! Expression parsing using Pratt binding powers (top-down operator
//! precedence) over a recursive-descent core.
//!
//! The binary operators all climb inside [`Parser::parse_expr_with_min_bp`];
//! because every binary level is left-associative, the right operand is
//! always parsed with `left_bp + 1`. The ternary sits above the climb and
//! recurses into itself on both branches, which is what makes it
//! right-associative. Unary operators parse their operand at a binding
//! power above every binary level, so they bind tightest.
//!
//! Two grammar decisions need lookahead beyond one token:
//!
//! - `IDENT (` selects a function call over a global name.
//! - Inside `[`, the parser recognizes `]` (empty list) and `:` (empty
//!   map) directly; otherwise it parses one expression and branches on
//!   the next token: `:` continues as a map, anything else as a list.
//!   The first expression is reused, never re-parsed.

use crate::ast::{
    Access, BinOp, BinaryExpr, CallExpr, CondExpr, DataRefExpr, Expr, GlobalExpr, IndexAccess,
    KeyAccess, ListExpr, Literal, LiteralExpr, MapExpr, UnOp, UnaryExpr,
};
use crate::error::ParseError;
use crate::Parser;
use weftc_lex::Token;
use weftc_util::{Span, Symbol};

/// Binding power levels for Pratt parsing.
/// Higher numbers = tighter binding (higher precedence).
pub mod bp {
    /// Minimum binding power (start of expression)
    pub const MIN: u8 = 0;

    /// Logical OR: `or`
    pub const OR: u8 = 2;

    /// Logical AND: `and`
    pub const AND: u8 = 4;

    /// Equality: `==`, `!=`
    pub const EQUALITY: u8 = 6;

    /// Comparison: `<`, `>`, `<=`, `>=`
    pub const COMPARISON: u8 = 8;

    /// Additive: `+`, `-`
    pub const ADDITIVE: u8 = 10;

    /// Multiplicative: `*`, `/`, `%`
    pub const MULTIPLICATIVE: u8 = 12;

    /// Prefix operators: unary `-`, `not`
    pub const UNARY: u8 = 14;
}

impl Parser {
    /// Parse a complete expression (ternary level and below).
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_ternary()
    }

    /// Parse `binary [ '?' ternary ':' ternary ]`.
    ///
    /// Both branches recurse at the ternary level, so `a ? b ? c : d : e`
    /// groups as `a ? (b ? c : d) : e`.
    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_expr_with_min_bp(bp::MIN)?;

        if !self.match_token(Token::Question) {
            return Ok(cond);
        }

        let then_branch = self.parse_ternary()?;
        self.expect(Token::Colon, "':'")?;
        let else_branch = self.parse_ternary()?;

        let span = cond.span().merge(else_branch.span());
        Ok(Expr::Cond(CondExpr {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            span,
        }))
    }

    /// Parse expression with minimum binding power (Pratt core).
    ///
    /// Parses a prefix expression as the left-hand side, then repeatedly
    /// consumes binary operators whose left binding power is at least
    /// `min_bp`, parsing each right operand with the operator's right
    /// binding power (`left + 1`, since all binaries are
    /// left-associative).
    fn parse_expr_with_min_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let (lbp, rbp, op) = match self.infix_binding_power() {
                Some(bp) if bp.0 >= min_bp => bp,
                _ => break,
            };
            debug_assert!(lbp < rbp);
            self.advance();

            let rhs = self.parse_expr_with_min_bp(rbp)?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary(BinaryExpr {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                span,
            });
        }

        Ok(lhs)
    }

    /// Binding powers and operator for the current token, if it is a
    /// binary operator.
    ///
    /// This is only consulted after a completed operand, so `-` here is
    /// always the binary subtraction; the unary reading only occurs in
    /// prefix position.
    fn infix_binding_power(&self) -> Option<(u8, u8, BinOp)> {
        let (lbp, op) = match self.current() {
            Token::Star => (bp::MULTIPLICATIVE, BinOp::Mul),
            Token::Slash => (bp::MULTIPLICATIVE, BinOp::Div),
            Token::Percent => (bp::MULTIPLICATIVE, BinOp::Mod),
            Token::Plus => (bp::ADDITIVE, BinOp::Add),
            Token::Minus => (bp::ADDITIVE, BinOp::Sub),
            Token::Lt => (bp::COMPARISON, BinOp::Lt),
            Token::Gt => (bp::COMPARISON, BinOp::Gt),
            Token::LtEq => (bp::COMPARISON, BinOp::LtEq),
            Token::GtEq => (bp::COMPARISON, BinOp::GtEq),
            Token::EqEq => (bp::EQUALITY, BinOp::Eq),
            Token::NotEq => (bp::EQUALITY, BinOp::NotEq),
            Token::And => (bp::AND, BinOp::And),
            Token::Or => (bp::OR, BinOp::Or),
            _ => return None,
        };
        Some((lbp, lbp + 1, op))
    }

    /// Parse a prefix expression: parenthesized expression, unary
    /// operator, function call, data reference, global, list/map literal,
    /// or primitive literal, attempted in that order.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        match self.current() {
            Token::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(Token::RParen, "')'")?;
                // Parentheses are erased; no dedicated node.
                Ok(expr)
            }

            Token::Minus => self.parse_unary(UnOp::Neg),
            Token::Not => self.parse_unary(UnOp::Not),

            Token::Ident(name) => {
                let ts = self.advance();
                if self.current() == Token::LParen {
                    self.parse_call(name, ts.span)
                } else {
                    Ok(self.parse_global_tail(name, ts.span))
                }
            }

            Token::DollarIdent(_) | Token::DollarIj => self.parse_data_ref(),

            Token::LBracket => self.parse_list_or_map(),

            Token::Null => Ok(self.literal(Literal::Null)),
            Token::True => Ok(self.literal(Literal::Bool(true))),
            Token::False => Ok(self.literal(Literal::Bool(false))),
            Token::Int(value) => Ok(self.literal(Literal::Int(value))),
            Token::Float(value) => Ok(self.literal(Literal::Float(value))),
            Token::Str(value) => Ok(self.literal(Literal::Str(value))),

            other => Err(ParseError::Expected {
                expected: "an expression".to_string(),
                found: other.to_string(),
                span: self.current_span(),
            }),
        }
    }

    /// Parse a unary operator application; the operand binds above every
    /// binary level so `-a * b` groups as `(-a) * b`.
    fn parse_unary(&mut self, op: UnOp) -> Result<Expr, ParseError> {
        let op_span = self.advance().span;
        let operand = self.parse_expr_with_min_bp(bp::UNARY)?;
        let span = op_span.merge(operand.span());
        Ok(Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            span,
        }))
    }

    /// Consume the current token as a primitive literal node.
    fn literal(&mut self, value: Literal) -> Expr {
        let ts = self.advance();
        Expr::Literal(LiteralExpr {
            value,
            span: ts.span,
        })
    }

    /// Parse a function call: the name has been consumed and the current
    /// token is `(`.
    fn parse_call(&mut self, name: Symbol, name_span: Span) -> Result<Expr, ParseError> {
        self.expect(Token::LParen, "'('")?;

        let mut args = Vec::new();
        if self.current() != Token::RParen {
            loop {
                args.push(self.parse_expr()?);
                if !self.match_token(Token::Comma) {
                    break;
                }
            }
        }

        let close = self.expect(Token::RParen, "')'")?;
        Ok(Expr::Call(CallExpr {
            name,
            args,
            span: name_span.merge(close.span),
        }))
    }

    /// Parse the dotted tail of a global name, joining the segments
    /// verbatim: `some.global.name`.
    pub(crate) fn parse_global_tail(&mut self, head: Symbol, head_span: Span) -> Expr {
        let mut name = head.as_str().to_string();
        let mut span = head_span;

        while let Token::DotIdent(segment) = self.current() {
            let ts = self.advance();
            name.push('.');
            name.push_str(segment.as_str());
            span = span.merge(ts.span);
        }

        Expr::Global(GlobalExpr {
            name: Symbol::intern(&name),
            span,
        })
    }

    /// Parse a data reference.
    ///
    /// Grammar: `( "$ij." IDENT | DOLLAR_IDENT ) ( DOT_IDENT | DOT_INDEX
    /// | "[" Expr "]" )*`. A plain `$ij` (no adjacent dot) is the
    /// reserved-identifier error.
    pub(crate) fn parse_data_ref(&mut self) -> Result<Expr, ParseError> {
        let start_span = self.current_span();

        let (injected, base) = match self.current() {
            Token::DollarIj => {
                self.advance();
                match self.current() {
                    Token::Ident(name) => {
                        let ts = self.advance();
                        (
                            true,
                            KeyAccess {
                                name,
                                span: ts.span,
                            },
                        )
                    }
                    other => {
                        return Err(ParseError::Expected {
                            expected: "an identifier after '$ij.'".to_string(),
                            found: other.to_string(),
                            span: self.current_span(),
                        })
                    }
                }
            }
            Token::DollarIdent(name) => {
                if name.as_str() == "ij" {
                    return Err(ParseError::ReservedIj {
                        span: self.current_span(),
                    });
                }
                let ts = self.advance();
                (
                    false,
                    KeyAccess {
                        name,
                        span: ts.span,
                    },
                )
            }
            other => {
                return Err(ParseError::Expected {
                    expected: "a data reference".to_string(),
                    found: other.to_string(),
                    span: self.current_span(),
                })
            }
        };

        let mut span = start_span.merge(base.span);
        let mut accesses = Vec::new();
        loop {
            match self.current() {
                Token::DotIdent(name) => {
                    let ts = self.advance();
                    span = span.merge(ts.span);
                    accesses.push(Access::Key(KeyAccess {
                        name,
                        span: ts.span,
                    }));
                }
                Token::DotIndex(index) => {
                    let ts = self.advance();
                    span = span.merge(ts.span);
                    accesses.push(Access::Index(IndexAccess {
                        index,
                        span: ts.span,
                    }));
                }
                Token::LBracket => {
                    self.advance();
                    let key = self.parse_expr()?;
                    let close = self.expect(Token::RBracket, "']'")?;
                    span = span.merge(close.span);
                    accesses.push(Access::Expr(Box::new(key)));
                }
                _ => break,
            }
        }

        Ok(Expr::DataRef(DataRefExpr {
            injected,
            base,
            accesses,
            span,
        }))
    }

    /// Parse a `[` literal: empty list `[]`, empty map `[:]`, or a
    /// non-empty list/map decided by the token after the first
    /// expression (`:` means map).
    fn parse_list_or_map(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance();

        if self.current() == Token::RBracket {
            let close = self.advance();
            return Ok(Expr::List(ListExpr {
                items: Vec::new(),
                span: open.span.merge(close.span),
            }));
        }

        if self.current() == Token::Colon {
            self.advance();
            let close = self.expect(Token::RBracket, "']'")?;
            return Ok(Expr::Map(MapExpr {
                entries: Vec::new(),
                span: open.span.merge(close.span),
            }));
        }

        self.check_map_key()?;
        let first = self.parse_expr()?;

        if self.current() == Token::Colon {
            self.parse_map_rest(open.span, first)
        } else {
            self.parse_list_rest(open.span, first)
        }
    }

    /// Reject `IDENT :` before it is consumed as a map key.
    ///
    /// An unquoted single identifier in key position would otherwise
    /// parse as a one-segment global, which the language disallows in
    /// map literals; the error suggests quoting (string key) or
    /// parenthesizing (global key).
    fn check_map_key(&self) -> Result<(), ParseError> {
        if let Token::Ident(name) = self.current() {
            if self.peek(1) == Token::Colon {
                return Err(ParseError::DisallowedMapKey {
                    key: name.as_str().to_string(),
                    span: self.current_span(),
                });
            }
        }
        Ok(())
    }

    /// Parse the remainder of a list literal after its first element.
    ///
    /// A trailing comma is allowed once at least one element is present:
    /// continuation is governed by whether the token after `,` is `]`.
    fn parse_list_rest(&mut self, open_span: Span, first: Expr) -> Result<Expr, ParseError> {
        let mut items = vec![first];

        while self.match_token(Token::Comma) {
            if self.current() == Token::RBracket {
                break;
            }
            items.push(self.parse_expr()?);
        }

        let close = self.expect(Token::RBracket, "']'")?;
        Ok(Expr::List(ListExpr {
            items,
            span: open_span.merge(close.span),
        }))
    }

    /// Parse the remainder of a map literal after its first key; the
    /// current token is the `:` following that key.
    ///
    /// Entries land in the node as alternating key, value pairs.
    fn parse_map_rest(&mut self, open_span: Span, first_key: Expr) -> Result<Expr, ParseError> {
        self.expect(Token::Colon, "':'")?;
        let first_value = self.parse_expr()?;

        let mut entries = vec![first_key, first_value];
        while self.match_token(Token::Comma) {
            if self.current() == Token::RBracket {
                break;
            }
            self.check_map_key()?;
            let key = self.parse_expr()?;
            self.expect(Token::Colon, "':'")?;
            let value = self.parse_expr()?;
            entries.push(key);
            entries.push(value);
        }

        let close = self.expect(Token::RBracket, "']'")?;
        Ok(Expr::Map(MapExpr {
            entries,
            span: open_span.merge(close.span),
        }))
    }
}

// =============================================================================
// TESTS
// =============================================================================
