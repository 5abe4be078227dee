//! Main lexer implementation for the Weft expression language.
//!
//! This module provides the `Lexer` struct which transforms expression
//! source text into a stream of classified tokens with source spans. The
//! lexer is hand-written over a character [`Cursor`]: each token kind has
//! a small direct-coded scanning function, dispatched on the first
//! character after whitespace.
//!
//! Whitespace (space, tab, CR, LF) is skipped between tokens. It is not
//! permitted between `$` and an identifier, inside numeric literals, or
//! inside string literals, but a dot-access token (`.name` / `.0`) may
//! carry whitespace between the dot and the name, which is absorbed and
//! discarded.
//!
//! The first lexical error aborts tokenization and is returned to the
//! caller; there is no recovery or resynchronization.

use weftc_util::{Span, Symbol};

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{keyword_from_ident, Token, TokenSpan};
use crate::unicode::{
    decode_unicode_escape, is_hex_digit_upper, is_ident_continue, is_ident_start,
};

/// The expression lexer.
///
/// Transforms source text into tokens on demand via [`Lexer::next_token`],
/// or all at once via [`tokenize`].
///
/// # Example
///
/// ```
/// use weftc_lex::{Lexer, Token};
///
/// let mut lexer = Lexer::new("1 + 2");
/// assert_eq!(lexer.next_token().unwrap().token, Token::Int(1));
/// assert_eq!(lexer.next_token().unwrap().token, Token::Plus);
/// assert_eq!(lexer.next_token().unwrap().token, Token::Int(2));
/// assert_eq!(lexer.next_token().unwrap().token, Token::Eof);
/// ```
pub struct Lexer<'a> {
    /// Character cursor for traversing source.
    cursor: Cursor<'a>,

    /// Start position of the current token.
    token_start: usize,

    /// Start line of the current token.
    token_start_line: u32,

    /// Start column of the current token.
    token_start_column: u32,

    /// Set once `Eof` or an error has been produced (for the iterator).
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
            finished: false,
        }
    }

    /// Returns the next token from the source.
    ///
    /// Skips insignificant whitespace, then dispatches on the first
    /// character. At the end of input this returns `Token::Eof` with an
    /// empty span at the input length.
    pub fn next_token(&mut self) -> Result<TokenSpan, LexError> {
        self.skip_whitespace();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(self.emit(Token::Eof));
        }

        match self.cursor.current_char() {
            '(' => Ok(self.single(Token::LParen)),
            ')' => Ok(self.single(Token::RParen)),
            '[' => Ok(self.single(Token::LBracket)),
            ']' => Ok(self.single(Token::RBracket)),
            ',' => Ok(self.single(Token::Comma)),
            ':' => Ok(self.single(Token::Colon)),
            '?' => Ok(self.single(Token::Question)),
            '+' => Ok(self.single(Token::Plus)),
            '-' => Ok(self.single(Token::Minus)),
            '*' => Ok(self.single(Token::Star)),
            '/' => Ok(self.single(Token::Slash)),
            '%' => Ok(self.single(Token::Percent)),
            '<' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.emit(Token::LtEq))
                } else {
                    Ok(self.emit(Token::Lt))
                }
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.emit(Token::GtEq))
                } else {
                    Ok(self.emit(Token::Gt))
                }
            }
            '=' => {
                // Only '==' exists; a lone '=' cannot start a token.
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.emit(Token::EqEq))
                } else {
                    Err(LexError::UnexpectedChar {
                        ch: '=',
                        span: self.make_span(),
                    })
                }
            }
            '!' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.emit(Token::NotEq))
                } else {
                    Err(LexError::UnexpectedChar {
                        ch: '!',
                        span: self.make_span(),
                    })
                }
            }
            '\'' => self.lex_string(),
            '$' => self.lex_dollar(),
            '.' => self.lex_dot(),
            c if c.is_ascii_digit() => self.lex_number(),
            c if is_ident_start(c) => Ok(self.lex_identifier()),
            c => {
                self.cursor.advance();
                Err(LexError::UnexpectedChar {
                    ch: c,
                    span: self.make_span(),
                })
            }
        }
    }

    /// Lexes an identifier or keyword.
    ///
    /// Keywords (`null`, `true`, `false`, `not`, `and`, `or`) are
    /// recognized only as maximal matches; `null_` is an identifier.
    fn lex_identifier(&mut self) -> TokenSpan {
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);
        let token =
            keyword_from_ident(text).unwrap_or_else(|| Token::Ident(Symbol::intern(text)));
        self.emit(token)
    }

    /// Lexes `$ident` or the `$ij.` injected-data prefix.
    ///
    /// Whitespace between `$` and the identifier is not permitted; the
    /// identifier `ij` immediately followed by `.` lexes as the dedicated
    /// `DollarIj` token.
    fn lex_dollar(&mut self) -> Result<TokenSpan, LexError> {
        self.cursor.advance();

        if !is_ident_start(self.cursor.current_char()) {
            return Err(LexError::UnexpectedChar {
                ch: '$',
                span: self.make_span(),
            });
        }

        let name_start = self.cursor.position();
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let name = self.cursor.slice_from(name_start);

        if name == "ij" && self.cursor.current_char() == '.' {
            self.cursor.advance();
            return Ok(self.emit(Token::DollarIj));
        }

        Ok(self.emit(Token::DollarIdent(Symbol::intern(name))))
    }

    /// Lexes a dot-access token: `.name` or `.123`.
    ///
    /// Whitespace (including newlines) between the dot and the name or
    /// index is absorbed and discarded; the emitted token carries only
    /// the name/index.
    fn lex_dot(&mut self) -> Result<TokenSpan, LexError> {
        let dot_span = Span::new(
            self.token_start,
            self.token_start + 1,
            self.token_start_line,
            self.token_start_column,
        );
        self.cursor.advance();
        self.skip_whitespace();

        let c = self.cursor.current_char();
        if is_ident_start(c) {
            let name_start = self.cursor.position();
            while is_ident_continue(self.cursor.current_char()) {
                self.cursor.advance();
            }
            let name = self.cursor.slice_from(name_start);
            return Ok(self.emit(Token::DotIdent(Symbol::intern(name))));
        }

        if c.is_ascii_digit() {
            let digits_start = self.cursor.position();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
            // A digit run followed by identifier characters is not an
            // index; absorb the tail so the error names the whole lexeme.
            if is_ident_start(self.cursor.current_char()) {
                while is_ident_continue(self.cursor.current_char()) {
                    self.cursor.advance();
                }
                return Err(LexError::BadNumber {
                    literal: self.cursor.slice_from(digits_start).to_string(),
                    span: self.make_span(),
                });
            }
            let digits = self.cursor.slice_from(digits_start);
            let index = digits.parse::<u32>().map_err(|_| LexError::BadNumber {
                literal: digits.to_string(),
                span: self.make_span(),
            })?;
            return Ok(self.emit(Token::DotIndex(index)));
        }

        Err(LexError::UnexpectedChar {
            ch: '.',
            span: dot_span,
        })
    }

    /// Lexes a numeric literal.
    ///
    /// # Accepted forms
    ///
    /// - Decimal integer: `[0-9]+` (no octal; `0123` is decimal 123)
    /// - Hex integer: `0x[0-9A-F]+` (lowercase `x`, uppercase digits)
    /// - Float: `[0-9]+.[0-9]+` with optional `e[+-]?[0-9]+`, or
    ///   `[0-9]+e[+-]?[0-9]+` (lowercase `e`)
    ///
    /// A literal immediately followed by an identifier character is
    /// malformed, which is what rejects `0x1a` and `1E5`.
    fn lex_number(&mut self) -> Result<TokenSpan, LexError> {
        if self.cursor.current_char() == '0' && self.cursor.peek_char(1) == 'x' {
            self.cursor.advance();
            self.cursor.advance();

            let digit_start = self.cursor.position();
            while is_hex_digit_upper(self.cursor.current_char()) {
                self.cursor.advance();
            }
            let has_digits = self.cursor.position() > digit_start;

            if !has_digits || is_ident_continue(self.cursor.current_char()) {
                return Err(self.bad_number());
            }

            let digits = self.cursor.slice_from(digit_start);
            let value = i64::from_str_radix(digits, 16).map_err(|_| LexError::BadNumber {
                literal: self.cursor.slice_from(self.token_start).to_string(),
                span: self.make_span(),
            })?;
            return Ok(self.emit(Token::Int(value)));
        }

        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        let mut is_float = false;

        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            is_float = true;
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        if self.cursor.current_char() == 'e' {
            // Consume the exponent only when digits actually follow the
            // optional sign; otherwise the 'e' falls through to the
            // trailing-identifier check below.
            let sign = self.cursor.peek_char(1);
            let digit_at = if sign == '+' || sign == '-' { 2 } else { 1 };
            if self.cursor.peek_char(digit_at).is_ascii_digit() {
                is_float = true;
                self.cursor.advance();
                if self.cursor.current_char() == '+' || self.cursor.current_char() == '-' {
                    self.cursor.advance();
                }
                while self.cursor.current_char().is_ascii_digit() {
                    self.cursor.advance();
                }
            }
        }

        if is_ident_continue(self.cursor.current_char()) {
            return Err(self.bad_number());
        }

        let text = self.cursor.slice_from(self.token_start);
        if is_float {
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(self.emit(Token::Float(value))),
                _ => Err(LexError::BadNumber {
                    literal: text.to_string(),
                    span: self.make_span(),
                }),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => Ok(self.emit(Token::Int(value))),
                Err(_) => Err(LexError::BadNumber {
                    literal: text.to_string(),
                    span: self.make_span(),
                }),
            }
        }
    }

    /// Lexes a single-quoted string literal.
    ///
    /// Escapes: `\\ \' \" \n \r \t \b \f` and `\uXXXX` (exactly four hex
    /// digits). A raw newline or end of input inside the literal is an
    /// unterminated-string error.
    fn lex_string(&mut self) -> Result<TokenSpan, LexError> {
        self.cursor.advance();

        let mut content = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedString {
                    span: self.make_span(),
                });
            }

            let c = self.cursor.current_char();
            match c {
                '\'' => {
                    self.cursor.advance();
                    break;
                }
                '\n' | '\r' => {
                    return Err(LexError::UnterminatedString {
                        span: self.make_span(),
                    });
                }
                '\\' => {
                    let escape_start = self.cursor.position();
                    let escape_line = self.cursor.line();
                    let escape_column = self.cursor.column();
                    self.cursor.advance();
                    content.push(self.lex_escape(escape_start, escape_line, escape_column)?);
                }
                _ => {
                    content.push(c);
                    self.cursor.advance();
                }
            }
        }

        Ok(self.emit(Token::Str(Symbol::intern(&content))))
    }

    /// Resolves one escape sequence; the cursor sits after the backslash.
    fn lex_escape(
        &mut self,
        escape_start: usize,
        escape_line: u32,
        escape_column: u32,
    ) -> Result<char, LexError> {
        if self.cursor.is_at_end() {
            return Err(LexError::UnterminatedString {
                span: self.make_span(),
            });
        }

        let c = self.cursor.current_char();
        self.cursor.advance();

        let escape_span = |end: usize| Span::new(escape_start, end, escape_line, escape_column);

        match c {
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'b' => Ok('\u{0008}'),
            'f' => Ok('\u{000C}'),
            '\\' => Ok('\\'),
            '\'' => Ok('\''),
            '"' => Ok('"'),
            'u' => {
                let mut hex = String::new();
                for _ in 0..4 {
                    let hc = self.cursor.current_char();
                    if !hc.is_ascii_hexdigit() {
                        break;
                    }
                    hex.push(hc);
                    self.cursor.advance();
                }
                decode_unicode_escape(&hex).ok_or_else(|| LexError::BadEscape {
                    escape: format!("u{}", hex),
                    span: escape_span(self.cursor.position()),
                })
            }
            other => Err(LexError::BadEscape {
                escape: other.to_string(),
                span: escape_span(self.cursor.position()),
            }),
        }
    }

    /// Builds a `BadNumber` error covering the current token plus any
    /// trailing identifier characters glued to it.
    fn bad_number(&mut self) -> LexError {
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        LexError::BadNumber {
            literal: self.cursor.slice_from(self.token_start).to_string(),
            span: self.make_span(),
        }
    }

    /// Skips the whitespace characters insignificant between tokens:
    /// space, tab, CR, LF.
    fn skip_whitespace(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' => self.cursor.advance(),
                _ => break,
            }
        }
    }

    /// Consumes one character and emits the given token.
    fn single(&mut self, token: Token) -> TokenSpan {
        self.cursor.advance();
        self.emit(token)
    }

    fn emit(&self, token: Token) -> TokenSpan {
        TokenSpan::new(token, self.make_span())
    }

    fn make_span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
    }
}

/// Iterate over tokens until `Eof` or the first error.
///
/// `Eof` itself is not yielded; an error is yielded once and ends the
/// iteration.
impl<'a> Iterator for Lexer<'a> {
    type Item = Result<TokenSpan, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(ts) if ts.token == Token::Eof => {
                self.finished = true;
                None
            }
            Ok(ts) => Some(Ok(ts)),
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

/// Tokenizes an entire source text.
///
/// On success the returned vector always ends with the `Eof` token, whose
/// empty span sits at the input length; the parser leans on that span for
/// end-of-input diagnostics. The first lexical error aborts tokenization.
///
/// # Example
///
/// ```
/// use weftc_lex::{tokenize, Token};
///
/// let tokens = tokenize("$a.b").unwrap();
/// let kinds: Vec<Token> = tokens.iter().map(|ts| ts.token).collect();
/// assert_eq!(kinds.len(), 3); // $a, .b, Eof
/// assert_eq!(kinds[2], Token::Eof);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<TokenSpan>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let ts = lexer.next_token()?;
        let done = ts.token == Token::Eof;
        tokens.push(ts);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lexes a source and returns the token kinds, without Eof.
    fn lex_tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|ts| ts.token)
            .filter(|t| *t != Token::Eof)
            .collect()
    }

    /// Lexes a source expecting a lexical error.
    fn lex_err(source: &str) -> LexError {
        tokenize(source).unwrap_err()
    }

    fn sym(text: &str) -> Symbol {
        Symbol::intern(text)
    }

    // =========================================================================
    // KEYWORDS AND IDENTIFIERS
    // =========================================================================

    #[test]
    fn test_keywords() {
        assert_eq!(
            lex_tokens("null true false not and or"),
            vec![
                Token::Null,
                Token::True,
                Token::False,
                Token::Not,
                Token::And,
                Token::Or
            ]
        );
    }

    #[test]
    fn test_keyword_maximal_match() {
        assert_eq!(lex_tokens("null_"), vec![Token::Ident(sym("null_"))]);
        assert_eq!(lex_tokens("nulls"), vec![Token::Ident(sym("nulls"))]);
        assert_eq!(lex_tokens("android"), vec![Token::Ident(sym("android"))]);
        assert_eq!(lex_tokens("ornot"), vec![Token::Ident(sym("ornot"))]);
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(lex_tokens("foo"), vec![Token::Ident(sym("foo"))]);
        assert_eq!(lex_tokens("_x9"), vec![Token::Ident(sym("_x9"))]);
        assert_eq!(lex_tokens("CamelCase"), vec![Token::Ident(sym("CamelCase"))]);
    }

    // =========================================================================
    // NUMBERS
    // =========================================================================

    #[test]
    fn test_decimal_integers() {
        assert_eq!(lex_tokens("0"), vec![Token::Int(0)]);
        assert_eq!(lex_tokens("42"), vec![Token::Int(42)]);
        // No octal form; a leading zero is plain decimal.
        assert_eq!(lex_tokens("0123"), vec![Token::Int(123)]);
    }

    #[test]
    fn test_hex_integers() {
        assert_eq!(lex_tokens("0x0"), vec![Token::Int(0)]);
        assert_eq!(lex_tokens("0xFF"), vec![Token::Int(255)]);
        assert_eq!(lex_tokens("0x1A2B"), vec![Token::Int(0x1A2B)]);
        assert_eq!(lex_tokens("0x1A2B")[0], Token::Int(6699));
    }

    #[test]
    fn test_hex_rejects_lowercase_digits() {
        assert!(matches!(lex_err("0x1a"), LexError::BadNumber { .. }));
        assert!(matches!(lex_err("0xff"), LexError::BadNumber { .. }));
    }

    #[test]
    fn test_hex_rejects_uppercase_x() {
        assert!(matches!(lex_err("0X1A"), LexError::BadNumber { .. }));
    }

    #[test]
    fn test_hex_requires_digits() {
        assert!(matches!(lex_err("0x"), LexError::BadNumber { .. }));
        assert!(matches!(lex_err("0xG"), LexError::BadNumber { .. }));
    }

    #[test]
    fn test_floats() {
        assert_eq!(lex_tokens("3.5"), vec![Token::Float(3.5)]);
        assert_eq!(lex_tokens("0.25"), vec![Token::Float(0.25)]);
    }

    #[test]
    fn test_floats_with_exponent() {
        assert_eq!(lex_tokens("1e3"), vec![Token::Float(1000.0)]);
        assert_eq!(lex_tokens("1.5e2"), vec![Token::Float(150.0)]);
        assert_eq!(lex_tokens("2e+2"), vec![Token::Float(200.0)]);
        assert_eq!(lex_tokens("25e-1"), vec![Token::Float(2.5)]);
    }

    #[test]
    fn test_float_requires_lowercase_e() {
        assert!(matches!(lex_err("1E5"), LexError::BadNumber { .. }));
    }

    #[test]
    fn test_float_requires_exponent_digits() {
        assert!(matches!(lex_err("1e"), LexError::BadNumber { .. }));
        assert!(matches!(lex_err("1e+"), LexError::BadNumber { .. }));
        assert!(matches!(lex_err("1.5e-"), LexError::BadNumber { .. }));
    }

    #[test]
    fn test_float_requires_digits_around_dot() {
        // "1." is Int(1) followed by a dot token attempt; the dot then
        // has nothing valid after it.
        assert!(matches!(lex_err("1."), LexError::UnexpectedChar { ch: '.', .. }));
    }

    #[test]
    fn test_number_with_trailing_ident_chars() {
        assert!(matches!(lex_err("12abc"), LexError::BadNumber { .. }));
        assert!(matches!(lex_err("1_000"), LexError::BadNumber { .. }));
    }

    #[test]
    fn test_integer_overflow() {
        assert!(matches!(
            lex_err("99999999999999999999"),
            LexError::BadNumber { .. }
        ));
    }

    // =========================================================================
    // STRINGS
    // =========================================================================

    #[test]
    fn test_simple_string() {
        assert_eq!(lex_tokens("'hello'"), vec![Token::Str(sym("hello"))]);
        assert_eq!(lex_tokens("''"), vec![Token::Str(sym(""))]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            lex_tokens(r"'a\nb\tc\rd'"),
            vec![Token::Str(sym("a\nb\tc\rd"))]
        );
        assert_eq!(lex_tokens(r"'\\'"), vec![Token::Str(sym("\\"))]);
        assert_eq!(lex_tokens(r"'\''"), vec![Token::Str(sym("'"))]);
        assert_eq!(lex_tokens(r#"'\"'"#), vec![Token::Str(sym("\""))]);
        assert_eq!(
            lex_tokens(r"'\b\f'"),
            vec![Token::Str(sym("\u{0008}\u{000C}"))]
        );
    }

    #[test]
    fn test_string_unicode_escape() {
        assert_eq!(lex_tokens(r"'\u0041'"), vec![Token::Str(sym("A"))]);
        assert_eq!(lex_tokens(r"'\u00E9'"), vec![Token::Str(sym("é"))]);
        assert_eq!(lex_tokens(r"'\u00e9'"), vec![Token::Str(sym("é"))]);
        assert_eq!(lex_tokens(r"'\u2603'"), vec![Token::Str(sym("☃"))]);
        // Literal non-ASCII text needs no escaping either.
        assert_eq!(lex_tokens("'é☃'"), vec![Token::Str(sym("é☃"))]);
    }

    #[test]
    fn test_string_unknown_escape() {
        assert!(matches!(lex_err(r"'\x41'"), LexError::BadEscape { .. }));
        assert!(matches!(lex_err(r"'\0'"), LexError::BadEscape { .. }));
    }

    #[test]
    fn test_string_short_unicode_escape() {
        assert!(matches!(lex_err(r"'\u41'"), LexError::BadEscape { .. }));
        assert!(matches!(lex_err(r"'\uD800'"), LexError::BadEscape { .. }));
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            lex_err("'abc"),
            LexError::UnterminatedString { .. }
        ));
        assert!(matches!(
            lex_err("'abc\ndef'"),
            LexError::UnterminatedString { .. }
        ));
        assert!(matches!(
            lex_err(r"'abc\"),
            LexError::UnterminatedString { .. }
        ));
    }

    #[test]
    fn test_double_quote_is_not_a_string() {
        assert!(matches!(
            lex_err("\"hello\""),
            LexError::UnexpectedChar { ch: '"', .. }
        ));
    }

    // =========================================================================
    // DOLLAR AND DOT TOKENS
    // =========================================================================

    #[test]
    fn test_dollar_ident() {
        assert_eq!(lex_tokens("$aaa"), vec![Token::DollarIdent(sym("aaa"))]);
        assert_eq!(lex_tokens("$_a1"), vec![Token::DollarIdent(sym("_a1"))]);
    }

    #[test]
    fn test_dollar_ij_prefix() {
        assert_eq!(
            lex_tokens("$ij.aaa"),
            vec![Token::DollarIj, Token::Ident(sym("aaa"))]
        );
    }

    #[test]
    fn test_dollar_ij_without_dot() {
        assert_eq!(lex_tokens("$ij"), vec![Token::DollarIdent(sym("ij"))]);
        // Maximal munch: "ijk" is not the reserved prefix.
        assert_eq!(lex_tokens("$ijk"), vec![Token::DollarIdent(sym("ijk"))]);
    }

    #[test]
    fn test_dollar_requires_adjacent_ident() {
        assert!(matches!(
            lex_err("$ foo"),
            LexError::UnexpectedChar { ch: '$', .. }
        ));
        assert!(matches!(lex_err("$"), LexError::UnexpectedChar { ch: '$', .. }));
        assert!(matches!(
            lex_err("$1"),
            LexError::UnexpectedChar { ch: '$', .. }
        ));
    }

    #[test]
    fn test_dot_ident() {
        assert_eq!(lex_tokens(".foo"), vec![Token::DotIdent(sym("foo"))]);
    }

    #[test]
    fn test_dot_ident_absorbs_whitespace() {
        assert_eq!(lex_tokens(".  foo"), vec![Token::DotIdent(sym("foo"))]);
        assert_eq!(lex_tokens(".\n\t foo"), vec![Token::DotIdent(sym("foo"))]);
    }

    #[test]
    fn test_dot_index() {
        assert_eq!(lex_tokens(".0"), vec![Token::DotIndex(0)]);
        assert_eq!(lex_tokens(".12"), vec![Token::DotIndex(12)]);
        assert_eq!(lex_tokens(". 3"), vec![Token::DotIndex(3)]);
    }

    #[test]
    fn test_dot_index_rejects_ident_tail() {
        assert!(matches!(lex_err(".0abc"), LexError::BadNumber { .. }));
    }

    #[test]
    fn test_bare_dot() {
        assert!(matches!(
            lex_err("."),
            LexError::UnexpectedChar { ch: '.', .. }
        ));
        assert!(matches!(
            lex_err(". +"),
            LexError::UnexpectedChar { ch: '.', .. }
        ));
    }

    #[test]
    fn test_data_ref_token_stream() {
        assert_eq!(
            lex_tokens("$aaa.bbb.0.ccc[12]"),
            vec![
                Token::DollarIdent(sym("aaa")),
                Token::DotIdent(sym("bbb")),
                Token::DotIndex(0),
                Token::DotIdent(sym("ccc")),
                Token::LBracket,
                Token::Int(12),
                Token::RBracket,
            ]
        );
    }

    // =========================================================================
    // OPERATORS AND PUNCTUATION
    // =========================================================================

    #[test]
    fn test_arithmetic_operators() {
        assert_eq!(
            lex_tokens("+ - * / %"),
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Percent
            ]
        );
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(
            lex_tokens("< > <= >= == !="),
            vec![
                Token::Lt,
                Token::Gt,
                Token::LtEq,
                Token::GtEq,
                Token::EqEq,
                Token::NotEq
            ]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            lex_tokens("( ) [ ] , : ?"),
            vec![
                Token::LParen,
                Token::RParen,
                Token::LBracket,
                Token::RBracket,
                Token::Comma,
                Token::Colon,
                Token::Question
            ]
        );
    }

    #[test]
    fn test_lone_equals_and_bang() {
        assert!(matches!(
            lex_err("="),
            LexError::UnexpectedChar { ch: '=', .. }
        ));
        assert!(matches!(
            lex_err("!"),
            LexError::UnexpectedChar { ch: '!', .. }
        ));
        assert!(matches!(
            lex_err("a ! b"),
            LexError::UnexpectedChar { ch: '!', .. }
        ));
    }

    #[test]
    fn test_unexpected_characters() {
        for (source, ch) in [("@", '@'), ("#", '#'), ("&", '&'), ("|", '|'), (";", ';')] {
            match lex_err(source) {
                LexError::UnexpectedChar { ch: got, .. } => assert_eq!(got, ch),
                other => panic!("expected UnexpectedChar for {:?}, got {:?}", source, other),
            }
        }
    }

    // =========================================================================
    // WHITESPACE AND SPANS
    // =========================================================================

    #[test]
    fn test_whitespace_skipping() {
        assert_eq!(
            lex_tokens("  1\t+\r\n 2 "),
            vec![Token::Int(1), Token::Plus, Token::Int(2)]
        );
    }

    #[test]
    fn test_empty_source() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, Token::Eof);
        assert_eq!(tokens[0].span.start, 0);
    }

    #[test]
    fn test_token_spans() {
        let tokens = tokenize("1 + 23").unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 1, 1, 1));
        assert_eq!(tokens[1].span, Span::new(2, 3, 1, 3));
        assert_eq!(tokens[2].span, Span::new(4, 6, 1, 5));
        assert_eq!(tokens[3].span, Span::new(6, 6, 1, 7)); // Eof
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens = tokenize("1 +\n 2").unwrap();
        assert_eq!(tokens[2].span.line, 2);
        assert_eq!(tokens[2].span.column, 2);
        assert_eq!(tokens[2].span.start, 5);
    }

    #[test]
    fn test_string_span_covers_quotes() {
        let tokens = tokenize("'ab'").unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 4, 1, 1));
    }

    #[test]
    fn test_error_offsets() {
        assert_eq!(lex_err("1 + @").offset(), 4);
        assert_eq!(lex_err("0x1a").offset(), 0);
        assert_eq!(lex_err("'abc").offset(), 0);
    }

    // =========================================================================
    // ITERATOR
    // =========================================================================

    #[test]
    fn test_iterator_stops_at_eof() {
        let tokens: Result<Vec<_>, _> = Lexer::new("1 + 2").collect();
        let tokens = tokens.unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|ts| ts.token != Token::Eof));
    }

    #[test]
    fn test_iterator_yields_error_once() {
        let mut lexer = Lexer::new("@@");
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());
    }
}
