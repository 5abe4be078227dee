//! weftc-lex - Lexical Analyzer for Weft Template Expressions
//!
//! This crate turns expression source text into a stream of classified
//! tokens with source spans, the first phase of the Weft expression front
//! end. The lexer is direct-coded: each token kind has its own scanning
//! function dispatched on the first significant character, which keeps
//! the lookahead-sensitive rules below easy to state and test.
//!
//! # Token kinds
//!
//! | Kind | Pattern |
//! |------|---------|
//! | `Null` | `null` |
//! | `True` / `False` | `true` \| `false` |
//! | `Int` | `[0-9]+` \| `0x[0-9A-F]+` (lowercase `x`, uppercase digits) |
//! | `Float` | `[0-9]+.[0-9]+(e[+-]?[0-9]+)?` \| `[0-9]+e[+-]?[0-9]+` |
//! | `Str` | single-quoted, escapes `\\ \' \" \n \r \t \b \f \uXXXX` |
//! | `Ident` | `[A-Za-z_][A-Za-z_0-9]*` |
//! | `DollarIdent` | `$` immediately followed by an identifier |
//! | `DollarIj` | `$ij.` (injected-data prefix, one unit) |
//! | `DotIdent` | `.`, optional whitespace, identifier |
//! | `DotIndex` | `.`, optional whitespace, `[0-9]+` |
//! | punctuation | `( ) [ ] , : ?` |
//! | operators | `- + * / % < > <= >= == != not and or` |
//!
//! # Policies
//!
//! - Keywords are recognized only as maximal matches: `null_` is an
//!   identifier.
//! - `-` is one token whether unary or binary; the parser disambiguates.
//! - There is no octal form; `0123` is decimal. Lowercase hex digits make
//!   the literal malformed (`0x1a` is an error, `0x1A` is 26).
//! - Whitespace (space, tab, CR, LF) separates tokens. It may not appear
//!   between `$` and the identifier, inside numbers, or inside strings,
//!   but is absorbed between a dot and the following name or index.
//! - Unknown string escapes are errors, and `\u` takes exactly four hex
//!   digits.
//!
//! Errors carry the byte offset of the offending input and abort
//! tokenization; see [`LexError`].

pub mod cursor;
pub mod error;
pub mod lexer;
pub mod token;
pub mod unicode;

mod edge_cases;

pub use error::LexError;
pub use lexer::{tokenize, Lexer};
pub use token::{keyword_from_ident, Token, TokenSpan};
