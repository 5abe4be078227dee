//! Edge case and property tests for weftc-lex
