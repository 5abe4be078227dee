//! Edge case tests for weftc-par
