//! Shared primitives used by the lexer, the legacy parser and diagnostics.

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
