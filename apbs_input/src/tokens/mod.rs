//! Token system for the legacy input language
//!
//! - **[`Token`]** numbers, words, the two PRINT operators, whitespace and comments
//! - **[`TokenStream`]** lookahead over significant tokens with exact spans
//! - **[`SpannedToken`]** a token with its source location

pub mod token;
pub mod token_stream;

pub use token::{Token, TokenClass};
pub use token_stream::{SpannedToken, TokenStream};

pub use crate::utils::{Position, SourceMap, Span, Spanned};
