//! Legacy decoder front door
//!
//! - [`parser`] runs the section grammars and collects deprecation warnings
//! - [`error`] defines [`SyntaxError`] and the [`Diagnostic`] banner
//! - [`emitter`] renders a canonical mapping back into legacy text

pub mod emitter;
pub mod error;
pub mod parser;

pub use emitter::emit;
pub use error::{Diagnostic, SyntaxError, SyntaxResult, DEFAULT_FILENAME};
pub use parser::{
    parse_string, parse_string_named, parse_string_with_preferences, DecodedInput,
    DeprecationWarning, LegacyParser,
};

/// Check that every syntax code has registry metadata
pub fn init_syntax_logging() -> Result<(), String> {
    use crate::logging::codes::{get_error_metadata, syntax};

    let syntax_codes = [
        syntax::UNEXPECTED_TOKEN,
        syntax::UNEXPECTED_END_OF_INPUT,
        syntax::MISSING_END,
        syntax::MISSING_QUIT,
        syntax::MISSING_REQUIRED_DIRECTIVE,
        syntax::DUPLICATE_DIRECTIVE,
        syntax::INVALID_CHOICE,
        syntax::VALUE_OUT_OF_RANGE,
        syntax::DIRECTIVE_NOT_ALLOWED,
        syntax::MISSING_SECTION,
        syntax::TOO_MANY_SECTIONS,
        syntax::DEPRECATED_KEYWORD,
    ];

    for code in &syntax_codes {
        if get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Syntax error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_codes_registered() {
        assert!(init_syntax_logging().is_ok());
    }
}
