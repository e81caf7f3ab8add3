//! Lexical analysis of legacy input decks
//!
//! Splits source text into whitespace-delimited words with number
//! classification, comments and spans for diagnostics.

pub mod analyzer;

use crate::file_processor::FileProcessingResult;
use crate::tokens::TokenStream;

pub use analyzer::{
    classify_word, is_float_literal, is_integer_literal, LexerError, LexicalAnalyzer,
    LexicalMetrics,
};

pub fn tokenize_file_result(file_result: FileProcessingResult) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize_file_result(file_result)
}

pub fn tokenize_str(source: &str) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize(source.to_string())
}

/// Check that every lexical error code has registry metadata
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let lexical_codes = [
        crate::logging::codes::lexical::INVALID_CHARACTER,
        crate::logging::codes::lexical::INVALID_NUMBER,
        crate::logging::codes::lexical::WORD_TOO_LONG,
        crate::logging::codes::lexical::TOO_MANY_TOKENS,
        crate::logging::codes::lexical::COMMENT_TOO_LONG,
    ];

    for code in &lexical_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
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
    fn test_lexical_codes_registered() {
        assert!(init_lexical_analysis_logging().is_ok());
    }

    #[test]
    fn test_tokenize_str() {
        let stream = tokenize_str("QUIT").unwrap();
        assert_eq!(stream.len(), 2);
    }
}
