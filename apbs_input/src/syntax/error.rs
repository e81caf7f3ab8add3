//! Decoder failures and the diagnostic banner shown to users
//!
//! Builders raise [`SyntaxError`] with the span of the offending token. The
//! parser turns the first one into a [`Diagnostic`], which is the single
//! failure object callers see.

use crate::config::constants::compile_time::syntax::BANNER_WIDTH;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::utils::{SourceMap, Span};
use std::fmt;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEndOfInput { expected: String, span: Span },

    #[error("Missing END for {section} section")]
    MissingEnd { section: String, span: Span },

    #[error("Missing QUIT at end of input")]
    MissingQuit { span: Span },

    #[error("{section} section is missing required directive '{directive}'")]
    MissingRequiredDirective {
        section: String,
        directive: String,
        span: Span,
    },

    #[error("Directive '{directive}' may only appear once per section")]
    DuplicateDirective { directive: String, span: Span },

    #[error("Invalid value '{value}' for '{directive}': expected one of {allowed}")]
    InvalidChoice {
        directive: String,
        value: String,
        allowed: String,
        span: Span,
    },

    #[error("Value for {directive}, {value}, must be {constraint}")]
    ValueOutOfRange {
        directive: String,
        value: f64,
        constraint: String,
        span: Span,
    },

    #[error("Malformed number '{text}' for '{directive}'")]
    InvalidNumber {
        directive: String,
        text: String,
        span: Span,
    },

    #[error("Directive '{directive}' is not allowed for calculation type '{variant}'")]
    DirectiveNotAllowed {
        directive: String,
        variant: String,
        span: Span,
    },

    #[error("Input requires {requirement}")]
    MissingSection { requirement: String, span: Span },

    #[error("Too many {what}: limit is {limit}")]
    TooManySections {
        what: String,
        limit: usize,
        span: Span,
    },
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn unexpected_end_of_input(expected: &str, span: Span) -> Self {
        Self::UnexpectedEndOfInput {
            expected: expected.to_string(),
            span,
        }
    }

    pub fn missing_end(section: &str, span: Span) -> Self {
        Self::MissingEnd {
            section: section.to_string(),
            span,
        }
    }

    pub fn missing_required(section: &str, directive: &str, span: Span) -> Self {
        Self::MissingRequiredDirective {
            section: section.to_string(),
            directive: directive.to_string(),
            span,
        }
    }

    pub fn duplicate_directive(directive: &str, span: Span) -> Self {
        Self::DuplicateDirective {
            directive: directive.to_string(),
            span,
        }
    }

    pub fn invalid_choice(directive: &str, value: &str, allowed: &[&str], span: Span) -> Self {
        Self::InvalidChoice {
            directive: directive.to_string(),
            value: value.to_string(),
            allowed: allowed.join(", "),
            span,
        }
    }

    pub fn out_of_range(directive: &str, value: f64, constraint: &str, span: Span) -> Self {
        Self::ValueOutOfRange {
            directive: directive.to_string(),
            value,
            constraint: constraint.to_string(),
            span,
        }
    }

    pub fn invalid_number(directive: &str, text: &str, span: Span) -> Self {
        Self::InvalidNumber {
            directive: directive.to_string(),
            text: text.to_string(),
            span,
        }
    }

    pub fn not_allowed(directive: &str, variant: &str, span: Span) -> Self {
        Self::DirectiveNotAllowed {
            directive: directive.to_string(),
            variant: variant.to_string(),
            span,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            Self::MissingEnd { .. } => codes::syntax::MISSING_END,
            Self::MissingQuit { .. } => codes::syntax::MISSING_QUIT,
            Self::MissingRequiredDirective { .. } => codes::syntax::MISSING_REQUIRED_DIRECTIVE,
            Self::DuplicateDirective { .. } => codes::syntax::DUPLICATE_DIRECTIVE,
            Self::InvalidChoice { .. } => codes::syntax::INVALID_CHOICE,
            Self::ValueOutOfRange { .. } => codes::syntax::VALUE_OUT_OF_RANGE,
            Self::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            Self::DirectiveNotAllowed { .. } => codes::syntax::DIRECTIVE_NOT_ALLOWED,
            Self::MissingSection { .. } => codes::syntax::MISSING_SECTION,
            Self::TooManySections { .. } => codes::syntax::TOO_MANY_SECTIONS,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEndOfInput { span, .. }
            | Self::MissingEnd { span, .. }
            | Self::MissingQuit { span }
            | Self::MissingRequiredDirective { span, .. }
            | Self::DuplicateDirective { span, .. }
            | Self::InvalidChoice { span, .. }
            | Self::ValueOutOfRange { span, .. }
            | Self::InvalidNumber { span, .. }
            | Self::DirectiveNotAllowed { span, .. }
            | Self::MissingSection { span, .. }
            | Self::TooManySections { span, .. } => *span,
        }
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}

/// A decoder failure located in the source text.
///
/// `Display` renders the multi-line banner with the offending line and a
/// caret under the reported column.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub filename: String,
    /// 1-based
    pub line: u32,
    /// 1-based
    pub column: u32,
    pub line_text: String,
    pub message: String,
    pub code: Code,
    caret: String,
}

pub const DEFAULT_FILENAME: &str = "<string>";

impl Diagnostic {
    pub fn new(
        filename: &str,
        line: u32,
        column: u32,
        source_map: &SourceMap,
        message: String,
        code: Code,
    ) -> Self {
        let line_text = source_map.get_line(line).unwrap_or_default().to_string();
        let caret = source_map.caret_line(line, column);
        Self {
            filename: filename.to_string(),
            line,
            column,
            line_text,
            message,
            code,
            caret,
        }
    }

    pub fn from_syntax_error(error: &SyntaxError, source_map: &SourceMap, filename: &str) -> Self {
        let start = error.span().start();
        Self::new(
            filename,
            start.line,
            start.column,
            source_map,
            error.to_string(),
            error.error_code(),
        )
    }

    pub fn from_lexer_error(error: &LexerError, source_map: &SourceMap, filename: &str) -> Self {
        let (line, column) = error
            .location()
            .unwrap_or_else(|| {
                let end = source_map.position_at(source_map.source.len());
                (end.line, end.column)
            });
        Self::new(
            filename,
            line,
            column,
            source_map,
            error.to_string(),
            error.error_code(),
        )
    }

    /// Zero-based offset of the caret within the line text
    pub fn caret_offset(&self) -> usize {
        self.column.saturating_sub(1) as usize
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(BANNER_WIDTH);
        let light = "-".repeat(BANNER_WIDTH);
        writeln!(f, "{}", heavy)?;
        writeln!(f, "{}", self.message)?;
        writeln!(f, "Filename: {}", self.filename)?;
        writeln!(f, "Line Number: {}", self.line)?;
        writeln!(f, "Column: {}", self.column)?;
        writeln!(f, "{}", light)?;
        writeln!(f, "Line:")?;
        writeln!(f, "{}", self.line_text)?;
        writeln!(f, "{}", self.caret)?;
        write!(f, "{}", light)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    #[test]
    fn test_error_codes() {
        let span = Span::dummy();
        assert_eq!(
            SyntaxError::missing_end("ELEC", span).error_code(),
            codes::syntax::MISSING_END
        );
        assert_eq!(
            SyntaxError::duplicate_directive("pdie", span).error_code().as_str(),
            "E045"
        );
        assert_eq!(
            SyntaxError::out_of_range("pdie", 0.5, "at least 1", span).to_string(),
            "Value for pdie, 0.5, must be at least 1"
        );
    }

    #[test]
    fn test_banner_layout() {
        let source_map = SourceMap::new("ELEC\n  pdie 0.5\nEND\n".to_string());
        let span = Span::new(Position::new(12, 2, 8), Position::new(15, 2, 11));
        let error = SyntaxError::out_of_range("pdie", 0.5, "at least 1", span);
        let diagnostic = Diagnostic::from_syntax_error(&error, &source_map, "apbs.in");

        let rendered = diagnostic.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "=".repeat(70));
        assert_eq!(lines[1], "Value for pdie, 0.5, must be at least 1");
        assert_eq!(lines[2], "Filename: apbs.in");
        assert_eq!(lines[3], "Line Number: 2");
        assert_eq!(lines[4], "Column: 8");
        assert_eq!(lines[5], "-".repeat(70));
        assert_eq!(lines[6], "Line:");
        assert_eq!(lines[7], "  pdie 0.5");
        assert_eq!(lines[8], "       ^");
        assert_eq!(lines[9], "-".repeat(70));
        assert_eq!(diagnostic.caret_offset(), 7);
    }

    #[test]
    fn test_lexer_error_diagnostic() {
        let source_map = SourceMap::new("dime 1 2 99999999999999999999\n".to_string());
        let error = LexerError::InvalidNumber {
            text: "99999999999999999999".to_string(),
            line: 1,
            column: 10,
        };
        let diagnostic = Diagnostic::from_lexer_error(&error, &source_map, DEFAULT_FILENAME);
        assert_eq!(diagnostic.filename, "<string>");
        assert_eq!(diagnostic.code, codes::lexical::INVALID_NUMBER);
        assert_eq!(diagnostic.line_text, "dime 1 2 99999999999999999999");
    }

    #[test]
    fn test_unlocated_lexer_error_points_at_end_of_input() {
        let source_map = SourceMap::new("READ\n  mol pqr x.pqr".to_string());
        let error = LexerError::TooManyTokens { count: 5, limit: 4 };
        let diagnostic = Diagnostic::from_lexer_error(&error, &source_map, DEFAULT_FILENAME);
        assert_eq!((diagnostic.line, diagnostic.column), (2, 16));
        assert_eq!(diagnostic.line_text, "  mol pqr x.pqr");
    }
}
