//! Legacy input parser
//!
//! Drives the section grammars over a token stream, collects deprecation
//! warnings and turns the first failure into a located [`Diagnostic`].

use crate::config::runtime::DecoderPreferences;
use crate::grammar::builders::{atomic::Parser, parse_input};
use crate::lexical::LexicalAnalyzer;
use crate::logging::codes;
use crate::mapping::InputMapping;
use crate::syntax::error::{Diagnostic, SyntaxError, SyntaxResult, DEFAULT_FILENAME};
use crate::tokens::{SpannedToken, TokenStream};
use crate::utils::{SourceMap, Span};
use crate::{log_debug, log_error, log_success, log_warning};
use std::fmt;

/// A deprecated spelling that was replaced during decoding
#[derive(Debug, Clone, PartialEq)]
pub struct DeprecationWarning {
    pub line: u32,
    pub column: u32,
    pub span: Span,
    pub original: String,
    pub replacement: String,
}

impl fmt::Display for DeprecationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WARNING: line {}, column {}: '{}' is deprecated, using '{}'",
            self.line, self.column, self.original, self.replacement
        )
    }
}

/// Successful decode: the canonical mapping plus warnings in source order
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedInput {
    pub mapping: InputMapping,
    pub warnings: Vec<DeprecationWarning>,
}

pub struct LegacyParser {
    tokens: TokenStream,
    warnings: Vec<DeprecationWarning>,
    log_deprecations: bool,
}

impl LegacyParser {
    pub fn new(tokens: TokenStream) -> Self {
        log_debug!("Creating legacy parser", "tokens" => tokens.len());
        Self {
            tokens,
            warnings: Vec::new(),
            log_deprecations: true,
        }
    }

    pub fn with_preferences(tokens: TokenStream, preferences: &DecoderPreferences) -> Self {
        let mut parser = Self::new(tokens);
        parser.log_deprecations = preferences.warn_on_deprecated;
        parser
    }

    pub fn warnings(&self) -> &[DeprecationWarning] {
        &self.warnings
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.tokens.source_map()
    }

    /// Parse the whole deck, consuming the parser
    pub fn parse(mut self) -> SyntaxResult<DecodedInput> {
        let mapping = parse_input(&mut self)?;
        Ok(DecodedInput {
            mapping,
            warnings: self.warnings,
        })
    }
}

impl Parser for LegacyParser {
    fn current(&self) -> Option<&SpannedToken> {
        self.tokens.current()
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        self.tokens.advance()
    }

    fn current_span(&self) -> Span {
        self.tokens.error_span()
    }

    fn lexeme(&self, token: &SpannedToken) -> String {
        self.tokens.lexeme(token)
    }

    fn report_deprecation(&mut self, original: &str, replacement: &str, span: Span) {
        let start = span.start();
        if self.log_deprecations {
            log_warning!(
                codes::syntax::DEPRECATED_KEYWORD,
                "Deprecated keyword replaced",
                span = span,
                "original" => original,
                "replacement" => replacement
            );
        }
        self.warnings.push(DeprecationWarning {
            line: start.line,
            column: start.column,
            span,
            original: original.to_string(),
            replacement: replacement.to_string(),
        });
    }
}

/// Decode legacy input text held in memory
pub fn parse_string(text: &str) -> Result<DecodedInput, Diagnostic> {
    parse_string_named(text, DEFAULT_FILENAME)
}

/// Decode legacy input text, naming `filename` in diagnostics
pub fn parse_string_named(text: &str, filename: &str) -> Result<DecodedInput, Diagnostic> {
    parse_string_with_preferences(text, filename, DecoderPreferences::default())
}

pub fn parse_string_with_preferences(
    text: &str,
    filename: &str,
    preferences: DecoderPreferences,
) -> Result<DecodedInput, Diagnostic> {
    let source_map = SourceMap::new(text.to_string());

    let tokens = LexicalAnalyzer::with_preferences(preferences.clone())
        .tokenize(text.to_string())
        .map_err(|error| {
            log_error!(error.error_code(), "Tokenization failed",
                "file" => filename,
                "error" => &error
            );
            Diagnostic::from_lexer_error(&error, &source_map, filename)
        })?;

    let parser = LegacyParser::with_preferences(tokens, &preferences);
    match parser.parse() {
        Ok(decoded) => {
            log_success!(codes::success::DECODE_COMPLETE, "Legacy input decoded",
                "file" => filename,
                "sections" => decoded.mapping.total_sections(),
                "warnings" => decoded.warnings.len()
            );
            Ok(decoded)
        }
        Err(error) => Err(report(&error, &source_map, filename)),
    }
}

fn report(error: &SyntaxError, source_map: &SourceMap, filename: &str) -> Diagnostic {
    log_error!(error.error_code(), "Decoding failed",
        span = error.span(),
        "file" => filename,
        "error" => error
    );
    Diagnostic::from_syntax_error(error, source_map, filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Value;

    const S1: &str = "\
READ
  mol pqr mol1.pqr
END
ELEC name mol1
  mg-auto
  dime 161 161 161
  ion charge 1 conc 0.050 radius 2.0
  pdie 2.0
  sdie 78.4
  temp 298.15
END
QUIT
";

    #[test]
    fn test_s1_legacy_decode() {
        let decoded = parse_string(S1).unwrap();
        let json = decoded.mapping.to_json().unwrap();
        let expected = serde_json::json!({
            "READ": {"0": {"mol": {"pqr": ["mol1.pqr"]}}},
            "ELEC": {"0": {
                "name": "mol1",
                "type": "mg-auto",
                "dime": [161, 161, 161],
                "ion": {"0": {"charge": 1, "conc": 0.05, "radius": 2.0}},
                "pdie": 2.0,
                "sdie": 78.4,
                "temp": 298.15
            }}
        });
        assert_eq!(json, expected);
        assert!(decoded.warnings.is_empty());
    }

    #[test]
    fn test_s2_deprecation_warning() {
        let text = "READ\n  mol pqr a.pqr\nEND\nELEC\n  fe-manual\n  ekey glob\nEND\nQUIT\n";
        let decoded = parse_string(text).unwrap();
        let elec = decoded.mapping.get("ELEC", 0).unwrap();
        assert_eq!(elec["ekey"], Value::from("global"));

        assert_eq!(decoded.warnings.len(), 1);
        let warning = &decoded.warnings[0];
        assert_eq!((warning.line, warning.column), (6, 8));
        assert_eq!(warning.original, "glob");
        assert_eq!(warning.replacement, "global");
        assert!(warning.to_string().contains("line 6"));
    }

    #[test]
    fn test_s6_print_expression() {
        let text = "READ mol pqr a.pqr END\nELEC mg-auto END\n\
                    PRINT elecEnergy complex - mol2 - mol1 END\nQUIT";
        let decoded = parse_string(text).unwrap();
        assert_eq!(
            decoded.mapping.to_json().unwrap()["PRINT"],
            serde_json::json!({"0": {"elecenergy": ["complex", "-", "mol2", "-", "mol1"]}})
        );
    }

    #[test]
    fn test_repeated_sections_accumulate() {
        let text = "READ mol pqr a.pqr END READ mol pqr b.pqr END APOLAR END QUIT";
        let mapping = parse_string(text).unwrap().mapping;
        let read = mapping.section("READ").unwrap();
        assert_eq!(read.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
        for instance in read.values() {
            assert_eq!(instance["mol"].as_record().map(|r| r.len()), Some(1));
            assert!(instance["mol"].get("pqr").is_some());
        }
    }

    #[test]
    fn test_keys_lowercase_paths_preserved() {
        let text = "read MOL PQR Data/Complex.PQR end\nELEC MG-MANUAL SRFM SMOL \
                    WRITE POT DX Out/Pot END quit";
        let mapping = parse_string(text).unwrap().mapping;
        for (_, _, directives) in mapping.iter_in_order() {
            assert!(directives.keys().all(|k| k == &k.to_ascii_lowercase()));
        }
        let elec = mapping.get("ELEC", 0).unwrap();
        assert_eq!(elec["type"], Value::from("mg-manual"));
        assert_eq!(elec["srfm"], Value::from("smol"));
        assert_eq!(elec["write"].to_string(), "pot dx Out/Pot");
        let read = mapping.get("READ", 0).unwrap();
        assert_eq!(read["mol"].to_string(), "pqr Data/Complex.PQR");
    }

    #[test]
    fn test_comments_and_whitespace_are_separators() {
        let text = "# header\nREAD\tmol pqr a.pqr # trailing\r\nEND\nELEC mg-auto\n\n END QUIT";
        assert!(parse_string(text).is_ok());
    }

    #[test]
    fn test_unrecognised_token_is_located() {
        let text = "READ\n  mol pqr a.pqr\nEND\nELEC\n  mg-auto\n  pdiel 2.0\nEND\nQUIT\n";
        let diagnostic = parse_string_named(text, "bad.in").unwrap_err();
        assert_eq!(diagnostic.filename, "bad.in");
        assert_eq!((diagnostic.line, diagnostic.column), (6, 3));
        assert_eq!(diagnostic.line_text, "  pdiel 2.0");
        assert_eq!(diagnostic.caret_offset(), 2);
        assert_eq!(diagnostic.code, codes::syntax::UNEXPECTED_TOKEN);
    }

    #[test]
    fn test_error_classes() {
        let cases = [
            ("READ mol pqr a.pqr ELEC mg-auto END QUIT", codes::syntax::MISSING_END),
            ("READ mol pqr a.pqr END ELEC mg-auto END", codes::syntax::MISSING_QUIT),
            (
                "READ mol pqr a.pqr END ELEC mg-auto pdie 2 pdie 3 END QUIT",
                codes::syntax::DUPLICATE_DIRECTIVE,
            ),
            (
                "READ mol pqr a.pqr END ELEC mg-auto pdie 2.0.1 END QUIT",
                codes::lexical::INVALID_NUMBER,
            ),
            (
                "READ mol pqr a.pqr END ELEC mg-auto pdie 0.5 END QUIT",
                codes::syntax::VALUE_OUT_OF_RANGE,
            ),
            (
                "READ mol pqr a.pqr END ELEC mg-auto bcfl wall END QUIT",
                codes::syntax::INVALID_CHOICE,
            ),
            ("READ mol pqr a.pqr END ELEC END QUIT", codes::syntax::MISSING_REQUIRED_DIRECTIVE),
        ];
        for (text, code) in cases {
            let diagnostic = parse_string(text).unwrap_err();
            assert_eq!(diagnostic.code, code, "{}", text);
            assert_eq!(diagnostic.filename, DEFAULT_FILENAME);
        }
    }

    #[test]
    fn test_lexer_failure_becomes_diagnostic() {
        let diagnostic = parse_string("READ\u{7} QUIT").unwrap_err();
        assert_eq!(diagnostic.code, codes::lexical::INVALID_CHARACTER);
        assert_eq!(diagnostic.line, 1);
    }
}
