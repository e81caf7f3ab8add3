//! Atomic builders: single-token productions shared by every section
//!
//! Each builder consumes the tokens it recognises and leaves the stream on
//! the first token it does not own. Failures carry the span of the token
//! that broke the production.

use crate::grammar::keywords::{deprecated_value, is_structural, Bound};
use crate::mapping::Value;
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::tokens::{SpannedToken, Token};
use crate::utils::Span;

/// Parser interface the builders drive
pub trait Parser {
    // === NAVIGATION ===
    fn current(&self) -> Option<&SpannedToken>;
    fn advance(&mut self) -> Option<SpannedToken>;

    // === SOURCE ACCESS ===
    /// Span of the current token, or of the end of input
    fn current_span(&self) -> Span;
    /// Source text of a token with its original casing
    fn lexeme(&self, token: &SpannedToken) -> String;

    // === DIAGNOSTICS ===
    /// Record a deprecated spelling that was rewritten in place
    fn report_deprecation(&mut self, original: &str, replacement: &str, span: Span);

    fn current_token(&self) -> Option<&Token> {
        self.current().map(|t| &t.value)
    }

    fn at_end_of_input(&self) -> bool {
        matches!(self.current_token(), None | Some(Token::Eof))
    }

    /// Lowercased word at the current position
    fn current_keyword(&self) -> Option<String> {
        self.current_token().and_then(Token::as_keyword)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.current_token().map_or(false, |t| t.is_keyword(keyword))
    }
}

fn found(parser: &dyn Parser) -> String {
    parser
        .current_token()
        .map_or_else(|| "end of input".to_string(), Token::describe)
}

/// Consume the current token as a payload value.
///
/// Section delimiters are never swallowed as values so that a missing
/// argument is reported where the argument should have been.
pub fn expect_value_token(parser: &mut dyn Parser, expected: &str) -> SyntaxResult<SpannedToken> {
    if parser.at_end_of_input() {
        return Err(SyntaxError::unexpected_end_of_input(
            expected,
            parser.current_span(),
        ));
    }

    if let Some(Token::Word(word)) = parser.current_token() {
        if is_structural(word) {
            return Err(SyntaxError::unexpected_token(
                expected,
                &found(parser),
                parser.current_span(),
            ));
        }
    }

    parser.advance().ok_or_else(|| {
        SyntaxError::unexpected_end_of_input(expected, parser.current_span())
    })
}

/// Consume a specific keyword, case-insensitively
pub fn expect_keyword(parser: &mut dyn Parser, keyword: &str) -> SyntaxResult<Span> {
    if parser.at_keyword(keyword) {
        let span = parser.current_span();
        parser.advance();
        return Ok(span);
    }

    let expected = format!("'{}'", keyword.to_ascii_uppercase());
    if parser.at_end_of_input() {
        Err(SyntaxError::unexpected_end_of_input(&expected, parser.current_span()))
    } else {
        Err(SyntaxError::unexpected_token(&expected, &found(parser), parser.current_span()))
    }
}

fn looks_numeric(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '.' | '+' | '-'))
}

fn non_number_error(parser: &dyn Parser, directive: &str, expected: &str) -> SyntaxError {
    let span = parser.current_span();
    match parser.current_token() {
        Some(Token::Word(word)) if looks_numeric(word) => {
            SyntaxError::invalid_number(directive, word, span)
        }
        Some(Token::Eof) | None => SyntaxError::unexpected_end_of_input(expected, span),
        _ => SyntaxError::unexpected_token(expected, &found(parser), span),
    }
}

pub fn parse_integer(parser: &mut dyn Parser, directive: &str) -> SyntaxResult<i64> {
    match parser.current_token() {
        Some(Token::Integer(value)) => {
            let value = *value;
            parser.advance();
            Ok(value)
        }
        _ => Err(non_number_error(parser, directive, "integer")),
    }
}

/// Integer or float, kept as lexed
pub fn parse_number(parser: &mut dyn Parser, directive: &str) -> SyntaxResult<Value> {
    let value = match parser.current_token() {
        Some(Token::Integer(i)) => Value::Integer(*i),
        Some(Token::Float(f)) => Value::Float(*f),
        _ => return Err(non_number_error(parser, directive, "number")),
    };
    parser.advance();
    Ok(value)
}

pub fn parse_bounded(parser: &mut dyn Parser, directive: &str, bound: Bound) -> SyntaxResult<Value> {
    let span = parser.current_span();
    let value = parse_number(parser, directive)?;
    let number = value.as_f64().unwrap_or(f64::NAN);
    if bound.contains(number) {
        Ok(value)
    } else {
        Err(SyntaxError::out_of_range(directive, number, &bound.describe(), span))
    }
}

/// A letter or digit followed by letters, digits, `_` or `-`
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}

/// Alias name; a bare integer stays an integer
pub fn parse_identifier(parser: &mut dyn Parser) -> SyntaxResult<Value> {
    match parser.current_token() {
        Some(Token::Integer(i)) => {
            let value = Value::Integer(*i);
            parser.advance();
            Ok(value)
        }
        Some(Token::Word(word)) if is_identifier(word) && !is_structural(word) => {
            let value = Value::Text(word.clone());
            parser.advance();
            Ok(value)
        }
        Some(Token::Eof) | None => Err(SyntaxError::unexpected_end_of_input(
            "identifier",
            parser.current_span(),
        )),
        _ => Err(SyntaxError::unexpected_token(
            "identifier",
            &found(parser),
            parser.current_span(),
        )),
    }
}

/// Any printable run, case preserved
pub fn parse_path(parser: &mut dyn Parser) -> SyntaxResult<Value> {
    let token = expect_value_token(parser, "path")?;
    Ok(Value::Text(parser.lexeme(&token)))
}

/// One of a closed set of lowercase values.
///
/// Deprecated spellings registered for `directive` are rewritten to their
/// replacement and reported. Values that lex as integers stay integers.
pub fn parse_choice(
    parser: &mut dyn Parser,
    directive: &str,
    allowed: &[&str],
) -> SyntaxResult<Value> {
    let expected = format!("one of {}", allowed.join(", "));
    let token = expect_value_token(parser, &expected)?;
    let word = parser.lexeme(&token).to_ascii_lowercase();

    if allowed.contains(&word.as_str()) {
        return Ok(match token.value {
            Token::Integer(i) => Value::Integer(i),
            _ => Value::Text(word),
        });
    }

    if let Some(replacement) = deprecated_value(directive, &word) {
        parser.report_deprecation(&word, replacement, token.span);
        return Ok(Value::Text(replacement.to_string()));
    }

    Err(SyntaxError::invalid_choice(directive, &word, allowed, token.span))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::lexical::tokenize_str;
    use crate::tokens::TokenStream;

    /// Minimal parser over a token stream for builder tests
    pub struct StreamParser {
        pub stream: TokenStream,
        pub deprecations: Vec<(String, String)>,
    }

    impl StreamParser {
        pub fn new(source: &str) -> Self {
            Self {
                stream: tokenize_str(source).unwrap(),
                deprecations: Vec::new(),
            }
        }
    }

    impl Parser for StreamParser {
        fn current(&self) -> Option<&SpannedToken> {
            self.stream.current()
        }

        fn advance(&mut self) -> Option<SpannedToken> {
            self.stream.advance()
        }

        fn current_span(&self) -> Span {
            self.stream.error_span()
        }

        fn lexeme(&self, token: &SpannedToken) -> String {
            self.stream.lexeme(token)
        }

        fn report_deprecation(&mut self, original: &str, replacement: &str, _span: Span) {
            self.deprecations
                .push((original.to_string(), replacement.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StreamParser;
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_number_keeps_integer_float_distinction() {
        let mut p = StreamParser::new("1 1.0 2e1");
        assert_eq!(parse_number(&mut p, "x").unwrap(), Value::Integer(1));
        assert_eq!(parse_number(&mut p, "x").unwrap(), Value::Float(1.0));
        assert_eq!(parse_number(&mut p, "x").unwrap(), Value::Float(20.0));
    }

    #[test]
    fn test_malformed_number() {
        let mut p = StreamParser::new("2.0.1");
        assert_matches!(
            parse_number(&mut p, "pdie"),
            Err(SyntaxError::InvalidNumber { ref text, .. }) if text == "2.0.1"
        );
        let mut p = StreamParser::new("abc");
        assert_matches!(parse_integer(&mut p, "nlev"), Err(SyntaxError::UnexpectedToken { .. }));
        let mut p = StreamParser::new("2.5");
        assert_matches!(parse_integer(&mut p, "nlev"), Err(SyntaxError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_bounded_rejects_out_of_range() {
        let mut p = StreamParser::new("0.5");
        assert_matches!(
            parse_bounded(&mut p, "pdie", Bound::AtLeast(1.0)),
            Err(SyntaxError::ValueOutOfRange { value, .. }) if value == 0.5
        );
        let mut p = StreamParser::new("1");
        assert_eq!(
            parse_bounded(&mut p, "pdie", Bound::AtLeast(1.0)).unwrap(),
            Value::Integer(1)
        );
    }

    #[test]
    fn test_choice_lowercases_and_rewrites() {
        let mut p = StreamParser::new("SDH mem bogus");
        let allowed = crate::grammar::keywords::BCFL_VALUES;
        assert_eq!(parse_choice(&mut p, "bcfl", allowed).unwrap(), Value::from("sdh"));
        assert_eq!(parse_choice(&mut p, "bcfl", allowed).unwrap(), Value::from("mdh"));
        assert_eq!(p.deprecations, vec![("mem".to_string(), "mdh".to_string())]);
        assert_matches!(
            parse_choice(&mut p, "bcfl", allowed),
            Err(SyntaxError::InvalidChoice { .. })
        );
    }

    #[test]
    fn test_path_preserves_case_and_rejects_end() {
        let mut p = StreamParser::new("Data/Mol1.PQR END");
        assert_eq!(parse_path(&mut p).unwrap(), Value::from("Data/Mol1.PQR"));
        assert_matches!(parse_path(&mut p), Err(SyntaxError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("mol-1"));
        assert!(is_identifier("complex_2"));
        assert!(!is_identifier("_x"));
        assert!(!is_identifier("a.pqr"));
        let mut p = StreamParser::new("3 mol1");
        assert_eq!(parse_identifier(&mut p).unwrap(), Value::Integer(3));
        assert_eq!(parse_identifier(&mut p).unwrap(), Value::from("mol1"));
        assert_matches!(
            parse_identifier(&mut p),
            Err(SyntaxError::UnexpectedEndOfInput { .. })
        );
    }
}
