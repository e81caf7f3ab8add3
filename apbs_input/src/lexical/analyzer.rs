//! Lexical analyzer for the legacy input language
//!
//! Input is split on whitespace into words. Each word is classified as an
//! integer, a float, a lone `+`/`-` operator, or a plain word. A `#` that
//! starts a word opens a comment running to the end of the line.

use crate::config::constants::compile_time::lexical::*;
use crate::config::runtime::DecoderPreferences;
use crate::file_processor::FileProcessingResult;
use crate::logging::codes;
use crate::tokens::{SpannedToken, Token, TokenClass, TokenStream};
use crate::utils::{Position, SourceMap, Span, Spanned};
use crate::{log_debug, log_error, log_success};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character: {character:?} at line {line}, column {column}")]
    InvalidCharacter {
        character: char,
        line: u32,
        column: u32,
    },

    #[error("Invalid number format: '{text}'")]
    InvalidNumber { text: String, line: u32, column: u32 },

    #[error("Word too long: {length} characters (max {MAX_WORD_LENGTH})")]
    WordTooLong { length: usize, line: u32, column: u32 },

    #[error("Comment too long: {length} characters (max {MAX_COMMENT_LENGTH})")]
    CommentTooLong { length: usize, line: u32, column: u32 },

    #[error("Too many tokens: {count} (max {limit})")]
    TooManyTokens { count: usize, limit: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::WordTooLong { .. } => codes::lexical::WORD_TOO_LONG,
            LexerError::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    /// 1-based line and column of the offending text, when known
    pub fn location(&self) -> Option<(u32, u32)> {
        match self {
            LexerError::InvalidCharacter { line, column, .. }
            | LexerError::InvalidNumber { line, column, .. }
            | LexerError::WordTooLong { line, column, .. }
            | LexerError::CommentTooLong { line, column, .. } => Some((*line, *column)),
            LexerError::TooManyTokens { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub word_tokens: usize,
    pub integer_tokens: usize,
    pub float_tokens: usize,
    pub operator_tokens: usize,
    pub comment_count: usize,
    pub max_comment_length: usize,
    pub max_word_length: usize,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token) {
        self.total_tokens += 1;

        match token {
            Token::Integer(_) => self.integer_tokens += 1,
            Token::Float(_) => self.float_tokens += 1,
            Token::Word(word) => {
                self.word_tokens += 1;
                self.max_word_length = self.max_word_length.max(word.chars().count());
            }
            Token::Comment(text) => {
                self.comment_count += 1;
                self.max_comment_length = self.max_comment_length.max(text.chars().count());
            }
            _ if token.token_class() == TokenClass::Operator => self.operator_tokens += 1,
            _ => {}
        }
    }
}

pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: DecoderPreferences,
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences: DecoderPreferences::default(),
        }
    }

    pub fn with_preferences(preferences: DecoderPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Tokenize a file that has already passed the file processor checks
    pub fn tokenize_file_result(
        &mut self,
        file_result: FileProcessingResult,
    ) -> Result<TokenStream, LexerError> {
        log_debug!("Starting lexical analysis",
            "file" => file_result.metadata.path.display(),
            "line_count" => file_result.metadata.line_count,
            "file_size_bytes" => file_result.metadata.size
        );
        self.tokenize(file_result.source)
    }

    /// Tokenize in-memory source text
    pub fn tokenize(&mut self, source: String) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();

        let limit = self.preferences.max_token_count.min(MAX_TOKEN_COUNT);
        let mut tokens: Vec<SpannedToken> = Vec::new();
        let mut chars = source.char_indices().peekable();
        let mut pos = Position::start();

        while let Some(&(offset, ch)) = chars.peek() {
            if tokens.len() >= limit {
                let error = LexerError::TooManyTokens {
                    count: tokens.len(),
                    limit,
                };
                log_error!(error.error_code(), "Token limit exceeded",
                    span = Span::at(pos),
                    "limit" => limit
                );
                return Err(error);
            }

            pos = Position::new(offset, pos.line, pos.column);

            let token = match ch {
                ' ' | '\r' => {
                    chars.next();
                    self.single(Token::Space, pos, ch)
                }
                '\t' => {
                    chars.next();
                    self.single(Token::Tab, pos, ch)
                }
                '\n' => {
                    chars.next();
                    self.single(Token::Newline, pos, ch)
                }
                c if c.is_whitespace() => {
                    chars.next();
                    self.single(Token::Space, pos, c)
                }
                '#' => {
                    let mut text = String::new();
                    chars.next();
                    while let Some(&(_, c)) = chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        text.push(c);
                        chars.next();
                    }
                    let length = text.chars().count();
                    if length > MAX_COMMENT_LENGTH {
                        return Err(LexerError::CommentTooLong {
                            length,
                            line: pos.line,
                            column: pos.column,
                        });
                    }
                    let end = pos.advance('#').advance_str(&text);
                    Spanned::new(Token::Comment(text), Span::new(pos, end))
                }
                c if c.is_control() => {
                    let error = LexerError::InvalidCharacter {
                        character: c,
                        line: pos.line,
                        column: pos.column,
                    };
                    log_error!(error.error_code(), "Invalid character in input",
                        span = Span::at(pos),
                        "character" => format!("{:?}", c)
                    );
                    return Err(error);
                }
                _ => {
                    let start = offset;
                    let mut end_offset = offset;
                    while let Some(&(o, c)) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        if c.is_control() {
                            let at = pos.advance_str(&source[start..o]);
                            return Err(LexerError::InvalidCharacter {
                                character: c,
                                line: at.line,
                                column: at.column,
                            });
                        }
                        end_offset = o + c.len_utf8();
                        chars.next();
                    }
                    let text = &source[start..end_offset];
                    let length = text.chars().count();
                    if length > MAX_WORD_LENGTH {
                        return Err(LexerError::WordTooLong {
                            length,
                            line: pos.line,
                            column: pos.column,
                        });
                    }
                    let token = classify_word(text).ok_or_else(|| LexerError::InvalidNumber {
                        text: text.to_string(),
                        line: pos.line,
                        column: pos.column,
                    })?;
                    Spanned::new(token, Span::new(pos, pos.advance_str(text)))
                }
            };

            pos = token.span.end;
            self.metrics.record_token(&token.value);
            tokens.push(token);
        }

        tokens.push(Spanned::new(Token::Eof, Span::at(pos)));

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization complete",
            "tokens" => self.metrics.total_tokens,
            "words" => self.metrics.word_tokens,
            "comments" => self.metrics.comment_count
        );

        Ok(TokenStream::with_source_map(tokens, SourceMap::new(source)))
    }

    fn single(&self, token: Token, pos: Position, ch: char) -> SpannedToken {
        Spanned::new(token, Span::new(pos, pos.advance(ch)))
    }
}

/// Classify one whitespace-delimited word.
///
/// Returns `None` for text that is shaped like an integer but does not fit
/// in 64 bits, or like a float that overflows to infinity.
pub fn classify_word(text: &str) -> Option<Token> {
    match text {
        "+" => return Some(Token::Plus),
        "-" => return Some(Token::Minus),
        _ => {}
    }

    if is_integer_literal(text) {
        return text.parse::<i64>().ok().map(Token::Integer);
    }

    if is_float_literal(text) {
        return text
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Token::Float);
    }

    Some(Token::Word(text.to_string()))
}

fn strip_sign(text: &str) -> &str {
    text.strip_prefix(['+', '-']).unwrap_or(text)
}

/// `[+-]?[0-9]+`
pub fn is_integer_literal(text: &str) -> bool {
    let digits = strip_sign(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?` excluding pure integers
pub fn is_float_literal(text: &str) -> bool {
    let body = strip_sign(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };

    let mantissa_ok = match mantissa.split_once('.') {
        Some((whole, fraction)) => {
            whole.bytes().all(|b| b.is_ascii_digit())
                && fraction.bytes().all(|b| b.is_ascii_digit())
                && !(whole.is_empty() && fraction.is_empty())
        }
        None => !mantissa.is_empty() && mantissa.bytes().all(|b| b.is_ascii_digit()),
    };

    let exponent_ok = match exponent {
        Some(exp) => is_integer_literal(exp),
        None => true,
    };

    let has_fraction_or_exponent = mantissa.contains('.') || exponent.is_some();
    mantissa_ok && exponent_ok && has_fraction_or_exponent
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn significant(source: &str) -> Vec<Token> {
        let mut lexer = LexicalAnalyzer::new();
        let stream = lexer.tokenize(source.to_string()).unwrap();
        stream
            .all_tokens()
            .iter()
            .filter(|t| t.value.is_significant())
            .map(|t| t.value.clone())
            .collect()
    }

    #[test]
    fn test_number_classification() {
        assert_eq!(classify_word("161"), Some(Token::Integer(161)));
        assert_eq!(classify_word("-1"), Some(Token::Integer(-1)));
        assert_eq!(classify_word("+2"), Some(Token::Integer(2)));
        assert_eq!(classify_word("2.0"), Some(Token::Float(2.0)));
        assert_eq!(classify_word("1."), Some(Token::Float(1.0)));
        assert_eq!(classify_word(".5"), Some(Token::Float(0.5)));
        assert_eq!(classify_word("1e3"), Some(Token::Float(1000.0)));
        assert_eq!(classify_word("-2.5E-1"), Some(Token::Float(-0.25)));
    }

    #[test]
    fn test_words_that_look_numeric() {
        assert_eq!(classify_word("1.pqr"), Some(Token::Word("1.pqr".to_string())));
        assert_eq!(classify_word("mol-1"), Some(Token::Word("mol-1".to_string())));
        assert_eq!(classify_word("e5"), Some(Token::Word("e5".to_string())));
        assert_eq!(classify_word("."), Some(Token::Word(".".to_string())));
        assert_eq!(classify_word("1e"), Some(Token::Word("1e".to_string())));
        assert_eq!(classify_word("+"), Some(Token::Plus));
        assert_eq!(classify_word("-"), Some(Token::Minus));
    }

    #[test]
    fn test_integer_overflow_is_invalid() {
        assert_eq!(classify_word("99999999999999999999"), None);
        let mut lexer = LexicalAnalyzer::new();
        let result = lexer.tokenize("dime 99999999999999999999 1 1".to_string());
        assert_matches!(result, Err(LexerError::InvalidNumber { line: 1, column: 6, .. }));
    }

    #[test]
    fn test_comments_are_stripped() {
        let tokens = significant("READ # molecules\n  mol pqr A.pqr\nEND");
        assert_eq!(
            tokens,
            vec![
                Token::Word("READ".to_string()),
                Token::Word("mol".to_string()),
                Token::Word("pqr".to_string()),
                Token::Word("A.pqr".to_string()),
                Token::Word("END".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        let mut lexer = LexicalAnalyzer::new();
        let stream = lexer.tokenize("READ\n\tmol pqr x.pqr\n".to_string()).unwrap();
        let mol = stream
            .all_tokens()
            .iter()
            .find(|t| t.value.is_keyword("mol"))
            .map(|t| t.span.start())
            .unwrap();
        assert_eq!((mol.line, mol.column), (2, 2));
    }

    #[test]
    fn test_control_character_rejected() {
        let mut lexer = LexicalAnalyzer::new();
        let result = lexer.tokenize("READ\u{7}".to_string());
        assert_matches!(result, Err(LexerError::InvalidCharacter { line: 1, column: 5, .. }));
    }

    #[test]
    fn test_token_limit() {
        let prefs = DecoderPreferences {
            max_token_count: 3,
            warn_on_deprecated: true,
        };
        let mut lexer = LexicalAnalyzer::with_preferences(prefs);
        let result = lexer.tokenize("a b c d".to_string());
        assert_matches!(result, Err(LexerError::TooManyTokens { limit: 3, .. }));
    }

    #[test]
    fn test_crlf_input() {
        let tokens = significant("READ\r\nEND\r\n");
        assert_eq!(tokens.len(), 3);
        assert!(tokens[1].is_keyword("end"));
    }

    #[test]
    fn test_metrics_recorded() {
        let mut lexer = LexicalAnalyzer::new();
        lexer.tokenize("dime 65 65 65 # grid\npdie 2.0".to_string()).unwrap();
        let metrics = lexer.metrics();
        assert_eq!(metrics.integer_tokens, 3);
        assert_eq!(metrics.float_tokens, 1);
        assert_eq!(metrics.word_tokens, 2);
        assert_eq!(metrics.comment_count, 1);
    }
}
