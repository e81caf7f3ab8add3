//! Span-accurate token stream for the legacy parser
//!
//! Whitespace and comments are kept in `all_tokens` so spans stay exact, but
//! navigation only ever visits significant tokens.

use crate::{
    tokens::token::*,
    utils::{SourceMap, Span, Spanned},
};

/// A token with span information
pub type SpannedToken = Spanned<Token>;

#[derive(Debug, Clone)]
pub struct TokenStream {
    /// All tokens (including whitespace and comments) with original spans
    all_tokens: Vec<SpannedToken>,
    /// Indices into all_tokens for significant tokens
    significant_indices: Vec<usize>,
    /// Current position in significant_indices
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        let mut stream = Self {
            all_tokens: tokens,
            significant_indices: Vec::new(),
            position: 0,
            source_map: None,
        };
        stream.rebuild_significant_indices();
        stream
    }

    /// Create stream with source map so lexemes and line text are available
    pub fn with_source_map(tokens: Vec<SpannedToken>, source_map: SourceMap) -> Self {
        let mut stream = Self::new(tokens);
        stream.source_map = Some(source_map);
        stream
    }

    fn rebuild_significant_indices(&mut self) {
        self.significant_indices = self
            .all_tokens
            .iter()
            .enumerate()
            .filter(|(_, spanned)| spanned.value.is_significant())
            .map(|(i, _)| i)
            .collect();

        crate::log_debug!("Token stream built",
            "total_tokens" => self.all_tokens.len(),
            "significant_tokens" => self.significant_indices.len()
        );

        self.position = 0;
    }

    // === NAVIGATION ===

    pub fn current(&self) -> Option<&SpannedToken> {
        self.peek_ahead(0)
    }

    pub fn current_token(&self) -> Option<&Token> {
        self.current().map(|spanned| &spanned.value)
    }

    pub fn current_span(&self) -> Option<Span> {
        self.current().map(|spanned| spanned.span)
    }

    pub fn peek(&self) -> Option<&SpannedToken> {
        self.peek_ahead(1)
    }

    /// Peek ahead by n positions in significant tokens
    pub fn peek_ahead(&self, n: usize) -> Option<&SpannedToken> {
        self.significant_indices
            .get(self.position + n)
            .and_then(|&original_index| self.all_tokens.get(original_index))
    }

    /// Move past the current token, returning it
    pub fn advance(&mut self) -> Option<SpannedToken> {
        let current = self.current().cloned();
        if self.position < self.significant_indices.len() {
            self.position += 1;
        }
        current
    }

    /// True at the end marker or when the tokens run out
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_token(), None | Some(Token::Eof))
    }

    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant_indices.is_empty()
    }

    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, saved_position: usize) {
        self.position = saved_position.min(self.significant_indices.len());
    }

    pub fn remaining_count(&self) -> usize {
        self.significant_indices.len().saturating_sub(self.position)
    }

    // === SPANS AND SOURCE TEXT ===

    /// Span of the current token, or of the last token once exhausted
    pub fn error_span(&self) -> Span {
        self.current_span()
            .or_else(|| self.all_tokens.last().map(|t| t.span))
            .unwrap_or_else(Span::dummy)
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    pub fn source_text(&self, span: &Span) -> Option<&str> {
        self.source_map.as_ref().map(|sm| span.slice(&sm.source))
    }

    /// Original text of a token, which keeps the casing of paths
    pub fn lexeme(&self, token: &SpannedToken) -> String {
        match self.source_text(&token.span) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => token.value.as_source_string(),
        }
    }

    pub fn all_tokens(&self) -> &[SpannedToken] {
        &self.all_tokens
    }

    pub fn diagnostic(&self) -> String {
        let current_info = match self.current() {
            Some(current) => format!("'{}' at {}", current.value, current.span),
            None => "<EOF>".to_string(),
        };
        format!(
            "TokenStream(pos: {}/{}, current: {})",
            self.position,
            self.significant_indices.len(),
            current_info
        )
    }
}
