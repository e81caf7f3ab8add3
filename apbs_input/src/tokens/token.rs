//! Tokens of the legacy APBS input language
//!
//! The language has no reserved words at the lexical level: section names,
//! directive keywords, enumerated values and paths are all plain words.
//! Keyword recognition is case-insensitive and happens in the grammar, which
//! compares against the lowercased text while paths keep the source text.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    // === LITERALS ===
    /// Integer literal, `[+-]?[0-9]+`
    Integer(i64),
    /// Floating point literal with a fraction or an exponent
    Float(f64),

    /// Any other run of printable characters: keywords, identifiers, paths
    Word(String),

    // === PRINT OPERATORS ===
    /// Stand-alone `+`
    Plus,
    /// Stand-alone `-`
    Minus,

    // === WHITESPACE AND STRUCTURE ===
    Space,
    Tab,
    Newline,
    /// Comment (`#` to end of line), text excludes the `#`
    Comment(String),
    /// End of file marker
    Eof,
}

impl Token {
    /// Check if this token is a word matching `keyword` case-insensitively
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Self::Word(word) if word.eq_ignore_ascii_case(keyword))
    }

    /// Lowercased keyword form of a word token
    pub fn as_keyword(&self) -> Option<String> {
        match self {
            Self::Word(word) => Some(word.to_ascii_lowercase()),
            _ => None,
        }
    }

    /// Numeric value for integer and float tokens
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, Self::Space | Self::Tab | Self::Newline)
    }

    /// Check if this token should be ignored during parsing
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            Self::Space | Self::Tab | Self::Newline | Self::Comment(_)
        )
    }

    pub fn is_significant(&self) -> bool {
        !self.is_ignorable()
    }

    /// Short description used in "expected X, found Y" messages
    pub fn describe(&self) -> String {
        match self {
            Self::Integer(i) => format!("integer '{}'", i),
            Self::Float(f) => format!("number '{}'", f),
            Self::Word(w) => format!("'{}'", w),
            Self::Plus => "'+'".to_string(),
            Self::Minus => "'-'".to_string(),
            Self::Space | Self::Tab | Self::Newline => "whitespace".to_string(),
            Self::Comment(_) => "comment".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }

    /// Get the token as it would appear in an input file
    pub fn as_source_string(&self) -> String {
        match self {
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => format!("{:?}", f),
            Self::Word(w) => w.clone(),
            Self::Plus => "+".to_string(),
            Self::Minus => "-".to_string(),
            Self::Space => " ".to_string(),
            Self::Tab => "\t".to_string(),
            Self::Newline => "\n".to_string(),
            Self::Comment(text) => format!("#{}", text),
            Self::Eof => "<EOF>".to_string(),
        }
    }

    pub fn token_class(&self) -> TokenClass {
        match self {
            Self::Integer(_) | Self::Float(_) => TokenClass::Literal,
            Self::Word(_) => TokenClass::Word,
            Self::Plus | Self::Minus => TokenClass::Operator,
            Self::Space | Self::Tab | Self::Newline => TokenClass::Whitespace,
            Self::Comment(_) | Self::Eof => TokenClass::Special,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_source_string())
    }
}

/// Token classification used by lexical metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Literal,
    Word,
    Operator,
    Whitespace,
    Special,
}
