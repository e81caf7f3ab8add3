//! Source location tracking for legacy input decks
//!
//! Positions are 1-based in both line and column; every character, tab
//! included, occupies one column so that diagnostics line up with the
//! offending text when the caret line reuses the source indentation.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Offset 0, line 1, column 1
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance position by one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    /// Advance position over a string
    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Zero-width span at a position, used for end-of-input errors
    pub fn at(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Get the source text for this span from the input
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start.offset..self.end.offset]
    }

    /// Placeholder span for values built programmatically
    pub fn dummy() -> Self {
        Self {
            start: Position::start(),
            end: Position::start(),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A value with its source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Line index over a source text
#[derive(Debug, Clone)]
pub struct SourceMap {
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Line and column for a byte offset
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);

        let line_start = self.line_starts[line];
        let column = self.source[line_start..offset].chars().count();

        Position::new(offset, (line + 1) as u32, (column + 1) as u32)
    }

    /// Text of a 1-based line without its terminator
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        if line_num == 0 {
            return None;
        }

        let line_idx = (line_num - 1) as usize;
        if line_idx >= self.line_starts.len() {
            return None;
        }

        let start = self.line_starts[line_idx];
        let end = if line_idx + 1 < self.line_starts.len() {
            self.line_starts[line_idx + 1] - 1
        } else {
            self.source.len()
        };

        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// Caret marker for a 1-based column of the given line. Leading tabs are
    /// copied from the line so the caret stays aligned in a terminal.
    pub fn caret_line(&self, line_num: u32, column: u32) -> String {
        let width = column.saturating_sub(1) as usize;
        let padding: String = match self.get_line(line_num) {
            Some(line) => line
                .chars()
                .chain(std::iter::repeat(' '))
                .take(width)
                .map(|ch| if ch == '\t' { '\t' } else { ' ' })
                .collect(),
            None => " ".repeat(width),
        };
        format!("{}^", padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance_tracks_lines() {
        let pos = Position::start().advance_str("ab\ncd");
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 5);
    }

    #[test]
    fn test_source_map_position_lookup() {
        let map = SourceMap::new("READ\n  mol pqr x.pqr\nEND\n".to_string());
        let pos = map.position_at(9);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 5);
        assert_eq!(map.get_line(2), Some("  mol pqr x.pqr"));
        assert_eq!(map.get_line(9), None);
    }

    #[test]
    fn test_caret_line_alignment() {
        let map = SourceMap::new("\tpdie 0.5\n".to_string());
        assert_eq!(map.caret_line(1, 7), "\t     ^");
        assert_eq!(map.caret_line(1, 1), "^");
    }

    #[test]
    fn test_span_slice_and_display() {
        let source = "dime 65 65 65";
        let span = Span::new(Position::new(5, 1, 6), Position::new(7, 1, 8));
        assert_eq!(span.slice(source), "65");
        assert_eq!(span.to_string(), "1:6-8");

        let map = SourceMap::new("READ\nEND".to_string());
        assert_eq!(map.position_at(map.source.len()), Position::new(8, 2, 4));
    }
}
