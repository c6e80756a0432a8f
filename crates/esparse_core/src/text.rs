//! Position and span types for source location tracking.
//!
//! These types are used throughout the parser to track where AST nodes,
//! tokens, and diagnostics originate in the source code. Offsets count
//! characters from the start of the input; lines are 1-based and columns
//! are 0-based, matching the serialized location contract.

use serde::Serialize;
use std::fmt;

/// A character offset into the source text.
pub type TextPos = u32;

/// A line/column pair.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 0-based column, measured from the start of the line.
    pub column: u32,
}

impl Position {
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The line/column extent of a node or token.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

impl SourceLocation {
    #[inline]
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// The source extent stamped onto every finished AST node: inclusive start
/// offset, exclusive end offset, and the matching line/column location.
///
/// Comment attachment is carried here as well so that any node can hold its
/// leading/trailing trivia without widening every node type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub start: TextPos,
    pub end: TextPos,
    pub loc: SourceLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leading_comments: Option<Vec<crate::trivia::Comment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_comments: Option<Vec<crate::trivia::Comment>>,
}

impl Span {
    pub fn new(start: TextPos, end: TextPos, loc: SourceLocation) -> Self {
        Self {
            start,
            end,
            loc,
            leading_comments: None,
            trailing_comments: None,
        }
    }
}

/// Compute the line/column position of a character offset by scanning the
/// input. Used for diagnostics raised at offsets earlier than the cursor,
/// where no incrementally tracked position is available.
pub fn position_at(text: &[char], offset: usize) -> Position {
    let mut line = 1u32;
    let mut line_start = 0usize;
    for (i, &ch) in text.iter().enumerate() {
        if i >= offset {
            break;
        }
        if ch == '\n' || ch == '\r' || ch == '\u{2028}' || ch == '\u{2029}' {
            // Treat \r\n as a single terminator.
            if ch == '\r' && text.get(i + 1) == Some(&'\n') {
                continue;
            }
            line += 1;
            line_start = i + 1;
        }
    }
    Position::new(line, (offset - line_start) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_at_single_line() {
        let text: Vec<char> = "let x = 1;".chars().collect();
        assert_eq!(position_at(&text, 0), Position::new(1, 0));
        assert_eq!(position_at(&text, 4), Position::new(1, 4));
    }

    #[test]
    fn test_position_at_multi_line() {
        let text: Vec<char> = "a;\nbb;\nccc;".chars().collect();
        assert_eq!(position_at(&text, 3), Position::new(2, 0));
        assert_eq!(position_at(&text, 5), Position::new(2, 2));
        assert_eq!(position_at(&text, 7), Position::new(3, 0));
    }

    #[test]
    fn test_position_at_crlf() {
        let text: Vec<char> = "a;\r\nb;".chars().collect();
        assert_eq!(position_at(&text, 4), Position::new(2, 0));
    }

    #[test]
    fn test_span_serialization_omits_empty_comments() {
        let span = Span::new(
            0,
            3,
            SourceLocation::new(Position::new(1, 0), Position::new(1, 3)),
        );
        let json = serde_json::to_value(&span).unwrap();
        assert_eq!(json["start"], 0);
        assert_eq!(json["end"], 3);
        assert_eq!(json["loc"]["start"]["line"], 1);
        assert!(json.get("leadingComments").is_none());
    }
}
