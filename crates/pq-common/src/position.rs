use std::cmp::Ordering;

use serde::Serialize;

/// A position within a single line of text.
///
/// `code_unit` is a UTF-8 byte offset into the line; `column_grapheme` is the
/// grapheme-cluster column, used only when rendering user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinePosition {
    pub code_unit: u32,
    pub column_grapheme: u32,
}

/// An absolute position of a token boundary within a document.
///
/// `code_unit` is the byte offset into the joined document text;
/// `line_number` and `line_code_unit` locate the same spot line-relative.
/// Lines are numbered from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenPosition {
    pub line_number: u32,
    pub line_code_unit: u32,
    pub code_unit: u32,
}

/// The token-index and position span covered by a parsed node.
/// `position_end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenRange {
    pub token_index_start: u32,
    pub token_index_end: u32,
    pub position_start: TokenPosition,
    pub position_end: TokenPosition,
}

/// A cursor position supplied by an editor: a line number plus a byte offset
/// within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line_number: u32,
    pub line_code_unit: u32,
}

impl Position {
    pub fn new(line_number: u32, line_code_unit: u32) -> Self {
        Self {
            line_number,
            line_code_unit,
        }
    }

    fn key(&self) -> (u32, u32) {
        (self.line_number, self.line_code_unit)
    }

    /// Compare this cursor against a token boundary.
    pub fn cmp_token(&self, boundary: &TokenPosition) -> Ordering {
        self.key()
            .cmp(&(boundary.line_number, boundary.line_code_unit))
    }

    /// Whether the cursor sits on the range: `start <= cursor < end`.
    pub fn is_in_range(&self, range: &TokenRange) -> bool {
        self.cmp_token(&range.position_start) != Ordering::Less
            && self.cmp_token(&range.position_end) == Ordering::Less
    }

    /// Whether the cursor sits exactly on the range's exclusive end.
    pub fn is_at_range_end(&self, range: &TokenRange) -> bool {
        self.cmp_token(&range.position_end) == Ordering::Equal
    }

    /// Whether the cursor is at or past the range's exclusive end.
    pub fn is_after_range(&self, range: &TokenRange) -> bool {
        self.cmp_token(&range.position_end) != Ordering::Less
    }

    /// Whether the cursor is strictly before the range start.
    pub fn is_before_range(&self, range: &TokenRange) -> bool {
        self.cmp_token(&range.position_start) == Ordering::Less
    }
}

/// A user-facing position: line plus grapheme column rather than byte offset.
///
/// Grapheme columns are what an editor's column indicator shows, so error
/// messages report these instead of raw byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphemePosition {
    pub line_number: u32,
    pub line_code_unit: u32,
    pub column_grapheme: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary(line: u32, code_unit: u32) -> TokenPosition {
        TokenPosition {
            line_number: line,
            line_code_unit: code_unit,
            code_unit,
        }
    }

    fn range(start: (u32, u32), end: (u32, u32)) -> TokenRange {
        TokenRange {
            token_index_start: 0,
            token_index_end: 1,
            position_start: boundary(start.0, start.1),
            position_end: boundary(end.0, end.1),
        }
    }

    #[test]
    fn cursor_in_range() {
        let r = range((0, 2), (0, 5));
        assert!(!Position::new(0, 1).is_in_range(&r));
        assert!(Position::new(0, 2).is_in_range(&r));
        assert!(Position::new(0, 4).is_in_range(&r));
        // Exclusive end.
        assert!(!Position::new(0, 5).is_in_range(&r));
        assert!(Position::new(0, 5).is_at_range_end(&r));
    }

    #[test]
    fn cursor_across_lines() {
        let r = range((1, 0), (2, 3));
        assert!(Position::new(0, 99).is_before_range(&r));
        assert!(Position::new(1, 7).is_in_range(&r));
        assert!(Position::new(2, 2).is_in_range(&r));
        assert!(Position::new(2, 3).is_after_range(&r));
        assert!(Position::new(3, 0).is_after_range(&r));
    }
}
