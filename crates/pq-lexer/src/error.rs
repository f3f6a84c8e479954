//! Lex error types.
//!
//! Per-line failures are captured in the owning [`Line`](crate::Line) rather
//! than failing the whole document; the variants here also cover the
//! document-level operations (bad line numbers, bad ranges, snapshots over
//! errored states).

use std::fmt;

use serde::Serialize;

use pq_common::locale::LocaleCatalog;
use pq_common::position::GraphemePosition;

use crate::Range;

/// Everything that can go wrong while lexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LexError {
    /// A line number outside the document was supplied.
    BadLineNumber {
        kind: BadLineNumberKind,
        line_number: u32,
        num_lines: u32,
    },
    /// An update range that does not describe a span inside the document.
    BadRange { kind: BadRangeKind, range: Range },
    /// A line that already failed was asked to re-lex without its text
    /// changing; wraps the stored failure.
    BadState { inner: Box<LexError> },
    /// A read was attempted past the last token.
    EndOfStream,
    /// One or more lines hold errors, keyed by line number.
    ErrorLineMap { errors: Vec<(u32, LexError)> },
    /// A literal opener was read but the literal's body never appeared.
    Expected {
        kind: ExpectedKind,
        position: GraphemePosition,
    },
    /// The line ended in the middle of a token.
    UnexpectedEof { position: GraphemePosition },
    /// A character that cannot begin any token.
    UnexpectedRead { position: GraphemePosition },
    /// A multiline token was opened but never closed anywhere below it.
    UnterminatedMultilineToken {
        kind: UnterminatedMultilineTokenKind,
        position: GraphemePosition,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BadLineNumberKind {
    GreaterThanNumLines,
    /// Reserved for hosts converting from signed editor coordinates.
    LessThanZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BadRangeKind {
    SameLineCodeUnitStartGreaterThanCodeUnitEnd,
    LineNumberStartGreaterThanLineNumberEnd,
    LineNumberStartLessThanZero,
    LineNumberStartGreaterThanNumLines,
    LineNumberEndGreaterThanNumLines,
    CodeUnitStartGreaterThanLineLength,
    CodeUnitEndGreaterThanLineLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExpectedKind {
    HexLiteral,
    KeywordOrIdentifier,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnterminatedMultilineTokenKind {
    Comment,
    QuotedIdentifier,
    String,
}

impl LexError {
    /// Render the user-facing message through the given catalog.
    pub fn message(&self, catalog: &LocaleCatalog) -> String {
        match self {
            Self::BadLineNumber {
                kind,
                line_number,
                num_lines,
            } => {
                let code = match kind {
                    BadLineNumberKind::GreaterThanNumLines => {
                        "error_lex_lineNumber_greaterThanNumLines"
                    }
                    BadLineNumberKind::LessThanZero => "error_lex_lineNumber_lessThanZero",
                };
                catalog.format(
                    code,
                    &[
                        ("lineNumber", &line_number.to_string()),
                        ("numLines", &num_lines.to_string()),
                    ],
                )
            }
            Self::BadRange { kind, range } => {
                let code = match kind {
                    BadRangeKind::SameLineCodeUnitStartGreaterThanCodeUnitEnd => {
                        "error_lex_badRange_sameLine_codeUnitStartGreaterThanCodeUnitEnd"
                    }
                    BadRangeKind::LineNumberStartGreaterThanLineNumberEnd => {
                        "error_lex_badRange_lineNumberStart_greaterThanLineNumberEnd"
                    }
                    BadRangeKind::LineNumberStartLessThanZero => {
                        "error_lex_badRange_lineNumberStart_lessThanZero"
                    }
                    BadRangeKind::LineNumberStartGreaterThanNumLines => {
                        "error_lex_badRange_lineNumberStart_greaterThanNumLines"
                    }
                    BadRangeKind::LineNumberEndGreaterThanNumLines => {
                        "error_lex_badRange_lineNumberEnd_greaterThanNumLines"
                    }
                    BadRangeKind::CodeUnitStartGreaterThanLineLength => {
                        "error_lex_badRange_codeUnitStart_greaterThanLineLength"
                    }
                    BadRangeKind::CodeUnitEndGreaterThanLineLength => {
                        "error_lex_badRange_codeUnitEnd_greaterThanLineLength"
                    }
                };
                catalog.format(
                    code,
                    &[
                        ("lineNumber", &range.start.line_number.to_string()),
                        ("lineNumberStart", &range.start.line_number.to_string()),
                        ("lineNumberEnd", &range.end.line_number.to_string()),
                    ],
                )
            }
            Self::BadState { inner } => {
                catalog.format("error_lex_badState", &[("error", &inner.message(catalog))])
            }
            Self::EndOfStream => catalog.get("error_lex_endOfStream").to_string(),
            Self::ErrorLineMap { errors } => {
                let lines = errors
                    .iter()
                    .map(|(line, _)| line.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                catalog.format("error_lex_errorLineMap", &[("lines", &lines)])
            }
            Self::Expected { kind, position } => {
                let code = match kind {
                    ExpectedKind::HexLiteral => "error_lex_expectedHexLiteral",
                    ExpectedKind::KeywordOrIdentifier => "error_lex_expectedKeywordOrIdentifier",
                    ExpectedKind::Numeric => "error_lex_expectedNumericLiteral",
                };
                catalog.format(
                    code,
                    &[
                        ("lineNumber", &position.line_number.to_string()),
                        ("column", &position.column_grapheme.to_string()),
                    ],
                )
            }
            Self::UnexpectedEof { position } => catalog.format(
                "error_lex_unexpectedEof",
                &[
                    ("lineNumber", &position.line_number.to_string()),
                    ("column", &position.column_grapheme.to_string()),
                ],
            ),
            Self::UnexpectedRead { position } => catalog.format(
                "error_lex_unexpectedRead",
                &[
                    ("lineNumber", &position.line_number.to_string()),
                    ("column", &position.column_grapheme.to_string()),
                ],
            ),
            Self::UnterminatedMultilineToken { kind, position } => {
                let code = match kind {
                    UnterminatedMultilineTokenKind::Comment => {
                        "error_lex_unterminatedMultilineToken_comment"
                    }
                    UnterminatedMultilineTokenKind::QuotedIdentifier => {
                        "error_lex_unterminatedMultilineToken_quotedIdentifier"
                    }
                    UnterminatedMultilineTokenKind::String => {
                        "error_lex_unterminatedMultilineToken_string"
                    }
                };
                catalog.format(code, &[("lineNumber", &position.line_number.to_string())])
            }
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message(&LocaleCatalog::en_us()))
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(line: u32, column: u32) -> GraphemePosition {
        GraphemePosition {
            line_number: line,
            line_code_unit: column,
            column_grapheme: column,
        }
    }

    #[test]
    fn expected_hex_display() {
        let err = LexError::Expected {
            kind: ExpectedKind::HexLiteral,
            position: position(3, 7),
        };
        assert_eq!(err.to_string(), "expected a hex literal on line 3, column 7");
    }

    #[test]
    fn bad_state_wraps_inner() {
        let inner = LexError::UnexpectedRead {
            position: position(0, 2),
        };
        let err = LexError::BadState {
            inner: Box::new(inner),
        };
        assert_eq!(
            err.to_string(),
            "the line already failed to lex: unexpected character on line 0, column 2"
        );
    }

    #[test]
    fn error_line_map_lists_lines() {
        let err = LexError::ErrorLineMap {
            errors: vec![
                (1, LexError::EndOfStream),
                (4, LexError::EndOfStream),
            ],
        };
        assert_eq!(
            err.to_string(),
            "one or more lines failed to lex: 1, 4"
        );
    }
}
