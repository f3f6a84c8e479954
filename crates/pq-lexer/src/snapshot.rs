//! Freezing a line-structured [`State`] into a flat document-level stream.
//!
//! Flattening concatenates line texts with the separator, rebases every line
//! token to absolute positions, and fuses `*Start`/`*Content`/`*End`
//! fragment runs back into single tokens (strings, quoted identifiers) or
//! comments (multiline comments).

use serde::Serialize;

use pq_common::position::{GraphemePosition, TokenPosition};
use pq_common::token::{Comment, CommentKind, LineTokenKind, Token, TokenKind};

use crate::error::{LexError, UnterminatedMultilineTokenKind};
use crate::line_string::LineString;
use crate::State;

/// A frozen, flattened token-and-comment stream over a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LexerSnapshot {
    text: String,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
    /// Absolute byte offset of each line terminator, in order.
    line_terminator_code_units: Vec<u32>,
    separator: String,
}

/// A line token rebased to document coordinates.
#[derive(Debug, Clone)]
struct FlatToken {
    kind: LineTokenKind,
    line_number: u32,
    line_start: u32,
    line_end: u32,
    abs_start: u32,
    abs_end: u32,
}

impl FlatToken {
    fn position_start(&self) -> TokenPosition {
        TokenPosition {
            line_number: self.line_number,
            line_code_unit: self.line_start,
            code_unit: self.abs_start,
        }
    }

    fn position_end(&self) -> TokenPosition {
        TokenPosition {
            line_number: self.line_number,
            line_code_unit: self.line_end,
            code_unit: self.abs_end,
        }
    }
}

impl LexerSnapshot {
    /// Freeze a lexer state.
    ///
    /// Fails with [`LexError::ErrorLineMap`] if any line holds an error and
    /// with [`LexError::UnterminatedMultilineToken`] if a multiline token is
    /// opened but never closed.
    pub fn try_from_state(state: &State) -> Result<Self, LexError> {
        let error_lines = state.error_lines();
        if !error_lines.is_empty() {
            let mut errors: Vec<(u32, LexError)> = error_lines
                .into_iter()
                .map(|(line, error)| (line, error.clone()))
                .collect();
            errors.sort_by_key(|(line, _)| *line);
            return Err(LexError::ErrorLineMap { errors });
        }

        let separator = state.separator().to_string();
        let mut text = String::new();
        let mut line_terminator_code_units = Vec::new();
        let mut flat = Vec::new();

        for (index, line) in state.lines().iter().enumerate() {
            if index > 0 {
                line_terminator_code_units.push(text.len() as u32);
                text.push_str(&separator);
            }
            let line_offset = text.len() as u32;
            text.push_str(line.line_string().text());

            for token in line.tokens() {
                flat.push(FlatToken {
                    kind: token.kind,
                    line_number: index as u32,
                    line_start: token.position_start,
                    line_end: token.position_end,
                    abs_start: line_offset + token.position_start,
                    abs_end: line_offset + token.position_end,
                });
            }
        }

        let (tokens, comments) = fuse(state, &text, &flat)?;
        Ok(Self {
            text,
            tokens,
            comments,
            line_terminator_code_units,
            separator,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn line_terminator_code_units(&self) -> &[u32] {
        &self.line_terminator_code_units
    }

    pub fn num_tokens(&self) -> u32 {
        self.tokens.len() as u32
    }

    /// Bounds-checked token access.
    pub fn token(&self, index: u32) -> Result<&Token, LexError> {
        self.tokens.get(index as usize).ok_or(LexError::EndOfStream)
    }

    /// The text of one line, without its terminator.
    pub fn line_text(&self, line_number: u32) -> &str {
        let index = line_number as usize;
        let start = if index == 0 {
            0
        } else {
            self.line_terminator_code_units[index - 1] as usize + self.separator.len()
        };
        let end = match self.line_terminator_code_units.get(index) {
            Some(terminator) => *terminator as usize,
            None => self.text.len(),
        };
        &self.text[start..end]
    }

    /// The user-facing grapheme position of a token boundary.
    pub fn grapheme_position_from(&self, position: &TokenPosition) -> GraphemePosition {
        let line = LineString::new(self.line_text(position.line_number));
        line.grapheme_position(position.line_number, position.line_code_unit)
    }
}

/// Sweep the flat stream, fusing fragment runs and splitting comments out of
/// the token stream.
fn fuse(
    state: &State,
    text: &str,
    flat: &[FlatToken],
) -> Result<(Vec<Token>, Vec<Comment>), LexError> {
    let mut tokens = Vec::new();
    let mut comments = Vec::new();
    let mut index = 0;

    while index < flat.len() {
        let current = &flat[index];
        match current.kind {
            LineTokenKind::LineComment => {
                comments.push(comment(CommentKind::Line, current, current, text));
                index += 1;
            }
            LineTokenKind::MultilineComment => {
                comments.push(comment(CommentKind::Multiline, current, current, text));
                index += 1;
            }
            LineTokenKind::MultilineCommentStart => {
                let end = collect_run(
                    state,
                    flat,
                    index,
                    LineTokenKind::MultilineCommentContent,
                    LineTokenKind::MultilineCommentEnd,
                    UnterminatedMultilineTokenKind::Comment,
                )?;
                comments.push(comment(CommentKind::Multiline, current, &flat[end], text));
                index = end + 1;
            }
            LineTokenKind::StringLiteralStart => {
                let end = collect_run(
                    state,
                    flat,
                    index,
                    LineTokenKind::StringLiteralContent,
                    LineTokenKind::StringLiteralEnd,
                    UnterminatedMultilineTokenKind::String,
                )?;
                tokens.push(fused_token(TokenKind::StringLiteral, current, &flat[end], text));
                index = end + 1;
            }
            LineTokenKind::QuotedIdentifierStart => {
                let end = collect_run(
                    state,
                    flat,
                    index,
                    LineTokenKind::QuotedIdentifierContent,
                    LineTokenKind::QuotedIdentifierEnd,
                    UnterminatedMultilineTokenKind::QuotedIdentifier,
                )?;
                tokens.push(fused_token(TokenKind::Identifier, current, &flat[end], text));
                index = end + 1;
            }
            kind => match kind.to_token_kind() {
                Some(token_kind) => {
                    tokens.push(fused_token(token_kind, current, current, text));
                    index += 1;
                }
                // Mode propagation guarantees content/end fragments always
                // follow a start fragment.
                None => {
                    debug_assert!(false, "stray fragment {kind:?}");
                    return Err(LexError::UnexpectedRead {
                        position: grapheme_position_of(state, current),
                    });
                }
            },
        }
    }

    Ok((tokens, comments))
}

/// Walk a fragment run from its `*Start` token to the matching `*End`,
/// returning the end fragment's index.
fn collect_run(
    state: &State,
    flat: &[FlatToken],
    start: usize,
    content_kind: LineTokenKind,
    end_kind: LineTokenKind,
    unterminated: UnterminatedMultilineTokenKind,
) -> Result<usize, LexError> {
    let mut index = start + 1;
    loop {
        let fragment = match flat.get(index) {
            Some(fragment) => Ok(fragment),
            None => Err(LexError::EndOfStream),
        };
        match fragment {
            Ok(fragment) if fragment.kind == content_kind => index += 1,
            Ok(fragment) if fragment.kind == end_kind => return Ok(index),
            Ok(_) | Err(_) => {
                return Err(LexError::UnterminatedMultilineToken {
                    kind: unterminated,
                    position: grapheme_position_of(state, &flat[start]),
                })
            }
        }
    }
}

fn grapheme_position_of(state: &State, token: &FlatToken) -> GraphemePosition {
    state.lines()[token.line_number as usize]
        .line_string()
        .grapheme_position(token.line_number, token.line_start)
}

fn comment(kind: CommentKind, start: &FlatToken, end: &FlatToken, text: &str) -> Comment {
    Comment {
        kind,
        contains_newline: start.line_number != end.line_number,
        data: text[start.abs_start as usize..end.abs_end as usize].to_string(),
        position_start: start.position_start(),
        position_end: end.position_end(),
    }
}

fn fused_token(kind: TokenKind, start: &FlatToken, end: &FlatToken, text: &str) -> Token {
    Token {
        kind,
        data: text[start.abs_start as usize..end.abs_end as usize].to_string(),
        position_start: start.position_start(),
        position_end: end.position_end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pq_common::settings::LexSettings;

    fn snapshot(text: &str) -> LexerSnapshot {
        LexerSnapshot::try_from_state(&crate::lex(&LexSettings::default(), text)).unwrap()
    }

    #[test]
    fn single_line_positions_are_absolute() {
        let snapshot = snapshot("let x = 1");
        let kinds: Vec<TokenKind> = snapshot.tokens().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::KeywordLet,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::NumericLiteral,
            ]
        );
        let x = &snapshot.tokens()[1];
        assert_eq!(x.data, "x");
        assert_eq!(x.position_start.code_unit, 4);
        assert_eq!(x.position_end.code_unit, 5);
    }

    #[test]
    fn multiline_string_is_fused() {
        let snapshot = snapshot("a = \"first\nsecond\nthird\" + 1");
        let string = snapshot
            .tokens()
            .iter()
            .find(|t| t.kind == TokenKind::StringLiteral)
            .unwrap();
        assert_eq!(string.data, "\"first\nsecond\nthird\"");
        assert_eq!(string.position_start.line_number, 0);
        assert_eq!(string.position_end.line_number, 2);
        // The trailing `+ 1` still arrives after the fused token.
        assert_eq!(snapshot.tokens().last().unwrap().data, "1");
    }

    #[test]
    fn multiline_comment_is_fused_into_a_comment() {
        let snapshot = snapshot("1 /* a\nb */ 2");
        assert_eq!(snapshot.tokens().len(), 2);
        assert_eq!(snapshot.comments().len(), 1);
        let comment = &snapshot.comments()[0];
        assert_eq!(comment.kind, CommentKind::Multiline);
        assert!(comment.contains_newline);
        assert_eq!(comment.data, "/* a\nb */");
    }

    #[test]
    fn multiline_quoted_identifier_is_fused_to_identifier() {
        let snapshot = snapshot("#\"two\nlines\" + 1");
        assert_eq!(snapshot.tokens()[0].kind, TokenKind::Identifier);
        assert_eq!(snapshot.tokens()[0].data, "#\"two\nlines\"");
    }

    #[test]
    fn unterminated_comment_fails() {
        let state = crate::lex(&LexSettings::default(), "/*");
        match LexerSnapshot::try_from_state(&state) {
            Err(LexError::UnterminatedMultilineToken { kind, position }) => {
                assert_eq!(kind, UnterminatedMultilineTokenKind::Comment);
                assert_eq!(position.line_number, 0);
                assert_eq!(position.column_grapheme, 0);
            }
            other => panic!("expected an unterminated comment, got {other:?}"),
        }
    }

    #[test]
    fn error_lines_surface_as_a_map() {
        let state = crate::lex(&LexSettings::default(), "0x");
        match LexerSnapshot::try_from_state(&state) {
            Err(LexError::ErrorLineMap { errors }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].0, 0);
                assert!(matches!(errors[0].1, LexError::Expected { .. }));
            }
            other => panic!("expected an error line map, got {other:?}"),
        }
    }

    #[test]
    fn line_terminators_are_recorded() {
        let snapshot = snapshot("a\nbb\nccc");
        assert_eq!(snapshot.line_terminator_code_units(), &[1, 4]);
        assert_eq!(snapshot.line_text(0), "a");
        assert_eq!(snapshot.line_text(1), "bb");
        assert_eq!(snapshot.line_text(2), "ccc");
    }

    #[test]
    fn grapheme_position_reports_columns() {
        // "é" is one editor column over two bytes.
        let snapshot = snapshot("\u{00E9}e = 1");
        let equal = snapshot
            .tokens()
            .iter()
            .find(|t| t.kind == TokenKind::Equal)
            .unwrap();
        assert_eq!(equal.position_start.line_code_unit, 4);
        let position = snapshot.grapheme_position_from(&equal.position_start);
        assert_eq!(position.column_grapheme, 3);
    }
}
