//! The per-line tokenizer.
//!
//! A line is lexed on its own, seeded with the multiline mode the previous
//! line ended in. Tokens that cross line boundaries (multiline comments,
//! strings, quoted identifiers) are emitted as `*Start`/`*Content`/`*End`
//! fragments; [`crate::LexerSnapshot`] fuses them back together.

use serde::Serialize;

use pq_common::keyword::KeywordKind;
use pq_common::partial::PartialResult;
use pq_common::token::{LineToken, LineTokenKind};

use crate::cursor::Cursor;
use crate::error::{ExpectedKind, LexError};
use crate::line_string::LineString;

/// The cross-line state the lexer is in at a line boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LineMode {
    /// Inside a `/* … */` comment.
    Comment,
    #[default]
    Default,
    /// Inside a `#"…"` quoted identifier.
    QuotedIdentifier,
    /// Inside a `"…"` string literal.
    String,
}

/// The outcome of lexing one line clean: its tokens and the mode it ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineRead {
    pub tokens: Vec<LineToken>,
    pub mode_end: LineMode,
}

/// Lex a single line seeded with `mode_start`.
///
/// `Ok` when the whole line lexed, `Partial` when some tokens were produced
/// before an error, `Err` when the very first token failed.
pub(crate) fn read_line(
    line: &LineString,
    line_number: u32,
    mode_start: LineMode,
) -> PartialResult<LineRead, LexError> {
    let text = line.text();
    let mut cursor = Cursor::new(text);
    let mut tokens = Vec::new();
    let mut mode = mode_start;

    loop {
        match mode {
            LineMode::Comment => {
                mode = read_comment_continuation(&mut cursor, &mut tokens);
                if cursor.is_eof() {
                    break;
                }
            }
            LineMode::QuotedIdentifier => {
                mode = read_quoted_continuation(
                    &mut cursor,
                    &mut tokens,
                    LineTokenKind::QuotedIdentifierContent,
                    LineTokenKind::QuotedIdentifierEnd,
                    LineMode::QuotedIdentifier,
                );
                if cursor.is_eof() {
                    break;
                }
            }
            LineMode::String => {
                mode = read_quoted_continuation(
                    &mut cursor,
                    &mut tokens,
                    LineTokenKind::StringLiteralContent,
                    LineTokenKind::StringLiteralEnd,
                    LineMode::String,
                );
                if cursor.is_eof() {
                    break;
                }
            }
            LineMode::Default => {
                cursor.eat_while(char::is_whitespace);
                if cursor.is_eof() {
                    break;
                }
                match read_default_token(&mut cursor, line, line_number, &mut tokens) {
                    Ok(next_mode) => mode = next_mode,
                    Err(error) => {
                        if tokens.is_empty() {
                            return PartialResult::Err(error);
                        }
                        return PartialResult::Partial {
                            value: LineRead {
                                tokens,
                                mode_end: LineMode::Default,
                            },
                            error,
                        };
                    }
                }
            }
        }
    }

    PartialResult::Ok(LineRead {
        tokens,
        mode_end: mode,
    })
}

/// In comment mode: either the closing `*/` is on this line, or the whole
/// line is comment content.
fn read_comment_continuation(cursor: &mut Cursor, tokens: &mut Vec<LineToken>) -> LineMode {
    let start = cursor.pos();
    match cursor.find("*/") {
        Some(close) => {
            cursor.seek(close + 2);
            tokens.push(token(
                LineTokenKind::MultilineCommentEnd,
                start,
                cursor.pos(),
                cursor.slice_from(start),
            ));
            LineMode::Default
        }
        None => {
            cursor.eat_while(|_| true);
            tokens.push(token(
                LineTokenKind::MultilineCommentContent,
                start,
                cursor.pos(),
                cursor.slice_from(start),
            ));
            LineMode::Comment
        }
    }
}

/// In string or quoted-identifier mode: scan for the closing quote,
/// honoring the doubled-quote escape.
fn read_quoted_continuation(
    cursor: &mut Cursor,
    tokens: &mut Vec<LineToken>,
    content_kind: LineTokenKind,
    end_kind: LineTokenKind,
    continue_mode: LineMode,
) -> LineMode {
    let start = cursor.pos();
    match quote_end(cursor.rest()) {
        Some(relative_end) => {
            cursor.seek(start + relative_end);
            tokens.push(token(end_kind, start, cursor.pos(), cursor.slice_from(start)));
            LineMode::Default
        }
        None => {
            cursor.eat_while(|_| true);
            tokens.push(token(
                content_kind,
                start,
                cursor.pos(),
                cursor.slice_from(start),
            ));
            continue_mode
        }
    }
}

/// Offset just past the closing `"` in `text`, treating `""` as an escape.
fn quote_end(text: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            return Some((i + 1) as u32);
        }
        i += 1;
    }
    None
}

/// Read one token in default mode. Returns the mode the next read happens
/// in, which is only ever non-default when an unterminated multiline token
/// consumed the rest of the line.
fn read_default_token(
    cursor: &mut Cursor,
    line: &LineString,
    line_number: u32,
    tokens: &mut Vec<LineToken>,
) -> Result<LineMode, LexError> {
    let start = cursor.pos();
    let first = match cursor.peek() {
        Some(c) => c,
        None => {
            return Err(LexError::UnexpectedEof {
                position: line.grapheme_position(line_number, start),
            })
        }
    };

    match first {
        ',' => Ok(single(cursor, tokens, LineTokenKind::Comma)),
        ';' => Ok(single(cursor, tokens, LineTokenKind::Semicolon)),
        '@' => Ok(single(cursor, tokens, LineTokenKind::AtSign)),
        '?' => Ok(single(cursor, tokens, LineTokenKind::QuestionMark)),
        '&' => Ok(single(cursor, tokens, LineTokenKind::Ampersand)),
        '*' => Ok(single(cursor, tokens, LineTokenKind::Asterisk)),
        '+' => Ok(single(cursor, tokens, LineTokenKind::Plus)),
        '-' => Ok(single(cursor, tokens, LineTokenKind::Minus)),
        '(' => Ok(single(cursor, tokens, LineTokenKind::LeftParenthesis)),
        ')' => Ok(single(cursor, tokens, LineTokenKind::RightParenthesis)),
        '{' => Ok(single(cursor, tokens, LineTokenKind::LeftBrace)),
        '}' => Ok(single(cursor, tokens, LineTokenKind::RightBrace)),
        '[' => Ok(single(cursor, tokens, LineTokenKind::LeftBracket)),
        ']' => Ok(single(cursor, tokens, LineTokenKind::RightBracket)),
        '=' => {
            cursor.bump();
            let kind = if cursor.bump_if('>') {
                LineTokenKind::FatArrow
            } else {
                LineTokenKind::Equal
            };
            tokens.push(token(kind, start, cursor.pos(), cursor.slice_from(start)));
            Ok(LineMode::Default)
        }
        '<' => {
            cursor.bump();
            let kind = if cursor.bump_if('=') {
                LineTokenKind::LessThanEqualTo
            } else if cursor.bump_if('>') {
                LineTokenKind::NotEqual
            } else {
                LineTokenKind::LessThan
            };
            tokens.push(token(kind, start, cursor.pos(), cursor.slice_from(start)));
            Ok(LineMode::Default)
        }
        '>' => {
            cursor.bump();
            let kind = if cursor.bump_if('=') {
                LineTokenKind::GreaterThanEqualTo
            } else {
                LineTokenKind::GreaterThan
            };
            tokens.push(token(kind, start, cursor.pos(), cursor.slice_from(start)));
            Ok(LineMode::Default)
        }
        '/' => read_slash(cursor, tokens, start),
        '"' => {
            cursor.bump();
            match quote_end(cursor.rest()) {
                Some(relative_end) => {
                    cursor.seek(cursor.pos() + relative_end);
                    tokens.push(token(
                        LineTokenKind::StringLiteral,
                        start,
                        cursor.pos(),
                        cursor.slice_from(start),
                    ));
                    Ok(LineMode::Default)
                }
                None => {
                    cursor.eat_while(|_| true);
                    tokens.push(token(
                        LineTokenKind::StringLiteralStart,
                        start,
                        cursor.pos(),
                        cursor.slice_from(start),
                    ));
                    Ok(LineMode::String)
                }
            }
        }
        '#' => read_hash(cursor, line, line_number, tokens, start),
        '.' => read_dot(cursor, line, line_number, tokens, start),
        c if c.is_ascii_digit() => read_number(cursor, line, line_number, tokens, start),
        c if c.is_alphabetic() || c == '_' => {
            read_identifier_chars(cursor);
            let data = cursor.slice_from(start);
            let kind = classify_word(data);
            tokens.push(token(kind, start, cursor.pos(), data));
            Ok(LineMode::Default)
        }
        _ => Err(LexError::UnexpectedRead {
            position: line.grapheme_position(line_number, start),
        }),
    }
}

fn single(cursor: &mut Cursor, tokens: &mut Vec<LineToken>, kind: LineTokenKind) -> LineMode {
    let start = cursor.pos();
    cursor.bump();
    tokens.push(token(kind, start, cursor.pos(), cursor.slice_from(start)));
    LineMode::Default
}

/// `//` line comment, `/*` multiline comment, or plain division.
fn read_slash(
    cursor: &mut Cursor,
    tokens: &mut Vec<LineToken>,
    start: u32,
) -> Result<LineMode, LexError> {
    cursor.bump();
    if cursor.bump_if('/') {
        cursor.eat_while(|_| true);
        tokens.push(token(
            LineTokenKind::LineComment,
            start,
            cursor.pos(),
            cursor.slice_from(start),
        ));
        return Ok(LineMode::Default);
    }
    if cursor.bump_if('*') {
        return Ok(match cursor.find("*/") {
            Some(close) => {
                cursor.seek(close + 2);
                tokens.push(token(
                    LineTokenKind::MultilineComment,
                    start,
                    cursor.pos(),
                    cursor.slice_from(start),
                ));
                LineMode::Default
            }
            None => {
                cursor.eat_while(|_| true);
                tokens.push(token(
                    LineTokenKind::MultilineCommentStart,
                    start,
                    cursor.pos(),
                    cursor.slice_from(start),
                ));
                LineMode::Comment
            }
        });
    }
    tokens.push(token(
        LineTokenKind::Division,
        start,
        cursor.pos(),
        cursor.slice_from(start),
    ));
    Ok(LineMode::Default)
}

/// `#"…"` quoted identifier, or a `#`-prefixed keyword such as `#table`.
fn read_hash(
    cursor: &mut Cursor,
    line: &LineString,
    line_number: u32,
    tokens: &mut Vec<LineToken>,
    start: u32,
) -> Result<LineMode, LexError> {
    cursor.bump();
    if cursor.bump_if('"') {
        return Ok(match quote_end(cursor.rest()) {
            Some(relative_end) => {
                cursor.seek(cursor.pos() + relative_end);
                tokens.push(token(
                    LineTokenKind::Identifier,
                    start,
                    cursor.pos(),
                    cursor.slice_from(start),
                ));
                LineMode::Default
            }
            None => {
                cursor.eat_while(|_| true);
                tokens.push(token(
                    LineTokenKind::QuotedIdentifierStart,
                    start,
                    cursor.pos(),
                    cursor.slice_from(start),
                ));
                LineMode::QuotedIdentifier
            }
        });
    }

    let expected = LexError::Expected {
        kind: ExpectedKind::KeywordOrIdentifier,
        position: line.grapheme_position(line_number, start),
    };
    match cursor.peek() {
        Some(c) if c.is_alphabetic() => {
            cursor.eat_while(|c| c.is_alphanumeric());
            let data = cursor.slice_from(start);
            match KeywordKind::from_literal(data) {
                Some(keyword) => {
                    tokens.push(token(
                        keyword_line_kind(keyword),
                        start,
                        cursor.pos(),
                        data,
                    ));
                    Ok(LineMode::Default)
                }
                None => Err(expected),
            }
        }
        _ => Err(expected),
    }
}

/// `...`, `..`, or a numeric literal with a leading dot.
fn read_dot(
    cursor: &mut Cursor,
    line: &LineString,
    line_number: u32,
    tokens: &mut Vec<LineToken>,
    start: u32,
) -> Result<LineMode, LexError> {
    match cursor.peek_at(1) {
        Some(c) if c.is_ascii_digit() => read_number(cursor, line, line_number, tokens, start),
        Some('.') => {
            cursor.bump();
            cursor.bump();
            let kind = if cursor.bump_if('.') {
                LineTokenKind::Ellipsis
            } else {
                LineTokenKind::DotDot
            };
            tokens.push(token(kind, start, cursor.pos(), cursor.slice_from(start)));
            Ok(LineMode::Default)
        }
        _ => Err(LexError::Expected {
            kind: ExpectedKind::Numeric,
            position: line.grapheme_position(line_number, start),
        }),
    }
}

/// Hex or decimal numeric literal. The cursor sits on a digit, or on a `.`
/// that is known to be followed by a digit.
fn read_number(
    cursor: &mut Cursor,
    line: &LineString,
    line_number: u32,
    tokens: &mut Vec<LineToken>,
    start: u32,
) -> Result<LineMode, LexError> {
    if cursor.peek() == Some('0')
        && matches!(cursor.peek_at(1), Some('x') | Some('X'))
    {
        cursor.bump();
        cursor.bump();
        if cursor.eat_while(|c| c.is_ascii_hexdigit()) == 0 {
            return Err(LexError::Expected {
                kind: ExpectedKind::HexLiteral,
                position: line.grapheme_position(line_number, start),
            });
        }
        tokens.push(token(
            LineTokenKind::HexLiteral,
            start,
            cursor.pos(),
            cursor.slice_from(start),
        ));
        return Ok(LineMode::Default);
    }

    cursor.eat_while(|c| c.is_ascii_digit());
    if cursor.peek() == Some('.') {
        match cursor.peek_at(1) {
            // Leave `..` for the range operator, e.g. `{1..3}`.
            Some(c) if c.is_ascii_digit() => {
                cursor.bump();
                cursor.eat_while(|c| c.is_ascii_digit());
            }
            _ => {}
        }
    }
    if matches!(cursor.peek(), Some('e') | Some('E')) {
        cursor.bump();
        if matches!(cursor.peek(), Some('+') | Some('-')) {
            cursor.bump();
        }
        if cursor.eat_while(|c| c.is_ascii_digit()) == 0 {
            return Err(LexError::Expected {
                kind: ExpectedKind::Numeric,
                position: line.grapheme_position(line_number, start),
            });
        }
    }
    tokens.push(token(
        LineTokenKind::NumericLiteral,
        start,
        cursor.pos(),
        cursor.slice_from(start),
    ));
    Ok(LineMode::Default)
}

/// Identifier characters, allowing interior dots when another identifier
/// character follows (`Text.From` is one token, `a..b` is three).
fn read_identifier_chars(cursor: &mut Cursor) {
    loop {
        cursor.eat_while(|c| c.is_alphanumeric() || c == '_');
        if cursor.peek() == Some('.')
            && matches!(cursor.peek_at(1), Some(c) if c.is_alphabetic() || c == '_')
        {
            cursor.bump();
            continue;
        }
        break;
    }
}

/// Keyword table lookup for a bare word.
fn classify_word(data: &str) -> LineTokenKind {
    if data == "null" {
        return LineTokenKind::NullLiteral;
    }
    match KeywordKind::from_literal(data) {
        Some(keyword) => keyword_line_kind(keyword),
        None => LineTokenKind::Identifier,
    }
}

fn keyword_line_kind(keyword: KeywordKind) -> LineTokenKind {
    use KeywordKind as K;
    use LineTokenKind as L;
    match keyword {
        K::And => L::KeywordAnd,
        K::As => L::KeywordAs,
        K::Each => L::KeywordEach,
        K::Else => L::KeywordElse,
        K::Error => L::KeywordError,
        K::False => L::KeywordFalse,
        K::HashBinary => L::KeywordHashBinary,
        K::HashDate => L::KeywordHashDate,
        K::HashDateTime => L::KeywordHashDateTime,
        K::HashDateTimeZone => L::KeywordHashDateTimeZone,
        K::HashDuration => L::KeywordHashDuration,
        K::HashInfinity => L::KeywordHashInfinity,
        K::HashNan => L::KeywordHashNan,
        K::HashSections => L::KeywordHashSections,
        K::HashShared => L::KeywordHashShared,
        K::HashTable => L::KeywordHashTable,
        K::HashTime => L::KeywordHashTime,
        K::If => L::KeywordIf,
        K::In => L::KeywordIn,
        K::Is => L::KeywordIs,
        K::Let => L::KeywordLet,
        K::Meta => L::KeywordMeta,
        K::Not => L::KeywordNot,
        K::Otherwise => L::KeywordOtherwise,
        K::Or => L::KeywordOr,
        K::Section => L::KeywordSection,
        K::Shared => L::KeywordShared,
        K::Then => L::KeywordThen,
        K::True => L::KeywordTrue,
        K::Try => L::KeywordTry,
        K::Type => L::KeywordType,
    }
}

fn token(kind: LineTokenKind, start: u32, end: u32, data: &str) -> LineToken {
    LineToken::new(kind, start, end, data.to_string())
}
