use serde::Serialize;

use crate::position::TokenPosition;

/// Every kind of token the document-level stream can contain.
///
/// This is the vocabulary the parser consumes. It differs from
/// [`LineTokenKind`] in that multiline fragments have already been fused:
/// a string literal spanning three lines arrives as one `StringLiteral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Punctuation and operators ──────────────────────────────────────
    /// `&`
    Ampersand,
    /// `*`
    Asterisk,
    /// `@`
    AtSign,
    /// `,`
    Comma,
    /// `/`
    Division,
    /// `..`
    DotDot,
    /// `...`
    Ellipsis,
    /// `=`
    Equal,
    /// `=>`
    FatArrow,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEqualTo,
    /// `{`
    LeftBrace,
    /// `[`
    LeftBracket,
    /// `(`
    LeftParenthesis,
    /// `<`
    LessThan,
    /// `<=`
    LessThanEqualTo,
    /// `-`
    Minus,
    /// `<>`
    NotEqual,
    /// `+`
    Plus,
    /// `?`
    QuestionMark,
    /// `}`
    RightBrace,
    /// `]`
    RightBracket,
    /// `)`
    RightParenthesis,
    /// `;`
    Semicolon,

    // ── Literals and identifiers ───────────────────────────────────────
    /// `0x1A2B`
    HexLiteral,
    /// A regular or quoted identifier, e.g. `Text.From` or `#"weird name"`.
    Identifier,
    /// The `null` keyword lexes directly as a literal.
    NullLiteral,
    /// `1`, `1.5`, `.5`, `1e3`
    NumericLiteral,
    /// `"hello ""quoted"" world"`
    StringLiteral,

    // ── Keywords ───────────────────────────────────────────────────────
    KeywordAnd,
    KeywordAs,
    KeywordEach,
    KeywordElse,
    KeywordError,
    KeywordFalse,
    KeywordHashBinary,
    KeywordHashDate,
    KeywordHashDateTime,
    KeywordHashDateTimeZone,
    KeywordHashDuration,
    KeywordHashInfinity,
    KeywordHashNan,
    KeywordHashSections,
    KeywordHashShared,
    KeywordHashTable,
    KeywordHashTime,
    KeywordIf,
    KeywordIn,
    KeywordIs,
    KeywordLet,
    KeywordMeta,
    KeywordNot,
    KeywordOtherwise,
    KeywordOr,
    KeywordSection,
    KeywordShared,
    KeywordThen,
    KeywordTrue,
    KeywordTry,
    KeywordType,
}

/// Every kind of token a single line can contain.
///
/// Superset of [`TokenKind`]: adds comments and the `*Start`/`*Content`/
/// `*End` fragments that a multiline token is split into when it crosses
/// line boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LineTokenKind {
    Ampersand,
    Asterisk,
    AtSign,
    Comma,
    Division,
    DotDot,
    Ellipsis,
    Equal,
    FatArrow,
    GreaterThan,
    GreaterThanEqualTo,
    LeftBrace,
    LeftBracket,
    LeftParenthesis,
    LessThan,
    LessThanEqualTo,
    Minus,
    NotEqual,
    Plus,
    QuestionMark,
    RightBrace,
    RightBracket,
    RightParenthesis,
    Semicolon,

    HexLiteral,
    Identifier,
    NullLiteral,
    NumericLiteral,
    StringLiteral,

    KeywordAnd,
    KeywordAs,
    KeywordEach,
    KeywordElse,
    KeywordError,
    KeywordFalse,
    KeywordHashBinary,
    KeywordHashDate,
    KeywordHashDateTime,
    KeywordHashDateTimeZone,
    KeywordHashDuration,
    KeywordHashInfinity,
    KeywordHashNan,
    KeywordHashSections,
    KeywordHashShared,
    KeywordHashTable,
    KeywordHashTime,
    KeywordIf,
    KeywordIn,
    KeywordIs,
    KeywordLet,
    KeywordMeta,
    KeywordNot,
    KeywordOtherwise,
    KeywordOr,
    KeywordSection,
    KeywordShared,
    KeywordThen,
    KeywordTrue,
    KeywordTry,
    KeywordType,

    // ── Comments ───────────────────────────────────────────────────────
    /// `// …` to end of line.
    LineComment,
    /// `/* … */` opened and closed on the same line.
    MultilineComment,

    // ── Multiline fragments ────────────────────────────────────────────
    /// `/*` with no closing `*/` on the same line.
    MultilineCommentStart,
    /// A full line inside an unclosed `/* … */`.
    MultilineCommentContent,
    /// The text up to and including the closing `*/`.
    MultilineCommentEnd,
    /// `#"` with no closing `"` on the same line.
    QuotedIdentifierStart,
    QuotedIdentifierContent,
    QuotedIdentifierEnd,
    /// `"` with no closing `"` on the same line.
    StringLiteralStart,
    StringLiteralContent,
    StringLiteralEnd,
}

impl LineTokenKind {
    /// The document-level kind this line kind maps to, or `None` for
    /// comments and multiline fragments, which have no 1:1 mapping.
    pub fn to_token_kind(self) -> Option<TokenKind> {
        use LineTokenKind as L;
        use TokenKind as T;
        let kind = match self {
            L::Ampersand => T::Ampersand,
            L::Asterisk => T::Asterisk,
            L::AtSign => T::AtSign,
            L::Comma => T::Comma,
            L::Division => T::Division,
            L::DotDot => T::DotDot,
            L::Ellipsis => T::Ellipsis,
            L::Equal => T::Equal,
            L::FatArrow => T::FatArrow,
            L::GreaterThan => T::GreaterThan,
            L::GreaterThanEqualTo => T::GreaterThanEqualTo,
            L::LeftBrace => T::LeftBrace,
            L::LeftBracket => T::LeftBracket,
            L::LeftParenthesis => T::LeftParenthesis,
            L::LessThan => T::LessThan,
            L::LessThanEqualTo => T::LessThanEqualTo,
            L::Minus => T::Minus,
            L::NotEqual => T::NotEqual,
            L::Plus => T::Plus,
            L::QuestionMark => T::QuestionMark,
            L::RightBrace => T::RightBrace,
            L::RightBracket => T::RightBracket,
            L::RightParenthesis => T::RightParenthesis,
            L::Semicolon => T::Semicolon,
            L::HexLiteral => T::HexLiteral,
            L::Identifier => T::Identifier,
            L::NullLiteral => T::NullLiteral,
            L::NumericLiteral => T::NumericLiteral,
            L::StringLiteral => T::StringLiteral,
            L::KeywordAnd => T::KeywordAnd,
            L::KeywordAs => T::KeywordAs,
            L::KeywordEach => T::KeywordEach,
            L::KeywordElse => T::KeywordElse,
            L::KeywordError => T::KeywordError,
            L::KeywordFalse => T::KeywordFalse,
            L::KeywordHashBinary => T::KeywordHashBinary,
            L::KeywordHashDate => T::KeywordHashDate,
            L::KeywordHashDateTime => T::KeywordHashDateTime,
            L::KeywordHashDateTimeZone => T::KeywordHashDateTimeZone,
            L::KeywordHashDuration => T::KeywordHashDuration,
            L::KeywordHashInfinity => T::KeywordHashInfinity,
            L::KeywordHashNan => T::KeywordHashNan,
            L::KeywordHashSections => T::KeywordHashSections,
            L::KeywordHashShared => T::KeywordHashShared,
            L::KeywordHashTable => T::KeywordHashTable,
            L::KeywordHashTime => T::KeywordHashTime,
            L::KeywordIf => T::KeywordIf,
            L::KeywordIn => T::KeywordIn,
            L::KeywordIs => T::KeywordIs,
            L::KeywordLet => T::KeywordLet,
            L::KeywordMeta => T::KeywordMeta,
            L::KeywordNot => T::KeywordNot,
            L::KeywordOtherwise => T::KeywordOtherwise,
            L::KeywordOr => T::KeywordOr,
            L::KeywordSection => T::KeywordSection,
            L::KeywordShared => T::KeywordShared,
            L::KeywordThen => T::KeywordThen,
            L::KeywordTrue => T::KeywordTrue,
            L::KeywordTry => T::KeywordTry,
            L::KeywordType => T::KeywordType,
            L::LineComment
            | L::MultilineComment
            | L::MultilineCommentStart
            | L::MultilineCommentContent
            | L::MultilineCommentEnd
            | L::QuotedIdentifierStart
            | L::QuotedIdentifierContent
            | L::QuotedIdentifierEnd
            | L::StringLiteralStart
            | L::StringLiteralContent
            | L::StringLiteralEnd => return None,
        };
        Some(kind)
    }
}

/// A token within a single line. Positions are byte offsets into that line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineToken {
    pub kind: LineTokenKind,
    pub position_start: u32,
    pub position_end: u32,
    pub data: String,
}

impl LineToken {
    pub fn new(kind: LineTokenKind, position_start: u32, position_end: u32, data: String) -> Self {
        Self {
            kind,
            position_start,
            position_end,
            data,
        }
    }
}

/// A document-level token with absolute positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub data: String,
    pub position_start: TokenPosition,
    pub position_end: TokenPosition,
}

/// Which comment syntax a [`Comment`] was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentKind {
    /// `// …`
    Line,
    /// `/* … */`
    Multiline,
}

/// A comment in the document-level stream. The parser skips these; tooling
/// that re-renders source does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub contains_newline: bool,
    pub data: String,
    pub position_start: TokenPosition,
    pub position_end: TokenPosition,
}
