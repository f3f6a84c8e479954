//! The M keyword table.

use serde::Serialize;

use crate::token::TokenKind;

/// Every keyword of the M language, including the `#`-prefixed constructor
/// keywords. `null` is absent on purpose: it lexes straight to
/// [`TokenKind::NullLiteral`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeywordKind {
    And,
    As,
    Each,
    Else,
    Error,
    False,
    HashBinary,
    HashDate,
    HashDateTime,
    HashDateTimeZone,
    HashDuration,
    HashInfinity,
    HashNan,
    HashSections,
    HashShared,
    HashTable,
    HashTime,
    If,
    In,
    Is,
    Let,
    Meta,
    Not,
    Otherwise,
    Or,
    Section,
    Shared,
    Then,
    True,
    Try,
    Type,
}

/// Keywords that may begin an expression. Autocomplete falls back to this
/// set whenever the cursor sits where an expression is expected.
pub const EXPRESSION_KEYWORDS: &[KeywordKind] = &[
    KeywordKind::Each,
    KeywordKind::Error,
    KeywordKind::False,
    KeywordKind::HashBinary,
    KeywordKind::HashDate,
    KeywordKind::HashDateTime,
    KeywordKind::HashDateTimeZone,
    KeywordKind::HashDuration,
    KeywordKind::HashInfinity,
    KeywordKind::HashNan,
    KeywordKind::HashSections,
    KeywordKind::HashShared,
    KeywordKind::HashTable,
    KeywordKind::HashTime,
    KeywordKind::If,
    KeywordKind::Let,
    KeywordKind::Not,
    KeywordKind::True,
    KeywordKind::Try,
    KeywordKind::Type,
];

impl KeywordKind {
    /// The source text of the keyword.
    pub fn literal(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::As => "as",
            Self::Each => "each",
            Self::Else => "else",
            Self::Error => "error",
            Self::False => "false",
            Self::HashBinary => "#binary",
            Self::HashDate => "#date",
            Self::HashDateTime => "#datetime",
            Self::HashDateTimeZone => "#datetimezone",
            Self::HashDuration => "#duration",
            Self::HashInfinity => "#infinity",
            Self::HashNan => "#nan",
            Self::HashSections => "#sections",
            Self::HashShared => "#shared",
            Self::HashTable => "#table",
            Self::HashTime => "#time",
            Self::If => "if",
            Self::In => "in",
            Self::Is => "is",
            Self::Let => "let",
            Self::Meta => "meta",
            Self::Not => "not",
            Self::Otherwise => "otherwise",
            Self::Or => "or",
            Self::Section => "section",
            Self::Shared => "shared",
            Self::Then => "then",
            Self::True => "true",
            Self::Try => "try",
            Self::Type => "type",
        }
    }

    /// Look a literal up in the keyword table.
    pub fn from_literal(text: &str) -> Option<Self> {
        let kind = match text {
            "and" => Self::And,
            "as" => Self::As,
            "each" => Self::Each,
            "else" => Self::Else,
            "error" => Self::Error,
            "false" => Self::False,
            "#binary" => Self::HashBinary,
            "#date" => Self::HashDate,
            "#datetime" => Self::HashDateTime,
            "#datetimezone" => Self::HashDateTimeZone,
            "#duration" => Self::HashDuration,
            "#infinity" => Self::HashInfinity,
            "#nan" => Self::HashNan,
            "#sections" => Self::HashSections,
            "#shared" => Self::HashShared,
            "#table" => Self::HashTable,
            "#time" => Self::HashTime,
            "if" => Self::If,
            "in" => Self::In,
            "is" => Self::Is,
            "let" => Self::Let,
            "meta" => Self::Meta,
            "not" => Self::Not,
            "otherwise" => Self::Otherwise,
            "or" => Self::Or,
            "section" => Self::Section,
            "shared" => Self::Shared,
            "then" => Self::Then,
            "true" => Self::True,
            "try" => Self::Try,
            "type" => Self::Type,
            _ => return None,
        };
        Some(kind)
    }

    /// The token kind this keyword lexes to.
    pub fn token_kind(self) -> TokenKind {
        match self {
            Self::And => TokenKind::KeywordAnd,
            Self::As => TokenKind::KeywordAs,
            Self::Each => TokenKind::KeywordEach,
            Self::Else => TokenKind::KeywordElse,
            Self::Error => TokenKind::KeywordError,
            Self::False => TokenKind::KeywordFalse,
            Self::HashBinary => TokenKind::KeywordHashBinary,
            Self::HashDate => TokenKind::KeywordHashDate,
            Self::HashDateTime => TokenKind::KeywordHashDateTime,
            Self::HashDateTimeZone => TokenKind::KeywordHashDateTimeZone,
            Self::HashDuration => TokenKind::KeywordHashDuration,
            Self::HashInfinity => TokenKind::KeywordHashInfinity,
            Self::HashNan => TokenKind::KeywordHashNan,
            Self::HashSections => TokenKind::KeywordHashSections,
            Self::HashShared => TokenKind::KeywordHashShared,
            Self::HashTable => TokenKind::KeywordHashTable,
            Self::HashTime => TokenKind::KeywordHashTime,
            Self::If => TokenKind::KeywordIf,
            Self::In => TokenKind::KeywordIn,
            Self::Is => TokenKind::KeywordIs,
            Self::Let => TokenKind::KeywordLet,
            Self::Meta => TokenKind::KeywordMeta,
            Self::Not => TokenKind::KeywordNot,
            Self::Otherwise => TokenKind::KeywordOtherwise,
            Self::Or => TokenKind::KeywordOr,
            Self::Section => TokenKind::KeywordSection,
            Self::Shared => TokenKind::KeywordShared,
            Self::Then => TokenKind::KeywordThen,
            Self::True => TokenKind::KeywordTrue,
            Self::Try => TokenKind::KeywordTry,
            Self::Type => TokenKind::KeywordType,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_round_trips() {
        for kw in EXPRESSION_KEYWORDS {
            assert_eq!(KeywordKind::from_literal(kw.literal()), Some(*kw));
        }
        assert_eq!(KeywordKind::from_literal("otherwise"), Some(KeywordKind::Otherwise));
        assert_eq!(KeywordKind::from_literal("datetime"), None);
        assert_eq!(KeywordKind::from_literal("null"), None);
    }

    #[test]
    fn expression_keywords_can_start_an_expression() {
        assert!(EXPRESSION_KEYWORDS.contains(&KeywordKind::Try));
        assert!(EXPRESSION_KEYWORDS.contains(&KeywordKind::HashTable));
        assert!(!EXPRESSION_KEYWORDS.contains(&KeywordKind::Then));
        assert!(!EXPRESSION_KEYWORDS.contains(&KeywordKind::And));
    }
}
