//! Parse error types.
//!
//! A parse error names the first production that could not make progress.
//! The hybrid tree built up to that point stays intact and is returned
//! alongside the error, so editor tooling can still inspect it.

use std::fmt;

use serde::Serialize;

use pq_common::locale::LocaleCatalog;
use pq_common::position::TokenPosition;
use pq_common::token::{Token, TokenKind};

/// A snapshot of the token an error was detected at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundToken {
    pub kind: TokenKind,
    pub data: String,
    pub position: TokenPosition,
}

impl FoundToken {
    pub fn of(token: &Token) -> Self {
        Self {
            kind: token.kind,
            data: token.data.clone(),
            position: token.position_start,
        }
    }
}

/// Which list context a bad comma continuation was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CsvContinuationKind {
    /// A comma directly followed by the list terminator, e.g. `Foo(a,)`.
    DanglingComma,
    /// A comma directly followed by `in`, e.g. `let x = 1, in x`.
    LetExpression,
}

/// Everything that can stop the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseError {
    ExpectedTokenKind {
        expected: TokenKind,
        found: Option<FoundToken>,
    },
    ExpectedAnyTokenKind {
        expected: Vec<TokenKind>,
        found: Option<FoundToken>,
    },
    ExpectedGeneralizedIdentifier { found: Option<FoundToken> },
    InvalidPrimitiveType { found: FoundToken },
    RequiredParameterAfterOptional { position: TokenPosition },
    UnterminatedBracket { open_position: TokenPosition },
    UnterminatedParenthesis { open_position: TokenPosition },
    UnusedTokensRemain { first_unused: FoundToken },
    CsvContinuation {
        kind: CsvContinuationKind,
        position: TokenPosition,
    },
}

impl ParseError {
    /// Render the user-facing message through the given catalog.
    pub fn message(&self, catalog: &LocaleCatalog) -> String {
        match self {
            Self::ExpectedTokenKind { expected, found } => catalog.format(
                "error_parse_expectedTokenKind",
                &[
                    ("expected", &catalog.token_kind_name(*expected)),
                    ("found", &found_name(catalog, found)),
                ],
            ),
            Self::ExpectedAnyTokenKind { expected, found } => {
                let expected = expected
                    .iter()
                    .map(|kind| catalog.token_kind_name(*kind))
                    .collect::<Vec<_>>()
                    .join(", ");
                catalog.format(
                    "error_parse_expectedAnyTokenKind",
                    &[
                        ("expected", &expected),
                        ("found", &found_name(catalog, found)),
                    ],
                )
            }
            Self::ExpectedGeneralizedIdentifier { found } => catalog.format(
                "error_parse_expectedGeneralizedIdentifier",
                &[("found", &found_name(catalog, found))],
            ),
            Self::InvalidPrimitiveType { found } => catalog.format(
                "error_parse_invalidPrimitiveType",
                &[("found", &found.data)],
            ),
            Self::RequiredParameterAfterOptional { .. } => catalog
                .get("error_parse_requiredParameterAfterOptional")
                .to_string(),
            Self::UnterminatedBracket { .. } => {
                catalog.get("error_parse_unterminatedBracket").to_string()
            }
            Self::UnterminatedParenthesis { .. } => catalog
                .get("error_parse_unterminatedParenthesis")
                .to_string(),
            Self::UnusedTokensRemain { .. } => {
                catalog.get("error_parse_unusedTokensRemain").to_string()
            }
            Self::CsvContinuation { kind, .. } => {
                let code = match kind {
                    CsvContinuationKind::DanglingComma => {
                        "error_parse_csvContinuation_danglingComma"
                    }
                    CsvContinuationKind::LetExpression => {
                        "error_parse_csvContinuation_letExpression"
                    }
                };
                catalog.get(code).to_string()
            }
        }
    }
}

fn found_name(catalog: &LocaleCatalog, found: &Option<FoundToken>) -> String {
    match found {
        Some(token) => catalog.token_kind_name(token.kind),
        None => catalog.get("tokenKind_endOfStream").to_string(),
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message(&LocaleCatalog::en_us()))
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn position() -> TokenPosition {
        TokenPosition {
            line_number: 0,
            line_code_unit: 3,
            code_unit: 3,
        }
    }

    #[test]
    fn expected_token_kind_display() {
        let err = ParseError::ExpectedTokenKind {
            expected: TokenKind::RightParenthesis,
            found: None,
        };
        assert_eq!(
            err.to_string(),
            "expected a closing parenthesis, found the end of the document"
        );
    }

    #[test]
    fn csv_continuation_display() {
        let err = ParseError::CsvContinuation {
            kind: CsvContinuationKind::DanglingComma,
            position: position(),
        };
        assert_eq!(
            err.to_string(),
            "a comma cannot be followed by the end of the list"
        );
    }

    #[test]
    fn invalid_primitive_type_names_the_offender() {
        let err = ParseError::InvalidPrimitiveType {
            found: FoundToken {
                kind: TokenKind::Identifier,
                data: "integer".into(),
                position: position(),
            },
        };
        assert_eq!(err.to_string(), "integer is not a primitive type");
    }
}
