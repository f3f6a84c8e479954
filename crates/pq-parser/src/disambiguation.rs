//! Bounded-lookahead resolution of the two ambiguous openers.
//!
//! `(` may begin a function expression or a parenthesized expression; `[`
//! may begin a record, a field selector, or a field projection. Parentheses
//! resolve by scanning for what follows the matching `)`. Brackets resolve
//! by a one-token peek when that is conclusive, otherwise the parser falls
//! back to speculative attempts (see `grammar::expressions`).

use pq_common::token::TokenKind;

use crate::error::ParseError;
use crate::state::ParseState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenthesisDisambiguation {
    FunctionExpression,
    ParenthesizedExpression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketDisambiguation {
    RecordExpression,
    FieldSelector,
    FieldProjection,
}

/// Decide what a `(` under the cursor opens by finding its matching `)` and
/// scanning for a `=>` after it, looking past an optional return-type
/// clause. Without the arrow the parens are a grouped expression, even when
/// an `as` cast follows them.
pub(crate) fn disambiguate_parenthesis(
    state: &ParseState,
) -> Result<ParenthesisDisambiguation, ParseError> {
    let open_position = state.current_position();
    let mut depth = 1u32;
    let mut index = state.token_index + 1;

    loop {
        let token = match state.token_at(index) {
            Some(token) => token,
            None => return Err(ParseError::UnterminatedParenthesis { open_position }),
        };
        match token.kind {
            TokenKind::LeftParenthesis => depth += 1,
            TokenKind::RightParenthesis => {
                depth -= 1;
                if depth == 0 {
                    let function = match state.token_at(index + 1).map(|token| token.kind) {
                        Some(TokenKind::FatArrow) => true,
                        Some(TokenKind::KeywordAs) => {
                            fat_arrow_follows_return_type(state, index + 2)
                        }
                        _ => false,
                    };
                    return Ok(if function {
                        ParenthesisDisambiguation::FunctionExpression
                    } else {
                        ParenthesisDisambiguation::ParenthesizedExpression
                    });
                }
            }
            _ => {}
        }
        index += 1;
    }
}

/// Whether the tokens at `index` form a nullable-primitive-type clause with
/// a `=>` directly behind it. `(x) as number => x` is a function;
/// `(1 + 2) as number` is a cast of a grouped expression.
fn fat_arrow_follows_return_type(state: &ParseState, mut index: u32) -> bool {
    if let Some(token) = state.token_at(index) {
        if token.kind == TokenKind::Identifier && token.data == "nullable" {
            index += 1;
        }
    }
    match state.token_at(index) {
        Some(token) if matches!(
            token.kind,
            TokenKind::Identifier | TokenKind::NullLiteral | TokenKind::KeywordType
        ) =>
        {
            index += 1;
        }
        _ => return false,
    }
    state.token_at(index).map(|token| token.kind) == Some(TokenKind::FatArrow)
}

/// Peek one token past a `[`. `Some` when that settles the reading,
/// `None` when speculation has to decide.
pub(crate) fn peek_bracket(state: &ParseState) -> Result<Option<BracketDisambiguation>, ParseError> {
    match state.token_kind_ahead(1) {
        None => Err(ParseError::UnterminatedBracket {
            open_position: state.current_position(),
        }),
        Some(TokenKind::LeftBracket) => Ok(Some(BracketDisambiguation::FieldProjection)),
        Some(TokenKind::RightBracket) => Ok(Some(BracketDisambiguation::RecordExpression)),
        Some(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pq_common::settings::{LexSettings, ParseSettings};
    use pq_lexer::LexerSnapshot;

    fn state_for(text: &str) -> (LexerSnapshot, ParseSettings) {
        let snapshot =
            LexerSnapshot::try_from_state(&pq_lexer::lex(&LexSettings::default(), text)).unwrap();
        (snapshot, ParseSettings::default())
    }

    #[test]
    fn parenthesis_function() {
        let (snapshot, settings) = state_for("(x, y) => x");
        let state = ParseState::new(&settings, &snapshot);
        assert_eq!(
            disambiguate_parenthesis(&state).unwrap(),
            ParenthesisDisambiguation::FunctionExpression
        );
    }

    #[test]
    fn parenthesis_function_with_return_type() {
        let (snapshot, settings) = state_for("(x) as number => x");
        let state = ParseState::new(&settings, &snapshot);
        assert_eq!(
            disambiguate_parenthesis(&state).unwrap(),
            ParenthesisDisambiguation::FunctionExpression
        );

        let (snapshot, settings) = state_for("(x) as nullable number => x");
        let state = ParseState::new(&settings, &snapshot);
        assert_eq!(
            disambiguate_parenthesis(&state).unwrap(),
            ParenthesisDisambiguation::FunctionExpression
        );
    }

    #[test]
    fn parenthesis_cast_without_arrow_is_grouping() {
        for source in ["(1 + 2) as number", "(1) as nullable number", "(x) as null"] {
            let (snapshot, settings) = state_for(source);
            let state = ParseState::new(&settings, &snapshot);
            assert_eq!(
                disambiguate_parenthesis(&state).unwrap(),
                ParenthesisDisambiguation::ParenthesizedExpression,
                "{source}"
            );
        }
    }

    #[test]
    fn parenthesis_grouping() {
        let (snapshot, settings) = state_for("(x + 1) * 2");
        let state = ParseState::new(&settings, &snapshot);
        assert_eq!(
            disambiguate_parenthesis(&state).unwrap(),
            ParenthesisDisambiguation::ParenthesizedExpression
        );
    }

    #[test]
    fn parenthesis_nested() {
        let (snapshot, settings) = state_for("((x) => x)(1)");
        let state = ParseState::new(&settings, &snapshot);
        // The outer parenthesis is a grouping even though the inner one is
        // a function.
        assert_eq!(
            disambiguate_parenthesis(&state).unwrap(),
            ParenthesisDisambiguation::ParenthesizedExpression
        );
    }

    #[test]
    fn parenthesis_unterminated() {
        let (snapshot, settings) = state_for("(x + 1");
        let state = ParseState::new(&settings, &snapshot);
        assert!(matches!(
            disambiguate_parenthesis(&state),
            Err(ParseError::UnterminatedParenthesis { .. })
        ));
    }

    #[test]
    fn bracket_peek() {
        let (snapshot, settings) = state_for("[]");
        let state = ParseState::new(&settings, &snapshot);
        assert_eq!(
            peek_bracket(&state).unwrap(),
            Some(BracketDisambiguation::RecordExpression)
        );

        let (snapshot, settings) = state_for("[[a], [b]]");
        let state = ParseState::new(&settings, &snapshot);
        assert_eq!(
            peek_bracket(&state).unwrap(),
            Some(BracketDisambiguation::FieldProjection)
        );

        let (snapshot, settings) = state_for("[a = 1]");
        let state = ParseState::new(&settings, &snapshot);
        assert_eq!(peek_bracket(&state).unwrap(), None);

        let (snapshot, settings) = state_for("[");
        let state = ParseState::new(&settings, &snapshot);
        assert!(matches!(
            peek_bracket(&state),
            Err(ParseError::UnterminatedBracket { .. })
        ));
    }
}
