//! Literal productions and the key `=` value pairs.

use pq_common::token::TokenKind;

use crate::ast::{LiteralKind, NodeContents, NodeId, NodeKind};
use crate::error::{FoundToken, ParseError};
use crate::state::ParseState;

use super::expressions::read_expression;
use super::{
    read_closing_constant, read_constant, read_csv_array, read_generalized_identifier,
    read_identifier,
};

pub(crate) fn read_literal_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    use TokenKind as T;
    state.start_context(NodeKind::LiteralExpression);

    let literal_kind = match state.current_token_kind() {
        Some(T::NumericLiteral | T::HexLiteral | T::KeywordHashInfinity | T::KeywordHashNan) => {
            LiteralKind::Numeric
        }
        Some(T::StringLiteral) => LiteralKind::Text,
        Some(T::NullLiteral) => LiteralKind::Null,
        Some(T::KeywordTrue | T::KeywordFalse) => LiteralKind::Logical,
        _ => {
            return Err(ParseError::ExpectedAnyTokenKind {
                expected: vec![
                    T::NumericLiteral,
                    T::HexLiteral,
                    T::StringLiteral,
                    T::NullLiteral,
                    T::KeywordTrue,
                    T::KeywordFalse,
                ],
                found: state.current_token().map(FoundToken::of),
            })
        }
    };

    let token = state
        .current_token()
        .expect("the literal token was just matched");
    let literal = token.data.clone();
    state.token_index += 1;
    Ok(state.end_context(
        true,
        NodeContents::Literal {
            literal,
            literal_kind,
        },
    ))
}

/// `name = expression`, with a plain identifier key. Used by `let`
/// bindings and section members.
pub(crate) fn read_identifier_paired_expression(
    state: &mut ParseState,
) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::IdentifierPairedExpression);
    read_identifier(state)?;
    read_constant(state, TokenKind::Equal)?;
    read_expression(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

/// `key = expression`, with a generalized-identifier key. Used by records.
pub(crate) fn read_generalized_identifier_paired_expression(
    state: &mut ParseState,
) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::GeneralizedIdentifierPairedExpression);
    read_generalized_identifier(state)?;
    read_constant(state, TokenKind::Equal)?;
    read_expression(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

/// `key = any-literal`, used inside literal attribute records.
fn read_generalized_identifier_paired_any_literal(
    state: &mut ParseState,
) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::GeneralizedIdentifierPairedAnyLiteral);
    read_generalized_identifier(state)?;
    read_constant(state, TokenKind::Equal)?;
    read_any_literal(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

/// A literal record, e.g. section attributes: `[Version = "1.0"]`.
pub(crate) fn read_record_literal(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::RecordLiteral);
    let open_position = state.current_position();
    read_constant(state, TokenKind::LeftBracket)?;
    read_csv_array(
        state,
        read_generalized_identifier_paired_any_literal,
        TokenKind::RightBracket,
    )?;
    read_closing_constant(state, TokenKind::RightBracket, open_position)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_list_literal(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::ListLiteral);
    let open_position = state.current_position();
    read_constant(state, TokenKind::LeftBrace)?;
    read_csv_array(state, read_any_literal, TokenKind::RightBrace)?;
    read_closing_constant(state, TokenKind::RightBrace, open_position)?;
    Ok(state.end_context(false, NodeContents::None))
}

/// A literal value: a record literal, a list literal, or a plain literal.
fn read_any_literal(state: &mut ParseState) -> Result<NodeId, ParseError> {
    match state.current_token_kind() {
        Some(TokenKind::LeftBracket) => read_record_literal(state),
        Some(TokenKind::LeftBrace) => read_list_literal(state),
        _ => read_literal_expression(state),
    }
}
