//! Type productions: `type …` expressions, primitive types, record/list/
//! function/table types, and the `as` clauses used by parameters and
//! `is`/`as` chains.

use pq_common::token::TokenKind;

use crate::ast::{NodeContents, NodeId, NodeKind, PrimitiveTypeKind};
use crate::error::{FoundToken, ParseError};
use crate::state::ParseState;

use super::expressions;
use super::{
    maybe_read_constant, maybe_read_identifier_constant, read_closing_constant, read_constant,
    read_generalized_identifier,
};

/// `type` followed by a primary type.
pub(crate) fn read_type_primary_type(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::TypePrimaryType);
    read_constant(state, TokenKind::KeywordType)?;
    read_primary_type(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

/// A type position: a primary type when the current token can start one,
/// otherwise an expression that evaluates to a type.
pub(crate) fn read_type(state: &mut ParseState) -> Result<NodeId, ParseError> {
    if is_primary_type_start(state) {
        read_primary_type(state)
    } else {
        expressions::read_expression(state)
    }
}

fn is_primary_type_start(state: &ParseState) -> bool {
    match state.current_token() {
        Some(token) => match token.kind {
            TokenKind::LeftBracket | TokenKind::LeftBrace | TokenKind::NullLiteral => true,
            TokenKind::KeywordType => true,
            TokenKind::Identifier => {
                PrimitiveTypeKind::from_literal(&token.data).is_some()
                    || matches!(token.data.as_str(), "table" | "function" | "nullable")
            }
            _ => false,
        },
        None => false,
    }
}

fn read_primary_type(state: &mut ParseState) -> Result<NodeId, ParseError> {
    match state.current_token() {
        Some(token) if token.kind == TokenKind::LeftBracket => read_record_type(state),
        Some(token) if token.kind == TokenKind::LeftBrace => read_list_type(state),
        Some(token) if token.kind == TokenKind::Identifier && token.data == "table" => {
            read_table_type(state)
        }
        Some(token) if token.kind == TokenKind::Identifier && token.data == "function" => {
            read_function_type(state)
        }
        Some(token) if token.kind == TokenKind::Identifier && token.data == "nullable" => {
            read_nullable_type(state)
        }
        _ => read_primitive_type(state),
    }
}

/// A single-token primitive type: `number`, `text`, `null`, `type`, …
pub(crate) fn read_primitive_type(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::PrimitiveType);

    let kind = match state.current_token() {
        Some(token) => match token.kind {
            TokenKind::Identifier => PrimitiveTypeKind::from_literal(&token.data),
            TokenKind::NullLiteral => Some(PrimitiveTypeKind::Null),
            TokenKind::KeywordType => Some(PrimitiveTypeKind::Type),
            _ => None,
        },
        None => None,
    };

    match (kind, state.current_token()) {
        (Some(kind), Some(_)) => {
            state.token_index += 1;
            Ok(state.end_context(true, NodeContents::PrimitiveType { kind }))
        }
        (_, Some(token)) => Err(ParseError::InvalidPrimitiveType {
            found: FoundToken::of(token),
        }),
        (_, None) => Err(ParseError::ExpectedTokenKind {
            expected: TokenKind::Identifier,
            found: None,
        }),
    }
}

/// `nullable`? primitive-type, the right-hand side of `is` and `as`.
pub(crate) fn read_nullable_primitive_type(state: &mut ParseState) -> Result<NodeId, ParseError> {
    match state.current_token() {
        Some(token) if token.kind == TokenKind::Identifier && token.data == "nullable" => {
            state.start_context(NodeKind::NullablePrimitiveType);
            maybe_read_identifier_constant(state, "nullable");
            read_primitive_type(state)?;
            Ok(state.end_context(false, NodeContents::None))
        }
        _ => read_primitive_type(state),
    }
}

/// `as` nullable-primitive-type.
pub(crate) fn read_as_nullable_primitive_type(
    state: &mut ParseState,
) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::AsNullablePrimitiveType);
    read_constant(state, TokenKind::KeywordAs)?;
    read_nullable_primitive_type(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_record_type(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::RecordType);
    read_field_specification_list(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_list_type(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::ListType);
    let open_position = state.current_position();
    read_constant(state, TokenKind::LeftBrace)?;
    read_type(state)?;
    read_closing_constant(state, TokenKind::RightBrace, open_position)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_table_type(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::TableType);
    maybe_read_identifier_constant(state, "table");
    if state.is_on(TokenKind::LeftBracket) {
        read_field_specification_list(state)?;
    } else {
        expressions::read_expression(state)?;
    }
    Ok(state.end_context(false, NodeContents::None))
}

fn read_function_type(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::FunctionType);
    maybe_read_identifier_constant(state, "function");
    expressions::read_parameter_list(state)?;
    read_as_nullable_primitive_type(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_nullable_type(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::NullableType);
    maybe_read_identifier_constant(state, "nullable");
    read_type(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

/// `[` field-specifications `,`* `...`? `]` -- the body of record and
/// table types, with an optional open-record marker.
fn read_field_specification_list(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::FieldSpecificationList);
    let open_position = state.current_position();
    read_constant(state, TokenKind::LeftBracket)?;

    state.start_context(NodeKind::ArrayWrapper);
    if !state.is_on(TokenKind::RightBracket) && !state.is_on(TokenKind::Ellipsis) {
        loop {
            state.start_context(NodeKind::Csv);
            read_field_specification(state)?;
            let comma = maybe_read_constant(state, TokenKind::Comma);
            state.end_context(false, NodeContents::None);
            if comma.is_none() {
                break;
            }
            if state.is_on(TokenKind::RightBracket) || state.is_on(TokenKind::Ellipsis) {
                break;
            }
        }
    }
    state.end_context(false, NodeContents::None);

    maybe_read_constant(state, TokenKind::Ellipsis);
    read_closing_constant(state, TokenKind::RightBracket, open_position)?;
    Ok(state.end_context(false, NodeContents::None))
}

/// `optional`? field-name (`=` field-type)?
fn read_field_specification(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::FieldSpecification);
    maybe_read_identifier_constant(state, "optional");
    read_generalized_identifier(state)?;
    if state.is_on(TokenKind::Equal) {
        read_field_type_specification(state)?;
    }
    Ok(state.end_context(false, NodeContents::None))
}

fn read_field_type_specification(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::FieldTypeSpecification);
    read_constant(state, TokenKind::Equal)?;
    read_type(state)?;
    Ok(state.end_context(false, NodeContents::None))
}
