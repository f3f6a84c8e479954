//! Expression productions.
//!
//! Binary operator chains, the recursive-primary chain, and the optional
//! `meta` pair all open their wrapper context before the first operand.
//! When no operator follows, `delete_context` promotes the lone operand
//! into the wrapper's slot, so single operands never leave a wrapper node
//! behind.

use pq_common::settings::DisambiguationBehavior;
use pq_common::token::TokenKind;

use crate::ast::{NodeContents, NodeId, NodeKind};
use crate::disambiguation::{
    disambiguate_parenthesis, peek_bracket, BracketDisambiguation, ParenthesisDisambiguation,
};
use crate::error::{FoundToken, ParseError};
use crate::state::ParseState;

use super::literals;
use super::types;
use super::{
    maybe_read_constant, maybe_read_identifier_constant, read_closing_constant, read_constant,
    read_csv_array, read_generalized_identifier, read_identifier,
};

pub(crate) fn read_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    match state.current_token_kind() {
        Some(TokenKind::KeywordEach) => read_each_expression(state),
        Some(TokenKind::KeywordLet) => read_let_expression(state),
        Some(TokenKind::KeywordIf) => read_if_expression(state),
        Some(TokenKind::KeywordError) => read_error_raising_expression(state),
        Some(TokenKind::KeywordTry) => read_error_handling_expression(state),
        Some(TokenKind::LeftParenthesis) => match disambiguate_parenthesis(state)? {
            ParenthesisDisambiguation::FunctionExpression => read_function_expression(state),
            ParenthesisDisambiguation::ParenthesizedExpression => read_logical_expression(state),
        },
        _ => read_logical_expression(state),
    }
}

// ── Operator chains ────────────────────────────────────────────────────

/// Read a flat operator chain: `operand (op operand)*`. The chain node's
/// children alternate operand, operator constant, operand, and so on. With
/// no operator the wrapper is deleted and the operand promoted.
fn read_chain<'s>(
    state: &mut ParseState<'s>,
    kind: NodeKind,
    operators: &[TokenKind],
    mut first: impl FnMut(&mut ParseState<'s>) -> Result<NodeId, ParseError>,
    mut rest: impl FnMut(&mut ParseState<'s>) -> Result<NodeId, ParseError>,
) -> Result<NodeId, ParseError> {
    state.start_context(kind);
    first(state)?;

    let mut read_any = false;
    while let Some(current) = state.current_token_kind() {
        if !operators.contains(&current) {
            break;
        }
        read_constant(state, current)?;
        rest(state)?;
        read_any = true;
    }

    if read_any {
        Ok(state.end_context(false, NodeContents::None))
    } else {
        Ok(state
            .delete_context()
            .expect("the chain wrapper held exactly one operand"))
    }
}

pub(crate) fn read_logical_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    read_chain(
        state,
        NodeKind::LogicalExpression,
        &[TokenKind::KeywordAnd, TokenKind::KeywordOr],
        read_is_expression,
        read_is_expression,
    )
}

fn read_is_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    read_chain(
        state,
        NodeKind::IsExpression,
        &[TokenKind::KeywordIs],
        read_as_expression,
        types::read_nullable_primitive_type,
    )
}

fn read_as_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    read_chain(
        state,
        NodeKind::AsExpression,
        &[TokenKind::KeywordAs],
        read_equality_expression,
        types::read_nullable_primitive_type,
    )
}

fn read_equality_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    read_chain(
        state,
        NodeKind::EqualityExpression,
        &[TokenKind::Equal, TokenKind::NotEqual],
        read_relational_expression,
        read_relational_expression,
    )
}

fn read_relational_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    read_chain(
        state,
        NodeKind::RelationalExpression,
        &[
            TokenKind::LessThan,
            TokenKind::LessThanEqualTo,
            TokenKind::GreaterThan,
            TokenKind::GreaterThanEqualTo,
        ],
        read_arithmetic_expression,
        read_arithmetic_expression,
    )
}

fn read_arithmetic_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    read_chain(
        state,
        NodeKind::ArithmeticExpression,
        &[
            TokenKind::Asterisk,
            TokenKind::Division,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Ampersand,
        ],
        read_metadata_expression,
        read_metadata_expression,
    )
}

fn read_metadata_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::MetadataExpression);
    read_unary_expression(state)?;
    if state.is_on(TokenKind::KeywordMeta) {
        read_constant(state, TokenKind::KeywordMeta)?;
        read_unary_expression(state)?;
        Ok(state.end_context(false, NodeContents::None))
    } else {
        Ok(state
            .delete_context()
            .expect("the metadata wrapper held exactly one operand"))
    }
}

fn read_unary_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    const UNARY_OPERATORS: [TokenKind; 3] =
        [TokenKind::Plus, TokenKind::Minus, TokenKind::KeywordNot];

    let on_operator = state
        .current_token_kind()
        .is_some_and(|kind| UNARY_OPERATORS.contains(&kind));
    if !on_operator {
        return read_type_expression(state);
    }

    state.start_context(NodeKind::UnaryExpression);
    state.start_context(NodeKind::ArrayWrapper);
    while let Some(current) = state.current_token_kind() {
        if !UNARY_OPERATORS.contains(&current) {
            break;
        }
        read_constant(state, current)?;
    }
    state.end_context(false, NodeContents::None);
    read_type_expression(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_type_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    if state.is_on(TokenKind::KeywordType) {
        types::read_type_primary_type(state)
    } else {
        read_primary_expression(state)
    }
}

// ── Primary expressions ────────────────────────────────────────────────

fn is_recursive_start(kind: Option<TokenKind>) -> bool {
    matches!(
        kind,
        Some(TokenKind::LeftParenthesis) | Some(TokenKind::LeftBrace) | Some(TokenKind::LeftBracket)
    )
}

/// Read a primary expression and, when `(`/`{`/`[` follows, the recursive
/// chain hanging off it (invocations, item accesses, field selections).
fn read_primary_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::RecursivePrimaryExpression);
    read_primary_head(state)?;

    if !is_recursive_start(state.current_token_kind()) {
        return Ok(state
            .delete_context()
            .expect("the recursive-primary wrapper held exactly one head"));
    }

    state.start_context(NodeKind::ArrayWrapper);
    while let Some(current) = state.current_token_kind() {
        match current {
            TokenKind::LeftParenthesis => read_invoke_expression(state)?,
            TokenKind::LeftBrace => read_item_access_expression(state)?,
            TokenKind::LeftBracket => match peek_bracket(state)? {
                Some(BracketDisambiguation::FieldProjection) => read_field_projection(state)?,
                _ => read_field_selector(state)?,
            },
            _ => break,
        };
    }
    state.end_context(false, NodeContents::None);
    Ok(state.end_context(false, NodeContents::None))
}

fn read_primary_head(state: &mut ParseState) -> Result<NodeId, ParseError> {
    use TokenKind as T;
    match state.current_token_kind() {
        Some(T::Identifier) | Some(T::AtSign) => read_identifier_expression(state),
        Some(T::LeftParenthesis) => read_parenthesized_expression(state),
        Some(T::LeftBracket) => read_bracket_expression(state),
        Some(T::LeftBrace) => read_list_expression(state),
        Some(T::Ellipsis) => read_not_implemented_expression(state),
        Some(
            T::NumericLiteral
            | T::HexLiteral
            | T::StringLiteral
            | T::NullLiteral
            | T::KeywordTrue
            | T::KeywordFalse
            | T::KeywordHashInfinity
            | T::KeywordHashNan,
        ) => literals::read_literal_expression(state),
        Some(
            T::KeywordHashBinary
            | T::KeywordHashDate
            | T::KeywordHashDateTime
            | T::KeywordHashDateTimeZone
            | T::KeywordHashDuration
            | T::KeywordHashSections
            | T::KeywordHashShared
            | T::KeywordHashTable
            | T::KeywordHashTime,
        ) => read_keyword_identifier_expression(state),
        found => Err(ParseError::ExpectedAnyTokenKind {
            expected: vec![
                T::Identifier,
                T::LeftParenthesis,
                T::LeftBracket,
                T::LeftBrace,
                T::NumericLiteral,
                T::StringLiteral,
            ],
            found: found
                .and_then(|_| state.current_token())
                .map(FoundToken::of),
        }),
    }
}

pub(crate) fn read_identifier_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::IdentifierExpression);
    maybe_read_constant(state, TokenKind::AtSign);
    read_identifier(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

/// `#sections`, `#table`, and friends act as identifier heads so the
/// recursive chain can invoke them.
fn read_keyword_identifier_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::IdentifierExpression);
    state.start_context(NodeKind::Identifier);
    let token = match state.current_token() {
        Some(token) => token,
        None => {
            return Err(ParseError::ExpectedTokenKind {
                expected: TokenKind::Identifier,
                found: None,
            })
        }
    };
    let literal = token.data.clone();
    state.token_index += 1;
    state.end_context(true, NodeContents::Identifier { literal });
    Ok(state.end_context(false, NodeContents::None))
}

fn read_parenthesized_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::ParenthesizedExpression);
    let open_position = state.current_position();
    read_constant(state, TokenKind::LeftParenthesis)?;
    read_expression(state)?;
    read_closing_constant(state, TokenKind::RightParenthesis, open_position)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_not_implemented_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::NotImplementedExpression);
    read_constant(state, TokenKind::Ellipsis)?;
    Ok(state.end_context(false, NodeContents::None))
}

/// `[` in expression position: a record, a field selector on the implicit
/// target, or a field projection. A one-token peek resolves the easy cases;
/// otherwise the readings are attempted speculatively per the configured
/// behavior.
fn read_bracket_expression<'s>(state: &mut ParseState<'s>) -> Result<NodeId, ParseError> {
    match peek_bracket(state)? {
        Some(BracketDisambiguation::RecordExpression) => read_record_expression(state),
        Some(BracketDisambiguation::FieldProjection) => read_field_projection(state),
        Some(BracketDisambiguation::FieldSelector) => read_field_selector(state),
        None => {
            let attempts: [fn(&mut ParseState<'s>) -> Result<NodeId, ParseError>; 3] = [
                read_record_expression as fn(&mut ParseState<'s>) -> Result<NodeId, ParseError>,
                read_field_selector as fn(&mut ParseState<'s>) -> Result<NodeId, ParseError>,
                read_field_projection as fn(&mut ParseState<'s>) -> Result<NodeId, ParseError>,
            ];
            match state.disambiguation_behavior {
                DisambiguationBehavior::Strict => try_first(state, &attempts),
                DisambiguationBehavior::Thorough => try_furthest(state, &attempts),
            }
        }
    }
}

/// Run attempts over copied state, committing the first success.
fn try_first<'s>(
    state: &mut ParseState<'s>,
    attempts: &[fn(&mut ParseState<'s>) -> Result<NodeId, ParseError>],
) -> Result<NodeId, ParseError> {
    let mut first_failure: Option<(ParseState<'s>, ParseError)> = None;
    for attempt in attempts {
        let mut copy = state.deep_copy();
        match attempt(&mut copy) {
            Ok(root) => {
                state.apply_state(copy);
                return Ok(root);
            }
            Err(error) => {
                if first_failure.is_none() {
                    first_failure = Some((copy, error));
                }
            }
        }
    }
    let (copy, error) = first_failure.expect("at least one attempt ran");
    state.apply_state(copy);
    Err(error)
}

/// Run every attempt over copied state, committing the one that consumed
/// the most tokens without error.
fn try_furthest<'s>(
    state: &mut ParseState<'s>,
    attempts: &[fn(&mut ParseState<'s>) -> Result<NodeId, ParseError>],
) -> Result<NodeId, ParseError> {
    let mut best: Option<(ParseState<'s>, NodeId)> = None;
    let mut first_failure: Option<(ParseState<'s>, ParseError)> = None;
    for attempt in attempts {
        let mut copy = state.deep_copy();
        match attempt(&mut copy) {
            Ok(root) => {
                let better = match &best {
                    Some((current, _)) => copy.token_index > current.token_index,
                    None => true,
                };
                if better {
                    best = Some((copy, root));
                }
            }
            Err(error) => {
                if first_failure.is_none() {
                    first_failure = Some((copy, error));
                }
            }
        }
    }
    match best {
        Some((copy, root)) => {
            state.apply_state(copy);
            Ok(root)
        }
        None => {
            let (copy, error) = first_failure.expect("at least one attempt ran");
            state.apply_state(copy);
            Err(error)
        }
    }
}

pub(crate) fn read_record_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::RecordExpression);
    let open_position = state.current_position();
    read_constant(state, TokenKind::LeftBracket)?;
    read_csv_array(
        state,
        literals::read_generalized_identifier_paired_expression,
        TokenKind::RightBracket,
    )?;
    read_closing_constant(state, TokenKind::RightBracket, open_position)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_field_selector(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::FieldSelector);
    let open_position = state.current_position();
    read_constant(state, TokenKind::LeftBracket)?;
    read_generalized_identifier(state)?;
    read_closing_constant(state, TokenKind::RightBracket, open_position)?;
    maybe_read_constant(state, TokenKind::QuestionMark);
    Ok(state.end_context(false, NodeContents::None))
}

fn read_field_projection(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::FieldProjection);
    let open_position = state.current_position();
    read_constant(state, TokenKind::LeftBracket)?;
    read_csv_array(state, read_field_selector, TokenKind::RightBracket)?;
    read_closing_constant(state, TokenKind::RightBracket, open_position)?;
    maybe_read_constant(state, TokenKind::QuestionMark);
    Ok(state.end_context(false, NodeContents::None))
}

pub(crate) fn read_list_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::ListExpression);
    let open_position = state.current_position();
    read_constant(state, TokenKind::LeftBrace)?;
    read_csv_array(state, read_list_item, TokenKind::RightBrace)?;
    read_closing_constant(state, TokenKind::RightBrace, open_position)?;
    Ok(state.end_context(false, NodeContents::None))
}

/// A list item, possibly a `low..high` range.
fn read_list_item(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::RangeExpression);
    read_expression(state)?;
    if state.is_on(TokenKind::DotDot) {
        read_constant(state, TokenKind::DotDot)?;
        read_expression(state)?;
        Ok(state.end_context(false, NodeContents::None))
    } else {
        Ok(state
            .delete_context()
            .expect("the range wrapper held exactly one operand"))
    }
}

fn read_invoke_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::InvokeExpression);
    let open_position = state.current_position();
    read_constant(state, TokenKind::LeftParenthesis)?;
    read_csv_array(state, read_expression, TokenKind::RightParenthesis)?;
    read_closing_constant(state, TokenKind::RightParenthesis, open_position)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_item_access_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::ItemAccessExpression);
    let open_position = state.current_position();
    read_constant(state, TokenKind::LeftBrace)?;
    read_expression(state)?;
    read_closing_constant(state, TokenKind::RightBrace, open_position)?;
    maybe_read_constant(state, TokenKind::QuestionMark);
    Ok(state.end_context(false, NodeContents::None))
}

// ── Keyword-led expressions ────────────────────────────────────────────

fn read_if_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::IfExpression);
    read_constant(state, TokenKind::KeywordIf)?;
    read_expression(state)?;
    read_constant(state, TokenKind::KeywordThen)?;
    read_expression(state)?;
    read_constant(state, TokenKind::KeywordElse)?;
    read_expression(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_each_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::EachExpression);
    read_constant(state, TokenKind::KeywordEach)?;
    read_expression(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_let_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::LetExpression);
    read_constant(state, TokenKind::KeywordLet)?;
    read_csv_array(
        state,
        literals::read_identifier_paired_expression,
        TokenKind::KeywordIn,
    )?;
    read_constant(state, TokenKind::KeywordIn)?;
    read_expression(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_error_raising_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::ErrorRaisingExpression);
    read_constant(state, TokenKind::KeywordError)?;
    read_expression(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

fn read_error_handling_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::ErrorHandlingExpression);
    read_constant(state, TokenKind::KeywordTry)?;
    read_expression(state)?;
    if state.is_on(TokenKind::KeywordOtherwise) {
        state.start_context(NodeKind::OtherwiseExpression);
        read_constant(state, TokenKind::KeywordOtherwise)?;
        read_expression(state)?;
        state.end_context(false, NodeContents::None);
    }
    Ok(state.end_context(false, NodeContents::None))
}

// ── Function expressions ───────────────────────────────────────────────

fn read_function_expression(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::FunctionExpression);
    read_parameter_list(state)?;
    if state.is_on(TokenKind::KeywordAs) {
        types::read_as_nullable_primitive_type(state)?;
    }
    read_constant(state, TokenKind::FatArrow)?;
    read_expression(state)?;
    Ok(state.end_context(false, NodeContents::None))
}

pub(crate) fn read_parameter_list(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::ParameterList);
    let open_position = state.current_position();
    read_constant(state, TokenKind::LeftParenthesis)?;
    let mut seen_optional = false;
    read_csv_array(
        state,
        |state| read_parameter(state, &mut seen_optional),
        TokenKind::RightParenthesis,
    )?;
    read_closing_constant(state, TokenKind::RightParenthesis, open_position)?;
    Ok(state.end_context(false, NodeContents::None))
}

/// One parameter: `[optional] name [as nullable-primitive-type]`. Once an
/// optional parameter is seen, every later parameter must be optional too.
fn read_parameter(state: &mut ParseState, seen_optional: &mut bool) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::Parameter);
    match maybe_read_identifier_constant(state, "optional") {
        Some(_) => *seen_optional = true,
        None => {
            if *seen_optional {
                return Err(ParseError::RequiredParameterAfterOptional {
                    position: state.current_position(),
                });
            }
        }
    }
    read_identifier(state)?;
    if state.is_on(TokenKind::KeywordAs) {
        types::read_as_nullable_primitive_type(state)?;
    }
    Ok(state.end_context(false, NodeContents::None))
}
