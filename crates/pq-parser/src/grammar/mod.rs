//! One function per grammar production.
//!
//! Every production opens a context node, reads its children in attribute
//! order, and closes the context into an AST node. A failed read propagates
//! its error with `?` and leaves the context open; the caller's contexts
//! stay open above it, which is what keeps the tree inspectable mid-error.

pub(crate) mod expressions;
pub(crate) mod literals;
pub(crate) mod sections;
pub(crate) mod types;

use pq_common::token::TokenKind;

use crate::ast::{NodeContents, NodeId, NodeKind};
use crate::error::{CsvContinuationKind, FoundToken, ParseError};
use crate::state::ParseState;

/// Read a whole document: an expression document, or failing that, a
/// section document. Both attempts run against a copy; whichever got
/// further supplies the final state, ties preferring the expression
/// reading.
pub(crate) fn read_document<'s>(state: &mut ParseState<'s>) -> Result<NodeId, ParseError> {
    let mut expression_attempt = state.deep_copy();
    let expression_result = expressions::read_expression(&mut expression_attempt)
        .and_then(|root| expect_no_trailing_tokens(&expression_attempt).map(|()| root));
    match expression_result {
        Ok(root) => {
            state.apply_state(expression_attempt);
            return Ok(root);
        }
        Err(expression_error) => {
            let mut section_attempt = state.deep_copy();
            let section_result = sections::read_section(&mut section_attempt)
                .and_then(|root| expect_no_trailing_tokens(&section_attempt).map(|()| root));
            match section_result {
                Ok(root) => {
                    state.apply_state(section_attempt);
                    Ok(root)
                }
                Err(section_error) => {
                    if section_attempt.token_index > expression_attempt.token_index {
                        state.apply_state(section_attempt);
                        Err(section_error)
                    } else {
                        state.apply_state(expression_attempt);
                        Err(expression_error)
                    }
                }
            }
        }
    }
}

fn expect_no_trailing_tokens(state: &ParseState) -> Result<(), ParseError> {
    match state.current_token() {
        None => Ok(()),
        Some(token) => Err(ParseError::UnusedTokensRemain {
            first_unused: FoundToken::of(token),
        }),
    }
}

// ── Reading primitives ─────────────────────────────────────────────────

/// Read a fixed piece of syntax as a `Constant` leaf.
pub(crate) fn read_constant(state: &mut ParseState, kind: TokenKind) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::Constant);
    let token = state.read_token_kind(kind)?;
    Ok(state.end_context(
        true,
        NodeContents::Constant {
            literal: token.data.clone(),
        },
    ))
}

/// Read a constant if the current token has the right kind.
pub(crate) fn maybe_read_constant(state: &mut ParseState, kind: TokenKind) -> Option<NodeId> {
    if state.is_on(kind) {
        read_constant(state, kind).ok()
    } else {
        None
    }
}

/// Read an identifier with fixed text (`optional`, `nullable`, `table`,
/// `function`) as a `Constant` leaf, if it is the current token.
pub(crate) fn maybe_read_identifier_constant(
    state: &mut ParseState,
    literal: &str,
) -> Option<NodeId> {
    match state.current_token() {
        Some(token) if token.kind == TokenKind::Identifier && token.data == literal => {
            state.start_context(NodeKind::Constant);
            let token = state
                .read_token_kind(TokenKind::Identifier)
                .expect("the current token was just checked");
            Some(state.end_context(
                true,
                NodeContents::Constant {
                    literal: token.data.clone(),
                },
            ))
        }
        _ => None,
    }
}

/// Read an `Identifier` leaf.
pub(crate) fn read_identifier(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::Identifier);
    let token = state.read_token_kind(TokenKind::Identifier)?;
    Ok(state.end_context(
        true,
        NodeContents::Identifier {
            literal: token.data.clone(),
        },
    ))
}

/// Read a `GeneralizedIdentifier` leaf: one or more identifier-ish tokens
/// (identifiers, keywords, `null`), with the literal taken verbatim from
/// the source between the first and last of them.
pub(crate) fn read_generalized_identifier(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::GeneralizedIdentifier);

    let first = match state.current_token() {
        Some(token) if is_generalized_identifier_token(token.kind) => token,
        found => {
            return Err(ParseError::ExpectedGeneralizedIdentifier {
                found: found.map(FoundToken::of),
            })
        }
    };
    let start_code_unit = first.position_start.code_unit as usize;
    let mut end_code_unit = first.position_end.code_unit as usize;
    state.token_index += 1;

    while let Some(token) = state.current_token() {
        if !is_generalized_identifier_token(token.kind) {
            break;
        }
        end_code_unit = token.position_end.code_unit as usize;
        state.token_index += 1;
    }

    let literal = state.snapshot().text()[start_code_unit..end_code_unit].to_string();
    Ok(state.end_context(true, NodeContents::GeneralizedIdentifier { literal }))
}

fn is_generalized_identifier_token(kind: TokenKind) -> bool {
    use TokenKind as T;
    matches!(
        kind,
        T::Identifier
            | T::NullLiteral
            | T::KeywordAnd
            | T::KeywordAs
            | T::KeywordEach
            | T::KeywordElse
            | T::KeywordError
            | T::KeywordFalse
            | T::KeywordIf
            | T::KeywordIn
            | T::KeywordIs
            | T::KeywordLet
            | T::KeywordMeta
            | T::KeywordNot
            | T::KeywordOtherwise
            | T::KeywordOr
            | T::KeywordSection
            | T::KeywordShared
            | T::KeywordThen
            | T::KeywordTrue
            | T::KeywordTry
            | T::KeywordType
    )
}

/// Read a comma-separated list into an `ArrayWrapper` of `Csv` nodes.
///
/// Each `Csv` wraps one element plus its trailing comma. A comma followed
/// directly by the terminator raises the continuation error from inside the
/// freshly opened `Csv`, so the dangling slot stays visible as an open
/// context.
pub(crate) fn read_csv_array<'s>(
    state: &mut ParseState<'s>,
    mut element: impl FnMut(&mut ParseState<'s>) -> Result<NodeId, ParseError>,
    terminator: TokenKind,
) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::ArrayWrapper);

    if !state.is_on(terminator) {
        let mut continued = false;
        loop {
            state.start_context(NodeKind::Csv);
            if continued && state.is_on(terminator) {
                let kind = if terminator == TokenKind::KeywordIn {
                    CsvContinuationKind::LetExpression
                } else {
                    CsvContinuationKind::DanglingComma
                };
                return Err(ParseError::CsvContinuation {
                    kind,
                    position: state.current_position(),
                });
            }
            element(state)?;
            let comma = maybe_read_constant(state, TokenKind::Comma);
            state.end_context(false, NodeContents::None);
            if comma.is_none() {
                break;
            }
            continued = true;
        }
    }

    Ok(state.end_context(false, NodeContents::None))
}

/// Read the closing half of a wrapped construct, converting an
/// end-of-stream into the matching unterminated error.
pub(crate) fn read_closing_constant(
    state: &mut ParseState,
    kind: TokenKind,
    open_position: pq_common::position::TokenPosition,
) -> Result<NodeId, ParseError> {
    if state.is_eof() {
        return Err(match kind {
            TokenKind::RightParenthesis => ParseError::UnterminatedParenthesis { open_position },
            _ => ParseError::UnterminatedBracket { open_position },
        });
    }
    read_constant(state, kind)
}
