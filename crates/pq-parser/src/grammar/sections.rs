//! Section documents: `section Name;` followed by members.

use pq_common::token::TokenKind;

use crate::ast::{NodeContents, NodeId, NodeKind};
use crate::error::ParseError;
use crate::state::ParseState;

use super::literals;
use super::{maybe_read_constant, read_constant, read_identifier};

/// `[attributes]? section name?; member*`
pub(crate) fn read_section(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::Section);

    if state.is_on(TokenKind::LeftBracket) {
        literals::read_record_literal(state)?;
    }
    read_constant(state, TokenKind::KeywordSection)?;
    if state.is_on(TokenKind::Identifier) {
        read_identifier(state)?;
    }
    read_constant(state, TokenKind::Semicolon)?;

    state.start_context(NodeKind::ArrayWrapper);
    while !state.is_eof() {
        read_section_member(state)?;
    }
    state.end_context(false, NodeContents::None);

    Ok(state.end_context(false, NodeContents::None))
}

/// `[attributes]? shared? name = expression;`
fn read_section_member(state: &mut ParseState) -> Result<NodeId, ParseError> {
    state.start_context(NodeKind::SectionMember);

    if state.is_on(TokenKind::LeftBracket) {
        literals::read_record_literal(state)?;
    }
    maybe_read_constant(state, TokenKind::KeywordShared);
    literals::read_identifier_paired_expression(state)?;
    read_constant(state, TokenKind::Semicolon)?;

    Ok(state.end_context(false, NodeContents::None))
}
