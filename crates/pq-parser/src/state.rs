//! The parser's mutable state: a cursor over the snapshot's token stream
//! plus the context tree being built.
//!
//! Speculative parsing clones the whole state with [`ParseState::deep_copy`]
//! and commits a successful branch back with [`ParseState::apply_state`];
//! the original is never touched by a failed attempt.

use pq_common::position::{TokenPosition, TokenRange};
use pq_common::settings::{DisambiguationBehavior, ParseSettings};
use pq_common::token::{Token, TokenKind};
use pq_lexer::LexerSnapshot;

use crate::ast::{NodeContents, NodeId, NodeKind};
use crate::context::ContextState;
use crate::error::{FoundToken, ParseError};

#[derive(Debug, Clone)]
pub struct ParseState<'s> {
    snapshot: &'s LexerSnapshot,
    pub token_index: u32,
    pub context: ContextState,
    pub current_context_id: Option<NodeId>,
    pub disambiguation_behavior: DisambiguationBehavior,
}

impl<'s> ParseState<'s> {
    pub fn new(settings: &ParseSettings, snapshot: &'s LexerSnapshot) -> Self {
        Self {
            snapshot,
            token_index: 0,
            context: ContextState::new(),
            current_context_id: None,
            disambiguation_behavior: settings.disambiguation_behavior,
        }
    }

    pub fn snapshot(&self) -> &'s LexerSnapshot {
        self.snapshot
    }

    // ── Token cursor ───────────────────────────────────────────────────

    pub fn current_token(&self) -> Option<&'s Token> {
        self.token_at(self.token_index)
    }

    pub fn current_token_kind(&self) -> Option<TokenKind> {
        self.current_token().map(|token| token.kind)
    }

    /// Peek an absolute token index.
    pub fn token_at(&self, index: u32) -> Option<&'s Token> {
        self.snapshot.tokens().get(index as usize)
    }

    /// Peek `n` tokens past the current one.
    pub fn token_kind_ahead(&self, n: u32) -> Option<TokenKind> {
        self.token_at(self.token_index + n).map(|token| token.kind)
    }

    pub fn is_on(&self, kind: TokenKind) -> bool {
        self.current_token_kind() == Some(kind)
    }

    pub fn is_eof(&self) -> bool {
        self.current_token().is_none()
    }

    /// Consume the current token if it has the expected kind.
    pub fn read_token_kind(&mut self, expected: TokenKind) -> Result<&'s Token, ParseError> {
        match self.current_token() {
            Some(token) if token.kind == expected => {
                self.token_index += 1;
                Ok(token)
            }
            found => Err(ParseError::ExpectedTokenKind {
                expected,
                found: found.map(FoundToken::of),
            }),
        }
    }

    /// Where the current token starts, or where the stream ended.
    pub fn current_position(&self) -> TokenPosition {
        match self.current_token() {
            Some(token) => token.position_start,
            None => self.previous_end_position(),
        }
    }

    /// The end of the most recently consumed token.
    pub fn previous_end_position(&self) -> TokenPosition {
        if self.token_index == 0 {
            return zero_position();
        }
        match self.token_at(self.token_index - 1) {
            Some(token) => token.position_end,
            None => zero_position(),
        }
    }

    // ── Speculation ────────────────────────────────────────────────────

    /// Clone the mutable state for a speculative attempt.
    pub fn deep_copy(&self) -> ParseState<'s> {
        self.clone()
    }

    /// Commit a speculative branch back over this state.
    pub fn apply_state(&mut self, other: ParseState<'s>) {
        *self = other;
    }

    // ── Context tree ───────────────────────────────────────────────────

    /// Open a context for a production and make it current.
    pub fn start_context(&mut self, kind: NodeKind) -> NodeId {
        let id = self.context.start_context(
            kind,
            self.token_index,
            self.current_token().cloned(),
            self.current_context_id,
        );
        self.current_context_id = Some(id);
        id
    }

    /// Close the current context as an AST node covering every token read
    /// since it was opened. The parent becomes current again.
    pub fn end_context(&mut self, is_leaf: bool, contents: NodeContents) -> NodeId {
        let id = self
            .current_context_id
            .expect("a context must be open to close one");
        let token_range = self.range_of_current_context(id);
        self.current_context_id = self.context.end_context(id, token_range, is_leaf, contents);
        id
    }

    /// Drop the current context. If it wrapped exactly one child, that
    /// child is promoted into its slot and returned.
    pub fn delete_context(&mut self) -> Option<NodeId> {
        let id = self
            .current_context_id
            .expect("a context must be open to delete one");
        let outcome = self.context.delete_context(id);
        self.current_context_id = outcome.parent_id;
        outcome.promoted_child_id
    }

    fn range_of_current_context(&self, id: NodeId) -> TokenRange {
        let context = self
            .context
            .node_id_map
            .context_node_by_id
            .get(&id)
            .expect("current context must be open");

        let position_start = match &context.token_start {
            Some(token) => token.position_start,
            None => self.previous_end_position(),
        };
        let position_end = if self.token_index > context.token_index_start {
            self.previous_end_position()
        } else {
            position_start
        };
        TokenRange {
            token_index_start: context.token_index_start,
            token_index_end: self.token_index,
            position_start,
            position_end,
        }
    }
}

fn zero_position() -> TokenPosition {
    TokenPosition {
        line_number: 0,
        line_code_unit: 0,
        code_unit: 0,
    }
}
