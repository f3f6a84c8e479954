//! Error-tolerant recursive-descent parser for the Power Query / M
//! language.
//!
//! Parsing builds a hybrid tree: completed productions become AST nodes,
//! productions still in flight (or abandoned by an error) stay behind as
//! open context nodes, and both live in one id space with parent/child
//! side tables ([`NodeIdMapCollection`]). A failed parse returns that
//! partial tree alongside the error, so editor queries keep working on
//! broken documents.

pub mod ast;
pub mod context;
mod disambiguation;
pub mod error;
mod grammar;
pub mod node_id_map;
pub mod state;

use pq_common::settings::{LexSettings, ParseSettings};
use pq_lexer::{LexError, LexerSnapshot};

pub use ast::{AstNode, LiteralKind, NodeContents, NodeId, NodeKind, PrimitiveTypeKind};
pub use context::{ContextNode, ContextState};
pub use error::{CsvContinuationKind, FoundToken, ParseError};
pub use node_id_map::{NodeIdMapCollection, XorNode};
pub use state::ParseState;

/// A parser strategy. The recursive-descent implementation below is the
/// default; hosts may plug in their own as long as it honors the same
/// context-tree contract.
pub trait DocumentParser {
    fn read_document<'s>(&self, state: &mut ParseState<'s>) -> Result<NodeId, ParseError>;
}

/// The built-in recursive-descent strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveDescentParser;

impl DocumentParser for RecursiveDescentParser {
    fn read_document<'s>(&self, state: &mut ParseState<'s>) -> Result<NodeId, ParseError> {
        grammar::read_document(state)
    }
}

/// A completed parse: the root node plus the fully-closed tree.
#[derive(Debug, Clone)]
pub struct ParseOk {
    pub root: NodeId,
    pub node_id_map: NodeIdMapCollection,
}

impl ParseOk {
    /// Leaf AST nodes in token order.
    pub fn leaf_node_ids(&self) -> &[NodeId] {
        &self.node_id_map.leaf_node_ids
    }
}

/// A failed parse: the error plus everything built before it, with the
/// failing productions still open as context nodes.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub error: ParseError,
    pub context_state: ContextState,
    /// Index of the first token the parser could not consume.
    pub token_index: u32,
}

impl ParseFailure {
    pub fn node_id_map(&self) -> &NodeIdMapCollection {
        &self.context_state.node_id_map
    }

    /// The outermost open context, i.e. the root of the partial tree.
    pub fn root_id(&self) -> Option<NodeId> {
        self.context_state.root_id
    }
}

/// The outcome of a parse, either way carrying an inspectable tree.
pub type TriedParse = Result<ParseOk, Box<ParseFailure>>;

/// Parse a snapshot with the default recursive-descent strategy.
pub fn parse(settings: &ParseSettings, snapshot: &LexerSnapshot) -> TriedParse {
    parse_with(&RecursiveDescentParser, settings, snapshot)
}

/// Parse a snapshot with a caller-supplied strategy.
pub fn parse_with(
    parser: &dyn DocumentParser,
    settings: &ParseSettings,
    snapshot: &LexerSnapshot,
) -> TriedParse {
    let mut state = ParseState::new(settings, snapshot);
    match parser.read_document(&mut state) {
        Ok(root) => Ok(ParseOk {
            root,
            node_id_map: state.context.node_id_map,
        }),
        Err(error) => Err(Box::new(ParseFailure {
            error,
            context_state: state.context,
            token_index: state.token_index,
        })),
    }
}

/// Lex, snapshot, and parse in one call.
#[derive(Debug, Clone)]
pub struct LexParse {
    pub snapshot: LexerSnapshot,
    pub tried: TriedParse,
}

pub fn try_lex_parse(
    lex_settings: &LexSettings,
    parse_settings: &ParseSettings,
    text: &str,
) -> Result<LexParse, LexError> {
    let state = pq_lexer::lex(lex_settings, text);
    let snapshot = LexerSnapshot::try_from_state(&state)?;
    let tried = parse(parse_settings, &snapshot);
    Ok(LexParse { snapshot, tried })
}
