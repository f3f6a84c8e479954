//! Keyword autocomplete at the cursor.
//!
//! Each (child, parent) pair of the ancestry is a potential decision
//! point: a static map keyed by the parent's kind and the child's
//! attribute slot says whether that slot demands a specific keyword
//! (`then`, `else`, `in`) or admits any expression keyword. The first
//! decisive pair wins; error-handling expressions get their own rule.

use std::cmp::Ordering;

use pq_common::keyword::{KeywordKind, EXPRESSION_KEYWORDS};
use pq_common::position::Position;
use pq_parser::{ContextNode, NodeIdMapCollection, NodeKind, XorNode};

use crate::active_node::ActiveNode;

/// What the editor may offer at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autocomplete {
    /// A keyword the grammar requires right here, e.g. `then` after an
    /// `if` condition.
    pub maybe_required_autocomplete: Option<String>,
    /// Keywords admissible at the cursor.
    pub allowed_autocomplete_keywords: Vec<KeywordKind>,
}

impl Autocomplete {
    fn required(keyword: KeywordKind) -> Self {
        Self {
            maybe_required_autocomplete: Some(keyword.literal().to_string()),
            allowed_autocomplete_keywords: vec![keyword],
        }
    }

    fn expression_keywords() -> Self {
        Self {
            maybe_required_autocomplete: None,
            allowed_autocomplete_keywords: EXPRESSION_KEYWORDS.to_vec(),
        }
    }

    fn none() -> Self {
        Self {
            maybe_required_autocomplete: None,
            allowed_autocomplete_keywords: Vec::new(),
        }
    }
}

/// Compute autocomplete for the cursor. With nothing to anchor to, any
/// expression keyword may start the document.
pub fn autocomplete(
    map: &NodeIdMapCollection,
    maybe_active: Option<&ActiveNode>,
    position: Position,
) -> Autocomplete {
    let Some(active) = maybe_active else {
        return Autocomplete::expression_keywords();
    };

    for pair in active.ancestry.windows(2) {
        let (Some(child), Some(parent)) = (map.xor_node(pair[0]), map.xor_node(pair[1]))
        else {
            continue;
        };

        // A context that begins exactly at the cursor has not read
        // anything yet; the decision belongs further up.
        if let XorNode::Context(context) = parent {
            if context_starts_at(context, position) {
                continue;
            }
        }

        let decision = if parent.kind() == NodeKind::ErrorHandlingExpression {
            error_handling_decision(&child, position)
        } else {
            child
                .attribute_index()
                .and_then(|index| decision_for(parent.kind(), index))
        };
        if let Some(decision) = decision {
            return decision;
        }
    }

    Autocomplete::none()
}

fn context_starts_at(context: &ContextNode, position: Position) -> bool {
    match &context.token_start {
        Some(token) => position.cmp_token(&token.position_start) == Ordering::Equal,
        // Opened past the last token, i.e. at the cursor's frontier.
        None => true,
    }
}

/// The decision rule for `try … otherwise …`: past a complete protected
/// expression only `otherwise` fits; inside an incomplete one, any
/// expression keyword does.
fn error_handling_decision(child: &XorNode, position: Position) -> Option<Autocomplete> {
    match child.attribute_index() {
        Some(0) => Some(Autocomplete::required(KeywordKind::Try)),
        Some(1) => match child.as_ast() {
            Some(ast) if position.cmp_token(&ast.token_range.position_end) != Ordering::Less => {
                Some(Autocomplete::required(KeywordKind::Otherwise))
            }
            Some(_) => None,
            None => Some(Autocomplete::expression_keywords()),
        },
        _ => None,
    }
}

/// The static decision map keyed by (parent kind, child attribute slot).
fn decision_for(parent: NodeKind, attribute_index: u32) -> Option<Autocomplete> {
    use NodeKind as N;
    let decision = match (parent, attribute_index) {
        (N::IfExpression, 2) => Autocomplete::required(KeywordKind::Then),
        (N::IfExpression, 4) => Autocomplete::required(KeywordKind::Else),
        (N::IfExpression, 1 | 3 | 5) => Autocomplete::expression_keywords(),
        (N::LetExpression, 2) => Autocomplete::required(KeywordKind::In),
        (N::LetExpression, 3) => Autocomplete::expression_keywords(),
        (N::EachExpression, 1)
        | (N::ErrorRaisingExpression, 1)
        | (N::OtherwiseExpression, 1)
        | (N::ParenthesizedExpression, 1)
        | (N::InvokeExpression, 1)
        | (N::ListExpression, 1)
        | (N::ItemAccessExpression, 1)
        | (N::MetadataExpression, 2)
        | (N::RangeExpression, 2)
        | (N::IdentifierPairedExpression, 2)
        | (N::GeneralizedIdentifierPairedExpression, 2)
        | (N::FunctionExpression, 2 | 3) => Autocomplete::expression_keywords(),
        _ => return None,
    };
    Some(decision)
}
