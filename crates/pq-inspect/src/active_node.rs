//! Finding the deepest node under the cursor and its path to the root.

use std::cmp::Ordering;

use pq_common::position::Position;
use pq_parser::{NodeIdMapCollection, NodeId, NodeKind};

/// The node path a cursor position anchors to: `ancestry[0]` is the deepest
/// enclosing node, the last element is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNode {
    pub position: Position,
    pub ancestry: Vec<NodeId>,
}

/// Resolve the cursor to an anchor node and walk its ancestry.
///
/// The anchor is, in order of preference: the leaf whose token range
/// contains the cursor (a cursor sitting exactly at the end of an
/// identifier counts, so a half-typed name stays anchored to itself); the
/// deepest open context that started at or before the cursor; the
/// rightmost leaf that ends at or before it. An empty document anchors
/// nothing.
pub fn maybe_active_node(
    map: &NodeIdMapCollection,
    position: Position,
) -> Option<ActiveNode> {
    if map.leaf_node_ids.is_empty() {
        return None;
    }

    let start = leaf_on_position(map, position)
        .or_else(|| context_or_leaf_before(map, position))?;

    let mut ancestry = vec![start];
    let mut current = start;
    while let Some(parent) = map.parent_id(current) {
        ancestry.push(parent);
        current = parent;
    }
    Some(ActiveNode { position, ancestry })
}

fn leaf_on_position(map: &NodeIdMapCollection, position: Position) -> Option<NodeId> {
    let mut contained = None;
    for id in &map.leaf_node_ids {
        let node = map.ast_node(*id)?;
        if position.is_at_range_end(&node.token_range)
            && matches!(
                node.kind,
                NodeKind::Identifier | NodeKind::GeneralizedIdentifier
            )
        {
            // Typing continues the identifier; prefer it over whatever
            // starts at the same offset.
            return Some(*id);
        }
        if position.is_in_range(&node.token_range) {
            contained = Some(*id);
        }
    }
    contained
}

fn context_or_leaf_before(map: &NodeIdMapCollection, position: Position) -> Option<NodeId> {
    let leaf_before = map
        .leaf_node_ids
        .iter()
        .rev()
        .find(|id| {
            map.ast_node(**id)
                .is_some_and(|node| position.is_after_range(&node.token_range))
        })
        .copied();

    // The deepest open context whose first token sits at or before the
    // cursor. A context opened past the last token (token_start None) was
    // opened at the cursor's frontier and always qualifies.
    let context = map
        .context_node_by_id
        .values()
        .filter(|context| match &context.token_start {
            Some(token) => position.cmp_token(&token.position_start) != Ordering::Less,
            None => true,
        })
        .max_by_key(|context| (context.token_index_start, context.id))
        .map(|context| context.id);

    match (context, leaf_before) {
        (Some(context_id), Some(leaf_id)) => {
            let context_start = map
                .context_node_by_id
                .get(&context_id)
                .map(|node| node.token_index_start)
                .unwrap_or(0);
            let leaf_end = map
                .ast_node(leaf_id)
                .map(|node| node.token_range.token_index_end)
                .unwrap_or(0);
            if context_start >= leaf_end {
                Some(context_id)
            } else {
                Some(leaf_id)
            }
        }
        (Some(context_id), None) => Some(context_id),
        (None, leaf) => leaf,
    }
}
