//! The context tree: grammar nodes that are still being parsed.
//!
//! Every production begins by allocating a context node linked under the
//! current one. Finishing the production promotes the context into an AST
//! node; failing leaves it open, so the overall tree is always a
//! well-defined mix of the two. A context transitions open → closed exactly
//! once, and closing removes it from the context map entirely.

use serde::Serialize;

use pq_common::position::TokenRange;
use pq_common::token::Token;

use crate::ast::{AstNode, NodeContents, NodeId, NodeKind};
use crate::node_id_map::NodeIdMapCollection;

/// A grammar node still awaiting children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Index of the first token this node will cover.
    pub token_index_start: u32,
    /// The token under the cursor when the node was opened, if any.
    pub token_start: Option<Token>,
    /// How many child slots have been handed out so far.
    pub attribute_counter: u32,
    /// This node's slot under its parent. `None` for the root.
    pub attribute_index: Option<u32>,
    pub parent_id: Option<NodeId>,
}

/// Owns the hybrid tree and the id allocator.
#[derive(Debug, Clone, Default)]
pub struct ContextState {
    pub node_id_map: NodeIdMapCollection,
    pub root_id: Option<NodeId>,
    id_counter: u32,
}

/// What [`ContextState::delete_context`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// The deleted node's parent, which becomes current again.
    pub parent_id: Option<NodeId>,
    /// The single child that was promoted into the deleted node's slot,
    /// when the node had one.
    pub promoted_child_id: Option<NodeId>,
}

impl ContextState {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> NodeId {
        self.id_counter += 1;
        NodeId(self.id_counter)
    }

    /// Allocate a context node and link it under `parent_id` at the next
    /// attribute slot.
    pub fn start_context(
        &mut self,
        kind: NodeKind,
        token_index_start: u32,
        token_start: Option<Token>,
        parent_id: Option<NodeId>,
    ) -> NodeId {
        let id = self.next_id();

        let attribute_index = parent_id.map(|parent| {
            let parent_node = self
                .node_id_map
                .context_node_by_id
                .get_mut(&parent)
                .expect("parent context must be open");
            let index = parent_node.attribute_counter;
            parent_node.attribute_counter += 1;

            self.node_id_map.parent_id_by_id.insert(id, parent);
            self.node_id_map
                .child_ids_by_id
                .entry(parent)
                .or_default()
                .push(id);
            index
        });

        if parent_id.is_none() && self.root_id.is_none() {
            self.root_id = Some(id);
        }

        self.node_id_map.context_node_by_id.insert(
            id,
            ContextNode {
                id,
                kind,
                token_index_start,
                token_start,
                attribute_counter: 0,
                attribute_index,
                parent_id,
            },
        );
        id
    }

    /// Close a context: its id moves from the context map to the AST map.
    /// Returns the parent id, which becomes the current context.
    pub fn end_context(
        &mut self,
        id: NodeId,
        token_range: TokenRange,
        is_leaf: bool,
        contents: NodeContents,
    ) -> Option<NodeId> {
        let context = self
            .node_id_map
            .context_node_by_id
            .remove(&id)
            .expect("only an open context can be closed");

        let node = AstNode {
            id,
            kind: context.kind,
            token_range,
            is_leaf,
            attribute_index: context.attribute_index,
            contents,
        };

        if is_leaf {
            self.node_id_map.leaf_node_ids.push(id);
            let is_right_most = match self.node_id_map.right_most_leaf {
                Some(current) => {
                    let current_start = self
                        .node_id_map
                        .ast_node_by_id
                        .get(&current)
                        .expect("right-most leaf must be an AST node")
                        .token_range
                        .token_index_start;
                    token_range.token_index_start >= current_start
                }
                None => true,
            };
            if is_right_most {
                self.node_id_map.right_most_leaf = Some(id);
            }
        }

        self.node_id_map.ast_node_by_id.insert(id, node);
        context.parent_id
    }

    /// Remove an open context from the tree.
    ///
    /// A childless context simply unlinks from its parent and hands its
    /// attribute slot back. A context with exactly one child is replaced by
    /// that child: the child takes over the deleted node's slot and parent.
    /// Anything else is a caller bug.
    pub fn delete_context(&mut self, id: NodeId) -> DeleteOutcome {
        let context = self
            .node_id_map
            .context_node_by_id
            .remove(&id)
            .expect("only an open context can be deleted");
        self.node_id_map.parent_id_by_id.remove(&id);

        let children = self.node_id_map.child_ids_by_id.remove(&id);
        let promoted_child_id = match children.as_deref() {
            None | Some([]) => {
                // Childless: give the attribute slot back to the parent.
                if let Some(parent) = context.parent_id {
                    let siblings = self
                        .node_id_map
                        .child_ids_by_id
                        .get_mut(&parent)
                        .expect("linked child must appear in its parent's child list");
                    siblings.retain(|child| *child != id);
                    if let Some(parent_node) =
                        self.node_id_map.context_node_by_id.get_mut(&parent)
                    {
                        parent_node.attribute_counter -= 1;
                    }
                }
                None
            }
            Some([child]) => {
                let child = *child;
                match context.parent_id {
                    Some(parent) => {
                        self.node_id_map.parent_id_by_id.insert(child, parent);
                        let siblings = self
                            .node_id_map
                            .child_ids_by_id
                            .get_mut(&parent)
                            .expect("linked child must appear in its parent's child list");
                        let slot = siblings
                            .iter()
                            .position(|sibling| *sibling == id)
                            .expect("linked child must appear in its parent's child list");
                        siblings[slot] = child;
                    }
                    None => {
                        self.node_id_map.parent_id_by_id.remove(&child);
                        if self.root_id == Some(id) {
                            self.root_id = Some(child);
                        }
                    }
                }
                self.set_attribute_index(child, context.attribute_index);
                Some(child)
            }
            Some(_) => panic!("a deleted context may have at most one child"),
        };

        DeleteOutcome {
            parent_id: context.parent_id,
            promoted_child_id,
        }
    }

    fn set_attribute_index(&mut self, id: NodeId, attribute_index: Option<u32>) {
        if let Some(node) = self.node_id_map.ast_node_by_id.get_mut(&id) {
            node.attribute_index = attribute_index;
        } else if let Some(node) = self.node_id_map.context_node_by_id.get_mut(&id) {
            node.attribute_index = attribute_index;
        } else {
            panic!("promoted child must exist in one of the maps");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pq_common::position::TokenPosition;

    fn range() -> TokenRange {
        let zero = TokenPosition {
            line_number: 0,
            line_code_unit: 0,
            code_unit: 0,
        };
        TokenRange {
            token_index_start: 0,
            token_index_end: 1,
            position_start: zero,
            position_end: zero,
        }
    }

    #[test]
    fn close_moves_id_between_maps() {
        let mut state = ContextState::new();
        let root = state.start_context(NodeKind::IfExpression, 0, None, None);
        let child = state.start_context(NodeKind::Constant, 0, None, Some(root));

        assert!(state.node_id_map.context_node_by_id.contains_key(&child));
        let parent = state.end_context(
            child,
            range(),
            true,
            NodeContents::Constant { literal: "if".into() },
        );
        assert_eq!(parent, Some(root));
        assert!(!state.node_id_map.context_node_by_id.contains_key(&child));
        assert!(state.node_id_map.ast_node_by_id.contains_key(&child));
        assert_eq!(state.node_id_map.leaf_node_ids, vec![child]);
        assert_eq!(state.node_id_map.right_most_leaf, Some(child));
    }

    #[test]
    fn attribute_indices_count_up_per_parent() {
        let mut state = ContextState::new();
        let root = state.start_context(NodeKind::IfExpression, 0, None, None);
        let first = state.start_context(NodeKind::Constant, 0, None, Some(root));
        state.end_context(first, range(), true, NodeContents::None);
        let second = state.start_context(NodeKind::LiteralExpression, 1, None, Some(root));

        assert_eq!(
            state.node_id_map.ast_node_by_id[&first].attribute_index,
            Some(0)
        );
        assert_eq!(
            state.node_id_map.context_node_by_id[&second].attribute_index,
            Some(1)
        );
    }

    #[test]
    fn deleting_a_childless_context_returns_its_slot() {
        let mut state = ContextState::new();
        let root = state.start_context(NodeKind::ListExpression, 0, None, None);
        let child = state.start_context(NodeKind::Csv, 0, None, Some(root));

        let outcome = state.delete_context(child);
        assert_eq!(outcome.parent_id, Some(root));
        assert_eq!(outcome.promoted_child_id, None);
        assert!(state.node_id_map.child_ids_by_id.get(&root).map_or(true, Vec::is_empty));

        // The next child claims the freed slot 0.
        let next = state.start_context(NodeKind::Csv, 0, None, Some(root));
        assert_eq!(
            state.node_id_map.context_node_by_id[&next].attribute_index,
            Some(0)
        );
    }

    #[test]
    fn deleting_promotes_a_single_child() {
        let mut state = ContextState::new();
        let root = state.start_context(NodeKind::LetExpression, 0, None, None);
        let wrapper =
            state.start_context(NodeKind::ArithmeticExpression, 0, None, Some(root));
        let operand = state.start_context(NodeKind::LiteralExpression, 0, None, Some(wrapper));
        state.end_context(
            operand,
            range(),
            true,
            NodeContents::Literal {
                literal: "1".into(),
                literal_kind: crate::ast::LiteralKind::Numeric,
            },
        );

        let outcome = state.delete_context(wrapper);
        assert_eq!(outcome.parent_id, Some(root));
        assert_eq!(outcome.promoted_child_id, Some(operand));
        // The child inherited the wrapper's slot and parent.
        assert_eq!(state.node_id_map.parent_id_by_id[&operand], root);
        assert_eq!(state.node_id_map.child_ids_by_id[&root], vec![operand]);
        assert_eq!(
            state.node_id_map.ast_node_by_id[&operand].attribute_index,
            Some(0)
        );
    }

    #[test]
    fn deleting_the_root_wrapper_promotes_the_child_to_root() {
        let mut state = ContextState::new();
        let wrapper = state.start_context(NodeKind::LogicalExpression, 0, None, None);
        let operand = state.start_context(NodeKind::LiteralExpression, 0, None, Some(wrapper));
        state.end_context(operand, range(), true, NodeContents::None);

        let outcome = state.delete_context(wrapper);
        assert_eq!(outcome.parent_id, None);
        assert_eq!(state.root_id, Some(operand));
        assert_eq!(
            state.node_id_map.ast_node_by_id[&operand].attribute_index,
            None
        );
    }
}
