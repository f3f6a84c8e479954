//! Side tables over the hybrid tree, plus the iterators every inspection
//! is built from.
//!
//! A [`NodeId`] lives in exactly one of `ast_node_by_id` and
//! `context_node_by_id`. [`XorNode`] is the uniform handle over the two,
//! which lets position-driven queries walk a tree that is part parsed and
//! part in progress without caring which side any node is on.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::ast::{AstNode, NodeContents, NodeId, NodeKind};
use crate::context::ContextNode;

/// Either a completed AST node or a still-open context node.
#[derive(Debug, Clone, Copy)]
pub enum XorNode<'a> {
    Ast(&'a AstNode),
    Context(&'a ContextNode),
}

impl<'a> XorNode<'a> {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Ast(node) => node.id,
            Self::Context(node) => node.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Ast(node) => node.kind,
            Self::Context(node) => node.kind,
        }
    }

    pub fn attribute_index(&self) -> Option<u32> {
        match self {
            Self::Ast(node) => node.attribute_index,
            Self::Context(node) => node.attribute_index,
        }
    }

    pub fn as_ast(&self) -> Option<&'a AstNode> {
        match self {
            Self::Ast(node) => Some(node),
            Self::Context(_) => None,
        }
    }

    pub fn as_context(&self) -> Option<&'a ContextNode> {
        match self {
            Self::Context(node) => Some(node),
            Self::Ast(_) => None,
        }
    }

    pub fn is_ast(&self) -> bool {
        matches!(self, Self::Ast(_))
    }
}

/// The single id space for the whole hybrid tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeIdMapCollection {
    pub ast_node_by_id: FxHashMap<NodeId, AstNode>,
    pub context_node_by_id: FxHashMap<NodeId, ContextNode>,
    pub parent_id_by_id: FxHashMap<NodeId, NodeId>,
    /// Children in insertion order, which is attribute-index order.
    pub child_ids_by_id: FxHashMap<NodeId, Vec<NodeId>>,
    /// Leaf AST nodes in token order.
    pub leaf_node_ids: Vec<NodeId>,
    /// The leaf with the greatest starting token index.
    pub right_most_leaf: Option<NodeId>,
}

impl NodeIdMapCollection {
    pub fn xor_node(&self, id: NodeId) -> Option<XorNode<'_>> {
        if let Some(node) = self.ast_node_by_id.get(&id) {
            return Some(XorNode::Ast(node));
        }
        self.context_node_by_id.get(&id).map(XorNode::Context)
    }

    pub fn ast_node(&self, id: NodeId) -> Option<&AstNode> {
        self.ast_node_by_id.get(&id)
    }

    pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.parent_id_by_id.get(&id).copied()
    }

    pub fn maybe_parent(&self, id: NodeId) -> Option<XorNode<'_>> {
        self.xor_node(self.parent_id(id)?)
    }

    pub fn child_ids(&self, id: NodeId) -> &[NodeId] {
        self.child_ids_by_id
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All children of a node, in attribute order.
    pub fn iter_children(&self, id: NodeId) -> impl Iterator<Item = XorNode<'_>> {
        self.child_ids(id)
            .iter()
            .filter_map(move |child| self.xor_node(*child))
    }

    /// The child sitting at `attribute_index`, optionally restricted to a
    /// set of kinds.
    pub fn child_by_attribute_index(
        &self,
        parent: NodeId,
        attribute_index: u32,
        allowed_kinds: Option<&[NodeKind]>,
    ) -> Option<XorNode<'_>> {
        let child = self
            .iter_children(parent)
            .find(|child| child.attribute_index() == Some(attribute_index))?;
        match allowed_kinds {
            Some(kinds) if !kinds.contains(&child.kind()) => None,
            _ => Some(child),
        }
    }

    /// Chained [`Self::child_by_attribute_index`] lookups. Each step is an
    /// attribute index plus the kinds allowed at that slot (empty = any).
    pub fn drilldown(
        &self,
        root: NodeId,
        steps: &[(u32, &[NodeKind])],
    ) -> Option<XorNode<'_>> {
        let mut current = self.xor_node(root)?;
        for (attribute_index, allowed_kinds) in steps {
            let allowed = if allowed_kinds.is_empty() {
                None
            } else {
                Some(*allowed_kinds)
            };
            current = self.child_by_attribute_index(current.id(), *attribute_index, allowed)?;
        }
        Some(current)
    }

    /// Assemble the literal of an `IdentifierExpression`, including the `@`
    /// prefix when present. Works on both closed and still-open nodes;
    /// returns `None` when nothing has been read yet.
    pub fn identifier_expression_literal(&self, id: NodeId) -> Option<String> {
        let node = self.xor_node(id)?;
        if node.kind() != NodeKind::IdentifierExpression {
            return None;
        }

        let mut literal = String::new();
        for child in self.iter_children(id) {
            let Some(ast) = child.as_ast() else { continue };
            match &ast.contents {
                NodeContents::Constant { literal: text }
                | NodeContents::Identifier { literal: text } => literal.push_str(text),
                _ => {}
            }
        }
        if literal.is_empty() {
            None
        } else {
            Some(literal)
        }
    }

    /// The name an `InvokeExpression` is called under: the literal of the
    /// head identifier of its recursive-primary chain, for the first
    /// invocation in the chain only.
    pub fn invoke_expression_name(&self, invoke: NodeId) -> Option<String> {
        let node = self.xor_node(invoke)?;
        if node.kind() != NodeKind::InvokeExpression || node.attribute_index() != Some(0) {
            return None;
        }
        let wrapper = self.maybe_parent(invoke)?;
        if wrapper.kind() != NodeKind::ArrayWrapper {
            return None;
        }
        let recursive = self.maybe_parent(wrapper.id())?;
        if recursive.kind() != NodeKind::RecursivePrimaryExpression {
            return None;
        }
        let head = self.child_by_attribute_index(
            recursive.id(),
            0,
            Some(&[NodeKind::IdentifierExpression]),
        )?;
        self.identifier_expression_literal(head.id())
    }

    /// Check the structural invariants of the hybrid tree. Intended for
    /// tests and debugging aids, not hot paths.
    pub fn validate(&self) -> Result<(), String> {
        for id in self.ast_node_by_id.keys() {
            if self.context_node_by_id.contains_key(id) {
                return Err(format!("{id:?} is in both maps"));
            }
        }
        for (parent, children) in &self.child_ids_by_id {
            let mut previous: Option<u32> = None;
            for child in children {
                if self.parent_id_by_id.get(child) != Some(parent) {
                    return Err(format!("{child:?} does not point back at {parent:?}"));
                }
                let index = self
                    .xor_node(*child)
                    .ok_or_else(|| format!("{child:?} is in neither map"))?
                    .attribute_index()
                    .ok_or_else(|| format!("{child:?} has a parent but no slot"))?;
                if let Some(previous) = previous {
                    if index <= previous {
                        return Err(format!(
                            "children of {parent:?} are not in increasing slot order"
                        ));
                    }
                }
                previous = Some(index);
            }
        }
        for (child, parent) in &self.parent_id_by_id {
            if !self.child_ids(*parent).contains(child) {
                return Err(format!("{parent:?} does not list {child:?} as a child"));
            }
        }
        Ok(())
    }
}
