//! Lexical scope visible at the cursor.
//!
//! The ancestry is walked leaf-first; the first binding for a name wins, so
//! inner scopes shadow outer ones. Names only enter scope once their
//! defining token ends at or before the cursor, which keeps forward
//! references out of completion.

use indexmap::IndexMap;

use pq_common::position::Position;
use pq_parser::ast::PrimitiveTypeKind;
use pq_parser::{NodeContents, NodeId, NodeIdMapCollection, NodeKind, XorNode};

use crate::active_node::ActiveNode;

/// One name visible at the cursor and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeItem {
    /// The implicit `_` of an `each` expression.
    Each { each_id: NodeId },
    /// A function parameter.
    Parameter {
        parameter_id: NodeId,
        is_optional: bool,
        is_nullable: bool,
        maybe_type: Option<PrimitiveTypeKind>,
    },
    /// An identifier expression read before the cursor.
    Identifier { id: NodeId },
    /// A record key read before the cursor.
    RecordKey { key_id: NodeId },
    /// A section member's name.
    SectionMember { member_id: NodeId },
}

pub type ScopeMap = IndexMap<String, ScopeItem>;

/// Accumulate scope over an ancestry. Also collects the list/record nodes
/// the cursor is inside of (the `scope_nodes` of the inspection result).
pub fn scope_of(
    map: &NodeIdMapCollection,
    active: &ActiveNode,
    position: Position,
) -> (ScopeMap, Vec<NodeId>) {
    let mut scope = ScopeMap::new();
    let mut nodes = Vec::new();

    for id in &active.ancestry {
        let Some(node) = map.xor_node(*id) else { continue };
        match node.kind() {
            NodeKind::EachExpression => {
                bind(&mut scope, "_", ScopeItem::Each { each_id: *id });
            }
            NodeKind::FunctionExpression => bind_parameters(map, *id, &mut scope),
            NodeKind::IdentifierExpression => {
                bind_identifier_expression(map, &node, position, &mut scope);
            }
            NodeKind::InvokeExpression => {
                bind_invoke_arguments(map, *id, position, &mut scope);
            }
            NodeKind::ListExpression | NodeKind::ListType => {
                if position_is_inside_wrapped(map, &node, position) {
                    nodes.push(*id);
                }
            }
            NodeKind::RecordExpression | NodeKind::RecordLiteral => {
                if position_is_inside_wrapped(map, &node, position) {
                    nodes.push(*id);
                }
                bind_record_keys(map, *id, position, &mut scope, &active.ancestry);
            }
            NodeKind::RecursivePrimaryExpression => {
                if let Some(head) = map.child_by_attribute_index(
                    *id,
                    0,
                    Some(&[NodeKind::IdentifierExpression]),
                ) {
                    bind_identifier_expression(map, &head, position, &mut scope);
                }
            }
            NodeKind::Section => bind_section_members(map, *id, &mut scope),
            _ => {}
        }
    }

    (scope, nodes)
}

fn bind(scope: &mut ScopeMap, name: impl Into<String>, item: ScopeItem) {
    let name = name.into();
    if !scope.contains_key(&name) {
        scope.insert(name, item);
    }
}

/// Bind every parameter of a function expression, with its optionality,
/// nullability, and declared type pulled out of the parameter list.
fn bind_parameters(map: &NodeIdMapCollection, function_id: NodeId, scope: &mut ScopeMap) {
    let Some(parameter_list) = map.child_by_attribute_index(
        function_id,
        0,
        Some(&[NodeKind::ParameterList]),
    ) else {
        return;
    };
    let Some(wrapper) = find_child_of_kind(map, parameter_list.id(), NodeKind::ArrayWrapper)
    else {
        return;
    };

    for csv in map.iter_children(wrapper.id()) {
        let Some(parameter) = map.child_by_attribute_index(csv.id(), 0, Some(&[NodeKind::Parameter]))
        else {
            continue;
        };
        let parameter_id = parameter.id();

        let mut name = None;
        let mut is_optional = false;
        let mut is_nullable = true;
        let mut maybe_type = None;
        for child in map.iter_children(parameter_id) {
            let Some(ast) = child.as_ast() else { continue };
            match (&ast.kind, &ast.contents) {
                (NodeKind::Constant, NodeContents::Constant { literal }) => {
                    if literal == "optional" {
                        is_optional = true;
                    }
                }
                (NodeKind::Identifier, NodeContents::Identifier { literal }) => {
                    name = Some(literal.clone());
                }
                (NodeKind::AsNullablePrimitiveType, _) => {
                    let (nullable, kind) = declared_type(map, ast.id);
                    is_nullable = nullable;
                    maybe_type = kind;
                }
                _ => {}
            }
        }

        if let Some(name) = name {
            bind(
                scope,
                name,
                ScopeItem::Parameter {
                    parameter_id,
                    is_optional,
                    is_nullable,
                    maybe_type,
                },
            );
        }
    }
}

/// The `(is_nullable, primitive type)` declared by an
/// `AsNullablePrimitiveType` clause.
fn declared_type(
    map: &NodeIdMapCollection,
    as_clause_id: NodeId,
) -> (bool, Option<PrimitiveTypeKind>) {
    let Some(declared) = map.child_by_attribute_index(as_clause_id, 1, None) else {
        return (true, None);
    };
    match declared.kind() {
        NodeKind::PrimitiveType => (false, primitive_kind(&declared)),
        NodeKind::NullablePrimitiveType => {
            let inner = find_child_of_kind(map, declared.id(), NodeKind::PrimitiveType);
            (true, inner.as_ref().and_then(primitive_kind))
        }
        _ => (true, None),
    }
}

fn primitive_kind(node: &XorNode) -> Option<PrimitiveTypeKind> {
    match node.as_ast().map(|ast| &ast.contents) {
        Some(NodeContents::PrimitiveType { kind }) => Some(*kind),
        _ => None,
    }
}

/// Bind the literal of an identifier expression once the cursor has moved
/// past it. Open contexts bind whatever partial literal exists.
fn bind_identifier_expression(
    map: &NodeIdMapCollection,
    node: &XorNode,
    position: Position,
    scope: &mut ScopeMap,
) {
    if let Some(ast) = node.as_ast() {
        if !position.is_after_range(&ast.token_range) {
            return;
        }
    }
    if let Some(literal) = map.identifier_expression_literal(node.id()) {
        bind(scope, literal, ScopeItem::Identifier { id: node.id() });
    }
}

/// Bind invoke arguments that are plain identifier expressions.
fn bind_invoke_arguments(
    map: &NodeIdMapCollection,
    invoke_id: NodeId,
    position: Position,
    scope: &mut ScopeMap,
) {
    let Some(wrapper) = find_child_of_kind(map, invoke_id, NodeKind::ArrayWrapper) else {
        return;
    };
    for csv in map.iter_children(wrapper.id()) {
        let Some(argument) = map.child_by_attribute_index(csv.id(), 0, None) else {
            continue;
        };
        if argument.kind() != NodeKind::IdentifierExpression {
            continue;
        }
        if let Some(ast) = argument.as_ast() {
            if position.is_after_range(&ast.token_range) {
                if let Some(literal) = map.identifier_expression_literal(ast.id) {
                    bind(scope, literal, ScopeItem::Identifier { id: ast.id });
                }
            }
        }
    }
}

/// Bind the keys of a record whose definitions end at or before the
/// cursor. The key the cursor is typing (it sits in the ancestry) never
/// binds itself.
fn bind_record_keys(
    map: &NodeIdMapCollection,
    record_id: NodeId,
    position: Position,
    scope: &mut ScopeMap,
    ancestry: &[NodeId],
) {
    let Some(wrapper) = find_child_of_kind(map, record_id, NodeKind::ArrayWrapper) else {
        return;
    };
    for csv in map.iter_children(wrapper.id()) {
        let Some(pair) = map.child_by_attribute_index(csv.id(), 0, None) else {
            continue;
        };
        if !matches!(
            pair.kind(),
            NodeKind::GeneralizedIdentifierPairedExpression
                | NodeKind::GeneralizedIdentifierPairedAnyLiteral
        ) {
            continue;
        }
        let Some(key) = map.child_by_attribute_index(
            pair.id(),
            0,
            Some(&[NodeKind::GeneralizedIdentifier]),
        ) else {
            continue;
        };
        let Some(key_ast) = key.as_ast() else { continue };
        if ancestry.contains(&key_ast.id) {
            continue;
        }
        if position.cmp_token(&key_ast.token_range.position_end) == std::cmp::Ordering::Less {
            continue;
        }
        if let Some(literal) = key_ast.literal() {
            bind(
                scope,
                literal.to_string(),
                ScopeItem::RecordKey { key_id: key_ast.id },
            );
        }
    }
}

fn bind_section_members(map: &NodeIdMapCollection, section_id: NodeId, scope: &mut ScopeMap) {
    let Some(wrapper) = find_child_of_kind(map, section_id, NodeKind::ArrayWrapper) else {
        return;
    };
    for member in map.iter_children(wrapper.id()) {
        if member.kind() != NodeKind::SectionMember {
            continue;
        }
        let Some(pair) = find_child_of_kind(map, member.id(), NodeKind::IdentifierPairedExpression)
        else {
            continue;
        };
        let Some(name) = map.child_by_attribute_index(pair.id(), 0, Some(&[NodeKind::Identifier]))
        else {
            continue;
        };
        if let Some(literal) = name.as_ast().and_then(|ast| ast.literal()) {
            bind(
                scope,
                literal.to_string(),
                ScopeItem::SectionMember {
                    member_id: member.id(),
                },
            );
        }
    }
}

/// Whether the cursor sits strictly inside a wrapped construct and not on
/// its closing delimiter.
fn position_is_inside_wrapped(
    map: &NodeIdMapCollection,
    node: &XorNode,
    position: Position,
) -> bool {
    let Some(open) = map.child_by_attribute_index(node.id(), 0, Some(&[NodeKind::Constant]))
    else {
        return false;
    };
    let Some(open_ast) = open.as_ast() else { return false };
    if position.cmp_token(&open_ast.token_range.position_start) != std::cmp::Ordering::Greater {
        return false;
    }

    // The closing delimiter is the last constant child, present only once
    // the construct is fully parsed.
    let closing = map
        .iter_children(node.id())
        .filter(|child| child.kind() == NodeKind::Constant)
        .filter_map(|child| child.as_ast())
        .last();
    match closing {
        Some(close) if close.id != open_ast.id => {
            position.cmp_token(&close.token_range.position_start) == std::cmp::Ordering::Less
        }
        _ => true,
    }
}

fn find_child_of_kind<'a>(
    map: &'a NodeIdMapCollection,
    parent: NodeId,
    kind: NodeKind,
) -> Option<XorNode<'a>> {
    map.iter_children(parent).find(|child| child.kind() == kind)
}
