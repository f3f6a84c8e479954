//! Signature-help metadata for the invocation enclosing the cursor.

use pq_common::position::Position;
use pq_parser::{NodeId, NodeIdMapCollection, NodeKind};

use crate::active_node::ActiveNode;

/// The invocation the cursor sits inside, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedInvokeExpression {
    pub invoke_id: NodeId,
    /// The name the function is invoked under, when the invocation heads a
    /// named recursive-primary chain (`Foo(…)`).
    pub maybe_name: Option<String>,
    pub maybe_arguments: Option<InvokeExpressionArguments>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvokeExpressionArguments {
    pub num_arguments: u32,
    /// Zero-based index of the argument the cursor is in.
    pub argument_ordinal: u32,
}

/// Find the nearest enclosing invoke expression and compute its argument
/// metadata.
pub fn inspect_invoke_expression(
    map: &NodeIdMapCollection,
    active: &ActiveNode,
    position: Position,
) -> Option<InspectedInvokeExpression> {
    let invoke_id = *active.ancestry.iter().find(|id| {
        map.xor_node(**id)
            .is_some_and(|node| node.kind() == NodeKind::InvokeExpression)
    })?;

    let maybe_arguments = arguments_of(map, invoke_id, active, position);
    Some(InspectedInvokeExpression {
        invoke_id,
        maybe_name: map.invoke_expression_name(invoke_id),
        maybe_arguments,
    })
}

fn arguments_of(
    map: &NodeIdMapCollection,
    invoke_id: NodeId,
    active: &ActiveNode,
    position: Position,
) -> Option<InvokeExpressionArguments> {
    let wrapper = map
        .iter_children(invoke_id)
        .find(|child| child.kind() == NodeKind::ArrayWrapper)?;
    let csv_ids = map.child_ids(wrapper.id());
    if csv_ids.is_empty() {
        return None;
    }

    // Prefer the Csv the ancestry runs through; fall back to token-range
    // containment for cursors between arguments.
    let ordinal_from_ancestry = active
        .ancestry
        .iter()
        .filter(|id| csv_ids.contains(*id))
        .find_map(|id| map.xor_node(*id)?.attribute_index());
    let argument_ordinal = ordinal_from_ancestry.or_else(|| {
        map.iter_children(wrapper.id()).find_map(|csv| {
            let ast = csv.as_ast()?;
            if position.is_in_range(&ast.token_range) {
                ast.attribute_index
            } else {
                None
            }
        })
    });

    Some(InvokeExpressionArguments {
        num_arguments: csv_ids.len() as u32,
        argument_ordinal: argument_ordinal.unwrap_or(0),
    })
}
