//! Position-driven editor queries over the hybrid parse tree.
//!
//! Given a cursor, the inspection engine finds the deepest enclosing node
//! and its ancestry, accumulates the lexical scope visible there, computes
//! signature-help metadata for the enclosing invocation, and proposes
//! keyword completions. All queries work the same on a fully parsed tree
//! and on the partial tree a failed parse leaves behind.

mod active_node;
mod autocomplete;
mod invoke;
mod scope;

use pq_common::error::CommonError;
use pq_common::position::Position;
use pq_common::settings::CommonSettings;
use pq_parser::{NodeIdMapCollection, TriedParse};

pub use active_node::{maybe_active_node, ActiveNode};
pub use autocomplete::{autocomplete, Autocomplete};
pub use invoke::{inspect_invoke_expression, InspectedInvokeExpression, InvokeExpressionArguments};
pub use scope::{scope_of, ScopeItem, ScopeMap};

/// Everything the engine can say about one cursor position.
#[derive(Debug, Clone)]
pub struct Inspected {
    /// Names visible at the cursor, insertion-ordered, inner scopes first.
    pub scope: ScopeMap,
    /// List/record nodes the cursor sits inside.
    pub scope_nodes: Vec<pq_parser::NodeId>,
    pub active_node: Option<ActiveNode>,
    pub invoke_expression: Option<InspectedInvokeExpression>,
    pub autocomplete: Autocomplete,
}

/// The tree to inspect, read off either branch of a [`TriedParse`].
pub fn node_id_map(tried: &TriedParse) -> &NodeIdMapCollection {
    match tried {
        Ok(ok) => &ok.node_id_map,
        Err(failure) => failure.node_id_map(),
    }
}

/// Run every inspection at `position`.
///
/// Missing pieces of a broken tree are answered with `None` fields, never
/// with an error; only an internally inconsistent tree reports one.
/// `_settings` is reserved for message localization.
pub fn inspect(
    _settings: &CommonSettings,
    position: Position,
    tried: &TriedParse,
) -> Result<Inspected, CommonError> {
    let map = node_id_map(tried);

    let active = maybe_active_node(map, position);
    if let Some(active) = &active {
        for id in &active.ancestry {
            if map.xor_node(*id).is_none() {
                return Err(CommonError::Invariant {
                    message: "ancestry id resolves to neither map".into(),
                    details: Some(format!("{id:?}")),
                });
            }
        }
    }

    let (scope, scope_nodes) = match &active {
        Some(active) => scope_of(map, active, position),
        None => (ScopeMap::new(), Vec::new()),
    };
    let invoke_expression = active
        .as_ref()
        .and_then(|active| inspect_invoke_expression(map, active, position));
    let autocomplete = autocomplete::autocomplete(map, active.as_ref(), position);

    Ok(Inspected {
        scope,
        scope_nodes,
        active_node: active,
        invoke_expression,
        autocomplete,
    })
}
