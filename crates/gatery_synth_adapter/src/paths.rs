//! Resolves a [`NodePort`] to the dotted/slashed identifier a constraint
//! file should reference it by: the chain of enclosing entity instance
//! names down to (but not including) the signal's own declaring entity,
//! joined by `/`, followed by the signal's locally-allocated name.
//!
//! Grounded on `SynthesisTool::forEachPathAttribute`'s `path2vhdl` closure,
//! simplified to entity-level granularity (the original also walks
//! intermediate block scopes inside one entity; this back-end's namespace
//! model allocates port names directly within the owning entity's scope,
//! so one level of the original's nesting collapses away here).

use gatery_hlim::{NodeGroupId, NodeKind, NodePort};
use gatery_vhdl::{Ast, ScopeId, VhdlResult};

use crate::error::{SynthAdapterError, SynthAdapterResult};

/// Looks up `port`'s allocated name in `scope`, going through the pin-name
/// table for I/O pins (which never get a `node_port_name` entry) and the
/// regular signal/port table otherwise.
fn lookup_name(ast: &Ast, scope: ScopeId, port: NodePort) -> VhdlResult<&str> {
    if matches!(ast.circuit().node(port.node).kind, NodeKind::Pin { .. }) {
        ast.namespaces().get_pin_name(scope, port.node)
    } else {
        ast.namespaces().get_node_port_name(scope, port)
    }
}

/// Resolves `port` to its fully-qualified constraint-file identifier.
pub fn resolve_identifier(ast: &Ast, port: NodePort) -> SynthAdapterResult<String> {
    let circuit = ast.circuit();
    let mut group_id = circuit.node(port.node).group;
    loop {
        let group = circuit.group(group_id);
        if group.is_entity_like() {
            break;
        }
        match group.parent {
            Some(parent) => group_id = parent,
            None => break,
        }
    }

    let entity = ast
        .entity_for_group(group_id)
        .ok_or_else(|| SynthAdapterError::design(format!("node {:?} has no enclosing entity", port.node)))?;
    let leaf_name = lookup_name(ast, entity.grouping.scope, port)?;

    let mut chain = Vec::new();
    let mut parent = entity.parent;
    while let Some(idx) = parent {
        chain.push(idx);
        parent = ast.entities()[idx].parent;
    }
    chain.reverse();

    let mut identifier = String::new();
    for idx in chain {
        identifier.push_str(&ast.entities()[idx].grouping.name);
        identifier.push('/');
    }
    identifier.push_str(leaf_name);
    Ok(identifier)
}

/// `true` if `group` (or any ancestor) resolves to an entity; used by
/// callers that want to fail fast on orphaned groups before calling
/// [`resolve_identifier`].
pub fn has_enclosing_entity(ast: &Ast, group: NodeGroupId) -> bool {
    let circuit = ast.circuit();
    let mut current = group;
    loop {
        let g = circuit.group(current);
        if g.is_entity_like() {
            return ast.entity_for_group(current).is_some();
        }
        match g.parent {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}
