//! The block/entity builder: decides, for each node group, whether it
//! becomes a sub-entity instantiation, a nested block, or a process, and
//! assembles the resulting concurrent statement list.

use std::collections::{BTreeSet, HashMap, HashSet};

use gatery_common::Interner;
use gatery_hlim::{Circuit, ClockId, NodeGroup, NodeGroupId, NodeId, NodeKind, NodePort};

use crate::classify::{classify_nodes, SignalSets};
use crate::error::VhdlResult;
use crate::formatter::CodeFormatter;
use crate::namespace::{Namespaces, ScopeId};
use crate::process::{register_config_for, Process, ProcessKind};

/// One statement inside an entity or block's architecture body.
#[derive(Debug, Clone)]
pub enum ConcurrentStmtKind {
    /// Instantiation of a sub-entity (a child group of kind `Entity`/`Sfu`).
    EntityInstantiation {
        /// Index of the instantiated entity in `Ast::entities`.
        entity_index: usize,
        /// The allocated instance label.
        instance_name: String,
        /// `(port name on the sub-entity, driving signal name in this scope)` pairs.
        port_map: Vec<(String, String)>,
    },
    /// Instantiation of an external black-box node.
    ExternalInstantiation {
        /// The external node being instantiated.
        node: NodeId,
        /// The allocated instance label.
        instance_name: String,
        /// `(port name on the external entity, driving signal name)` pairs.
        port_map: Vec<(String, String)>,
    },
    /// A nested block.
    Block(Grouping),
    /// A combinational or clocked process.
    Process(Process),
}

/// A statement plus its stable sort key (insertion order; emission sorts by
/// this, ties keep insertion order since it is already monotone).
#[derive(Debug, Clone)]
pub struct ConcurrentStmt {
    /// Used only to order emission.
    pub sort_idx: u32,
    /// The statement itself.
    pub kind: ConcurrentStmtKind,
}

/// The shape shared by entities and blocks: a namespace scope, four
/// disjoint signal sets, and an ordered statement list.
#[derive(Debug, Clone)]
pub struct Grouping {
    /// The allocated name (entity or block name).
    pub name: String,
    /// This grouping's namespace scope.
    pub scope: ScopeId,
    /// An optional comment banner.
    pub comment: Option<String>,
    /// Signals fully local to this grouping.
    pub local_signals: BTreeSet<NodePort>,
    /// Signals driven from outside this grouping.
    pub inputs: BTreeSet<NodePort>,
    /// Signals this grouping drives to the outside.
    pub outputs: BTreeSet<NodePort>,
    /// I/O pins declared within this grouping.
    pub io_pins: BTreeSet<NodeId>,
    /// Clocks referenced within this grouping.
    pub input_clocks: BTreeSet<ClockId>,
    /// Concurrent statements, unsorted until `sort_statements` runs.
    pub statements: Vec<ConcurrentStmt>,
    /// The HLIM node group this grouping was built from.
    pub source_group: NodeGroupId,
}

impl Grouping {
    fn new(name: String, scope: ScopeId, source_group: NodeGroupId, comment: Option<String>) -> Self {
        Self {
            name,
            scope,
            comment,
            local_signals: BTreeSet::new(),
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
            io_pins: BTreeSet::new(),
            input_clocks: BTreeSet::new(),
            statements: Vec::new(),
            source_group,
        }
    }

    fn apply_signal_sets(&mut self, sets: SignalSets) {
        self.local_signals = sets.local;
        self.inputs = sets.inputs;
        self.outputs = sets.outputs;
        self.io_pins = sets.io_pins;
        self.input_clocks = sets.input_clocks;
    }

    /// Asserts the four signal sets are pairwise disjoint.
    pub fn verify_signals_disjoint(&self) -> VhdlResult<()> {
        SignalSets {
            local: self.local_signals.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            io_pins: self.io_pins.clone(),
            input_clocks: self.input_clocks.clone(),
        }
        .verify_disjoint()
    }

    fn sort_statements(&mut self) {
        self.statements.sort_by_key(|stmt| stmt.sort_idx);
        for stmt in &mut self.statements {
            if let ConcurrentStmtKind::Block(block) = &mut stmt.kind {
                block.sort_statements();
            }
        }
    }

    /// After a child block's signals are classified, promote any of its
    /// inputs/outputs that also cross *this* grouping's boundary into this
    /// grouping's own input/output sets (`routeChildIOUpwards`), applied
    /// transitively as blocks nest.
    fn route_child_io_upwards(&mut self, circuit: &Circuit, owned_here: &HashSet<NodeId>, child: &Grouping) {
        for &port in &child.inputs {
            if !owned_here.contains(&port.node) {
                self.inputs.insert(port);
            }
        }
        for &port in &child.outputs {
            let escapes = circuit.consumers(port).iter().any(|consumer| !owned_here.contains(&consumer.node));
            if escapes {
                self.outputs.insert(port);
            }
        }
    }
}

/// A built VHDL entity: a grouping plus entity-specific metadata.
#[derive(Debug, Clone)]
pub struct Entity {
    /// The entity's own grouping (signals + statements).
    pub grouping: Grouping,
    /// Index of the parent entity in `Ast::entities`, `None` for the root.
    pub parent: Option<usize>,
    /// `true` if this entity should be written to its own file under
    /// file-per-partition emission.
    pub is_partition: bool,
    /// `true` if a partitioned entity is referenced via `COMPONENT`
    /// declaration rather than direct `entity work.<name>(impl)` instantiation.
    pub partition_as_component: bool,
}

/// For every sub-entity instantiated directly in `grouping`'s own statement
/// list, folds the child's boundary ports into `grouping`'s own signal sets.
///
/// `classify_nodes` can only decide local/input/output status for nodes it
/// can see, and a node inside an instantiated child is never part of this
/// grouping's `owned` set — so a child's escaping output, or a child's input
/// driven from further outside, would otherwise get no declared name at this
/// level at all. This mirrors `classify_nodes`'s own escape test, just
/// applied to the child's already-classified boundary instead of to nodes
/// this grouping iterates directly.
fn bridge_sub_entity_ports(grouping: &mut Grouping, circuit: &Circuit, owned: &HashSet<NodeId>, entities: &[Entity]) {
    let mut input_adds = Vec::new();
    let mut output_adds = Vec::new();
    let mut local_adds = Vec::new();

    for stmt in &grouping.statements {
        if let ConcurrentStmtKind::EntityInstantiation { entity_index, .. } = &stmt.kind {
            let child = &entities[*entity_index].grouping;
            for &port in &child.inputs {
                if !owned.contains(&port.node) {
                    input_adds.push(port);
                }
            }
            for &port in &child.outputs {
                let escapes = circuit.consumers(port).iter().any(|consumer| !owned.contains(&consumer.node));
                if escapes {
                    output_adds.push(port);
                } else {
                    local_adds.push(port);
                }
            }
        }
    }

    grouping.inputs.extend(input_adds);
    grouping.outputs.extend(output_adds);
    grouping.local_signals.extend(local_adds);
}

/// Recursively gathers every node owned by `group_id`, descending into
/// `Area`/`Transparent` children but stopping at `Entity`/`Sfu` children
/// (those become separate entities with their own signal boundary).
pub fn collect_owned_nodes(circuit: &Circuit, group_id: NodeGroupId) -> HashSet<NodeId> {
    let mut owned = HashSet::new();
    collect_owned_nodes_into(circuit, group_id, &mut owned);
    owned
}

fn collect_owned_nodes_into(circuit: &Circuit, group_id: NodeGroupId, owned: &mut HashSet<NodeId>) {
    let group = circuit.group(group_id);
    owned.extend(group.nodes.iter().copied());
    for &child_id in &group.children {
        let child = circuit.group(child_id);
        if !child.is_entity_like() {
            collect_owned_nodes_into(circuit, child_id, owned);
        }
    }
}

/// Like [`collect_owned_nodes`], but recurses into `Entity`/`Sfu` children
/// too instead of stopping at them. Used only as the wider boundary for
/// signal-escape detection: a port consumed by, or driving from, a node
/// inside a directly-instantiated sub-entity is wired through that entity's
/// port map and must not be promoted to this grouping's own ports.
pub fn collect_visible_nodes(circuit: &Circuit, group_id: NodeGroupId) -> HashSet<NodeId> {
    let mut visible = HashSet::new();
    collect_visible_nodes_into(circuit, group_id, &mut visible);
    visible
}

fn collect_visible_nodes_into(circuit: &Circuit, group_id: NodeGroupId, visible: &mut HashSet<NodeId>) {
    let group = circuit.group(group_id);
    visible.extend(group.nodes.iter().copied());
    for &child_id in &group.children {
        collect_visible_nodes_into(circuit, child_id, visible);
    }
}

/// `true` if an `Area` group contains no external nodes, no sub-entities,
/// and no sub-areas, i.e. it is eligible to fold directly into one or more
/// processes rather than becoming a nested block.
fn is_pure_process_area(circuit: &Circuit, group: &NodeGroup) -> bool {
    let has_external = group
        .nodes
        .iter()
        .any(|&id| matches!(circuit.node(id).kind, NodeKind::External { .. }));
    if has_external {
        return false;
    }
    group.children.iter().all(|&child_id| {
        let child = circuit.group(child_id);
        !child.is_entity_like() && is_pure_process_area(circuit, child)
    })
}

/// Buckets `nodes` into one default combinational process plus one clocked
/// process per distinct register configuration.
pub fn processify_nodes(
    circuit: &Circuit,
    formatter: &dyn CodeFormatter,
    namespaces: &mut Namespaces,
    scope: ScopeId,
    desired_name: &str,
    nodes: &[NodeId],
) -> Vec<Process> {
    let mut by_config: HashMap<Option<crate::process::RegisterConfig>, Vec<NodeId>> = HashMap::new();
    for &id in nodes {
        let config = register_config_for(circuit, std::slice::from_ref(&id));
        by_config.entry(config).or_default().push(id);
    }

    let mut processes = Vec::new();
    // Combinational bucket first, named "default" unless the caller supplied
    // a more specific desired name (pure-process areas name it after the area).
    if let Some(comb_nodes) = by_config.remove(&None) {
        let name = namespaces.allocate_process_name(scope, formatter, desired_name, false);
        processes.push(Process {
            name,
            kind: ProcessKind::Combinational,
            nodes: comb_nodes,
            assignments: Vec::new(),
        });
    }
    for (config, clocked_nodes) in by_config {
        let config = config.expect("None key already removed");
        let name = namespaces.allocate_process_name(scope, formatter, desired_name, true);
        processes.push(Process {
            name,
            kind: ProcessKind::Clocked(config),
            nodes: clocked_nodes,
            assignments: Vec::new(),
        });
    }

    processes
}

/// Builds the entity for `group_id`, recursing into its children. `root_scope`
/// is always the AST root's namespace: sub-entity namespaces parent directly
/// to the root regardless of instantiation depth.
#[allow(clippy::too_many_arguments)]
pub fn build_entity(
    circuit: &Circuit,
    interner: &Interner,
    formatter: &dyn CodeFormatter,
    namespaces: &mut Namespaces,
    root_scope: ScopeId,
    entities: &mut Vec<Entity>,
    parent_entity: Option<usize>,
    group_id: NodeGroupId,
) -> VhdlResult<usize> {
    let group = circuit.group(group_id);
    let desired_name = interner.resolve(group.name);
    let entity_name = namespaces.allocate_entity_name(root_scope, formatter, desired_name);
    let entity_scope = namespaces.new_child(root_scope);

    let mut grouping = Grouping::new(entity_name, entity_scope, group_id, group.comment.clone());
    let mut sort_idx = 0u32;

    entities.push(Entity {
        grouping: grouping.clone(),
        parent: parent_entity,
        is_partition: group.partition,
        partition_as_component: group.partition_as_component,
    });
    let entity_index_placeholder = entities.len() - 1;

    build_grouping_body(
        circuit,
        interner,
        formatter,
        namespaces,
        root_scope,
        entities,
        Some(entity_index_placeholder),
        group_id,
        &mut grouping,
        &mut sort_idx,
    )?;

    let owned = collect_owned_nodes(circuit, group_id);
    let visible = collect_visible_nodes(circuit, group_id);
    let sets = classify_nodes(circuit, &owned, &visible);
    grouping.apply_signal_sets(sets);
    bridge_sub_entity_ports(&mut grouping, circuit, &owned, entities);
    grouping.verify_signals_disjoint()?;
    grouping.sort_statements();

    entities[entity_index_placeholder].grouping = grouping;
    Ok(entity_index_placeholder)
}

/// Builds a nested block for `group_id` inside `parent_entity`'s namespace chain.
fn build_block(
    circuit: &Circuit,
    interner: &Interner,
    formatter: &dyn CodeFormatter,
    namespaces: &mut Namespaces,
    root_scope: ScopeId,
    entities: &mut Vec<Entity>,
    parent_entity: Option<usize>,
    parent_scope: ScopeId,
    group_id: NodeGroupId,
) -> VhdlResult<Grouping> {
    let group = circuit.group(group_id);
    let desired_name = interner.resolve(group.name);
    let block_name = namespaces.allocate_block_name(parent_scope, formatter, desired_name);
    let block_scope = namespaces.new_child(parent_scope);

    let mut grouping = Grouping::new(block_name, block_scope, group_id, group.comment.clone());
    let mut sort_idx = 0u32;
    build_grouping_body(
        circuit,
        interner,
        formatter,
        namespaces,
        root_scope,
        entities,
        parent_entity,
        group_id,
        &mut grouping,
        &mut sort_idx,
    )?;

    let owned = collect_owned_nodes(circuit, group_id);
    let visible = collect_visible_nodes(circuit, group_id);
    let sets = classify_nodes(circuit, &owned, &visible);
    grouping.apply_signal_sets(sets);
    bridge_sub_entity_ports(&mut grouping, circuit, &owned, entities);
    grouping.verify_signals_disjoint()?;

    Ok(grouping)
}

#[allow(clippy::too_many_arguments)]
fn build_grouping_body(
    circuit: &Circuit,
    interner: &Interner,
    formatter: &dyn CodeFormatter,
    namespaces: &mut Namespaces,
    root_scope: ScopeId,
    entities: &mut Vec<Entity>,
    current_entity: Option<usize>,
    group_id: NodeGroupId,
    grouping: &mut Grouping,
    sort_idx: &mut u32,
) -> VhdlResult<()> {
    let group = circuit.group(group_id).clone();

    // Collect instantiations: sub-entities and external nodes directly in
    // this group (transparent children are folded by recursing into them
    // here, exactly as a directly-owned area would be).
    let mut leaf_nodes: Vec<NodeId> = Vec::new();
    for &id in &group.nodes {
        match circuit.node(id).kind {
            NodeKind::External { .. } => {
                let instance_name = namespaces.allocate_instance_name(grouping.scope, formatter, interner.resolve(group.name));
                grouping.statements.push(ConcurrentStmt {
                    sort_idx: *sort_idx,
                    kind: ConcurrentStmtKind::ExternalInstantiation {
                        node: id,
                        instance_name,
                        port_map: Vec::new(),
                    },
                });
                *sort_idx += 1;
            }
            _ => leaf_nodes.push(id),
        }
    }

    for &child_id in &group.children {
        let child = circuit.group(child_id).clone();
        match child.kind {
            gatery_hlim::GroupKind::Entity | gatery_hlim::GroupKind::Sfu => {
                let sub_index = build_entity(
                    circuit,
                    interner,
                    formatter,
                    namespaces,
                    root_scope,
                    entities,
                    current_entity,
                    child_id,
                )?;
                let instance_name =
                    namespaces.allocate_instance_name(grouping.scope, formatter, interner.resolve(child.name));
                grouping.statements.push(ConcurrentStmt {
                    sort_idx: *sort_idx,
                    kind: ConcurrentStmtKind::EntityInstantiation {
                        entity_index: sub_index,
                        instance_name,
                        port_map: Vec::new(),
                    },
                });
                *sort_idx += 1;
            }
            gatery_hlim::GroupKind::Transparent => {
                build_grouping_body(
                    circuit,
                    interner,
                    formatter,
                    namespaces,
                    root_scope,
                    entities,
                    current_entity,
                    child_id,
                    grouping,
                    sort_idx,
                )?;
            }
            gatery_hlim::GroupKind::Area => {
                if is_pure_process_area(circuit, &child) {
                    let owned = collect_owned_nodes(circuit, child_id);
                    let nodes: Vec<NodeId> = owned.into_iter().collect();
                    let name = interner.resolve(child.name).to_string();
                    for process in processify_nodes(circuit, formatter, namespaces, grouping.scope, &name, &nodes) {
                        grouping.statements.push(ConcurrentStmt {
                            sort_idx: *sort_idx,
                            kind: ConcurrentStmtKind::Process(process),
                        });
                        *sort_idx += 1;
                    }
                } else {
                    let block = build_block(
                        circuit,
                        interner,
                        formatter,
                        namespaces,
                        root_scope,
                        entities,
                        current_entity,
                        grouping.scope,
                        child_id,
                    )?;
                    let owned_here = collect_owned_nodes(circuit, group_id);
                    grouping.route_child_io_upwards(circuit, &owned_here, &block);
                    grouping.statements.push(ConcurrentStmt {
                        sort_idx: *sort_idx,
                        kind: ConcurrentStmtKind::Block(block),
                    });
                    *sort_idx += 1;
                }
            }
        }
    }

    if !leaf_nodes.is_empty() {
        for process in processify_nodes(circuit, formatter, namespaces, grouping.scope, "default", &leaf_nodes) {
            grouping.statements.push(ConcurrentStmt {
                sort_idx: *sort_idx,
                kind: ConcurrentStmtKind::Process(process),
            });
            *sort_idx += 1;
        }
    }

    Ok(())
}
