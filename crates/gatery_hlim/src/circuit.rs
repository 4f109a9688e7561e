//! The finalized HLIM graph: the external, read-only input to the VHDL
//! back-end.

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::clock::Clock;
use crate::group::NodeGroup;
use crate::ids::{ClockId, NodeGroupId, NodeId};
use crate::node::{Node, NodePort};

/// A finalized circuit: every node is connected, every port is typed, and
/// every clock's reset policy is decided. The back-end never mutates this
/// structure; it only reads it while building its own AST.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    nodes: Arena<NodeId, Node>,
    groups: Arena<NodeGroupId, NodeGroup>,
    clocks: Arena<ClockId, Clock>,
    root_group: NodeGroupId,
}

impl Circuit {
    /// Creates a circuit from already-populated arenas and a root group.
    ///
    /// # Panics
    ///
    /// Panics if `root_group` does not index into `groups`.
    pub fn new(
        nodes: Arena<NodeId, Node>,
        groups: Arena<NodeGroupId, NodeGroup>,
        clocks: Arena<ClockId, Clock>,
        root_group: NodeGroupId,
    ) -> Self {
        assert!(
            root_group.as_raw() < groups.len() as u32,
            "root_group does not exist in groups arena"
        );
        Self {
            nodes,
            groups,
            clocks,
            root_group,
        }
    }

    /// The circuit's root node group (becomes the top-level entity).
    pub fn root_group(&self) -> NodeGroupId {
        self.root_group
    }

    /// Looks up a node by ID.
    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id)
    }

    /// Looks up a node group by ID.
    pub fn group(&self, id: NodeGroupId) -> &NodeGroup {
        self.groups.get(id)
    }

    /// Looks up a clock by ID.
    pub fn clock(&self, id: ClockId) -> &Clock {
        self.clocks.get(id)
    }

    /// Iterates over every node in the circuit, in arena allocation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Iterates over every clock in the circuit.
    pub fn clocks(&self) -> impl Iterator<Item = (ClockId, &Clock)> {
        self.clocks.iter()
    }

    /// Iterates over every node group in the circuit, in arena allocation
    /// order. Used by callers that walk path attributes across the whole
    /// design rather than one group at a time (e.g. constraint-file
    /// emission, which has no other way to discover where path attributes
    /// were declared).
    pub fn groups(&self) -> impl Iterator<Item = (NodeGroupId, &NodeGroup)> {
        self.groups.iter()
    }

    /// Every port that reads from `producer`, found by linear scan of all
    /// node inputs. The graph carries no reverse edges, so classification
    /// and path-attribute resolution call this as needed; it is not on any
    /// hot per-node path in practice since it is only evaluated once per
    /// signal during `extractSignals`.
    pub fn consumers(&self, producer: NodePort) -> Vec<NodePort> {
        let mut out = Vec::new();
        for (node_id, node) in self.nodes.iter() {
            for (port_idx, input) in node.inputs.iter().enumerate() {
                if *input == Some(producer) {
                    out.push(NodePort::new(node_id, port_idx as u32));
                }
            }
        }
        out
    }

    /// `true` if `node` is owned (directly) by `group`.
    pub fn node_in_group(&self, node: NodeId, group: NodeGroupId) -> bool {
        self.groups.get(group).nodes.contains(&node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ResetType;
    use crate::group::{Attributes, GroupKind};
    use crate::node::{NodeKind, PinDirection};
    use crate::types::ConnectionType;
    use gatery_common::{Frequency, Interner};

    fn build_passthrough() -> (Circuit, NodeId, NodeId) {
        let interner = Interner::new();
        let mut nodes = Arena::new();
        let mut groups = Arena::new();
        let clocks = Arena::new();

        let root_id = NodeGroupId::from_raw(0);
        let in_pin = nodes.alloc(Node {
            id: NodeId::from_raw(0),
            kind: NodeKind::Pin {
                direction: PinDirection::Input,
                simulation_only: false,
            },
            group: root_id,
            inputs: Vec::new(),
            output_types: vec![ConnectionType::Bool],
            name: Some(interner.get_or_intern("in")),
            comment: None,
        });
        let out_pin = nodes.alloc(Node {
            id: NodeId::from_raw(0),
            kind: NodeKind::Pin {
                direction: PinDirection::Output,
                simulation_only: false,
            },
            group: root_id,
            inputs: vec![Some(NodePort::new(in_pin, 0))],
            output_types: vec![ConnectionType::Bool],
            name: Some(interner.get_or_intern("out")),
            comment: None,
        });
        let root = groups.alloc(NodeGroup {
            id: root_id,
            name: interner.get_or_intern("top"),
            comment: None,
            kind: GroupKind::Entity,
            parent: None,
            children: Vec::new(),
            nodes: vec![in_pin, out_pin],
            attributes: Attributes::default(),
            partition: false,
            partition_as_component: false,
        });
        assert_eq!(root, root_id);

        (Circuit::new(nodes, groups, clocks, root), in_pin, out_pin)
    }

    #[test]
    fn consumers_finds_driven_ports() {
        let (circuit, in_pin, out_pin) = build_passthrough();
        let consumers = circuit.consumers(NodePort::new(in_pin, 0));
        assert_eq!(consumers, vec![NodePort::new(out_pin, 0)]);
    }

    #[test]
    fn node_in_group_checks_ownership() {
        let (circuit, in_pin, _) = build_passthrough();
        assert!(circuit.node_in_group(in_pin, circuit.root_group()));
    }

    #[test]
    fn clock_lookup() {
        let interner = Interner::new();
        let mut clocks: Arena<ClockId, Clock> = Arena::new();
        let id = clocks.alloc(Clock {
            id: ClockId::from_raw(0),
            name: interner.get_or_intern("clk"),
            frequency: Frequency::new(100_000_000.0),
            reset_type: ResetType::Synchronous,
            reset_name: Some(interner.get_or_intern("reset")),
        });
        let circuit = Circuit::new(Arena::new(), {
            let mut g = Arena::new();
            g.alloc(NodeGroup {
                id: NodeGroupId::from_raw(0),
                name: interner.get_or_intern("top"),
                comment: None,
                kind: GroupKind::Entity,
                parent: None,
                children: Vec::new(),
                nodes: Vec::new(),
                attributes: Attributes::default(),
                partition: false,
                partition_as_component: false,
            });
            g
        }, clocks, NodeGroupId::from_raw(0));
        assert!(circuit.clock(id).reset_type.has_reset_signal());
    }
}
